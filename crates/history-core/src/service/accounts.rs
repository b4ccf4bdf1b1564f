//! Key and controlling-account lookups over the `accounts` shards.

use super::HistoryService;
use crate::domain::{
    AccountDoc, GetControlledAccountsResult, GetKeyAccountsResult, HistoryResult, IndexPrefix,
};
use crate::ports::{GetControlledAccountsParams, GetKeyAccountsParams, SearchQuery, SearchRequest};
use tracing::{instrument, warn};

impl HistoryService {
    #[instrument(skip(self, params))]
    pub(crate) async fn fetch_key_accounts(
        &self,
        params: GetKeyAccountsParams,
    ) -> HistoryResult<GetKeyAccountsResult> {
        params.validate()?;
        let accounts = self
            .search_accounts(SearchQuery::accounts_by_key(&params.public_key))
            .await?;

        Ok(GetKeyAccountsResult {
            account_names: accounts.into_iter().map(|a| a.name).collect(),
        })
    }

    #[instrument(skip(self, params), fields(controlling = %params.controlling_account))]
    pub(crate) async fn fetch_controlled_accounts(
        &self,
        params: GetControlledAccountsParams,
    ) -> HistoryResult<GetControlledAccountsResult> {
        params.validate()?;
        let accounts = self
            .search_accounts(SearchQuery::account_by_name(&params.controlling_account))
            .await?;

        Ok(GetControlledAccountsResult {
            controlled_accounts: accounts
                .into_iter()
                .flat_map(|a| a.account_controls)
                .map(|control| control.name)
                .collect(),
        })
    }

    /// Run `query` on every accounts shard, oldest shard first.
    async fn search_accounts(&self, query: SearchQuery) -> HistoryResult<Vec<AccountDoc>> {
        let requests: Vec<SearchRequest> = self
            .catalog
            .shards(IndexPrefix::Accounts)
            .iter()
            .map(|shard| SearchRequest {
                index: shard.name.clone(),
                query: query.clone(),
                sort: None,
                from: 0,
                size: self.config.lookup_page_size,
            })
            .collect();
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let responses = self.backend.multi_search(&requests).await?;
        let mut accounts = Vec::new();
        for (request, response) in requests.iter().zip(responses) {
            if let Some(reason) = response.error {
                warn!(index = %request.index, error = %reason, "Account search failed, skipping");
                continue;
            }
            for hit in &response.hits {
                accounts.push(AccountDoc::from_source(&hit.source)?);
            }
        }
        Ok(accounts)
    }
}
