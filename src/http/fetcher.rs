//! Page fetching seam between the sync engine and the transport

use super::client::HttpClient;
use crate::entity::PageResponse;
use crate::error::Result;
use crate::kinds::EntityKind;
use async_trait::async_trait;

/// Source of pages for any entity kind
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch page `page` (1-based) of the listing for `kind`
    async fn fetch_page<K: EntityKind>(&self, kind: &K, page: u32)
        -> Result<PageResponse<K::Wire>>;
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page<K: EntityKind>(
        &self,
        kind: &K,
        page: u32,
    ) -> Result<PageResponse<K::Wire>> {
        self.get_page(kind.endpoint(), kind.customer_param(), page)
            .await
    }
}
