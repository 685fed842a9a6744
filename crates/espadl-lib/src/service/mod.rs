mod client;
mod types;
mod wire;

pub use client::{DEFAULT_HOST, EspaClient};
pub use types::{
    ALL_ORDERS, ChecksumReference, Credentials, Item, OrderId, OrderSelector, filename_from_url,
};

use crate::error::ServiceError;
use async_trait::async_trait;

/// The remote order-fulfillment service, as seen by the downloader.
///
/// Implementations authenticate every call themselves; callers never handle credentials.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// All orders belonging to the configured account email.
    async fn list_orders(&self) -> Result<Vec<OrderId>, ServiceError>;

    /// Items of `order` that are complete and ready for download.
    async fn list_items(&self, order: &OrderId) -> Result<Vec<Item>, ServiceError>;
}
