mod summary;

pub use summary::{ItemReport, OrderFailure, Outcome, Summary};

use crate::download::{ItemSource, download_item, fetch_expected_digest};
use crate::error::{DownloadError, ServiceError};
use crate::inventory::LocalInventory;
use crate::service::{Item, OrderId, OrderSelector, OrderService};
use tracing::{debug, info, warn};

/// Drives one run: resolve orders, list their items, and fetch whatever is not on disk yet.
///
/// Items are processed one after another. Item failures are recorded in the [`Summary`];
/// only authentication failures and failures to list the user's orders end the run early.
pub struct Orchestrator<S, T> {
    service: S,
    source: T,
    inventory: LocalInventory,
    verify_checksums: bool,
}

impl<S: OrderService, T: ItemSource> Orchestrator<S, T> {
    pub fn new(service: S, source: T, inventory: LocalInventory, verify_checksums: bool) -> Self {
        Self {
            service,
            source,
            inventory,
            verify_checksums,
        }
    }

    pub async fn run(&mut self, selector: &OrderSelector) -> Result<Summary, ServiceError> {
        let orders = self.resolve_orders(selector).await?;
        let mut summary = Summary::default();

        // List everything before touching the filesystem, so that a rejected login leaves no
        // trace in the target directory.
        let mut items: Vec<Item> = Vec::new();
        for order in orders {
            match self.service.list_items(&order).await {
                Ok(order_items) => {
                    debug!(order = %order, count = order_items.len(), "Order items");
                    items.extend(order_items);
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(order = %order, "Cannot list items of order: {}", err);
                    summary.record_order_failure(order, err);
                }
            }
        }

        let total = items.len();
        info!("There are a total of {} files available for download", total);

        for (index, item) in items.iter().enumerate() {
            let outcome = self.process_item(item, index + 1, total).await;
            debug!(item = %item.key(), outcome = outcome.label(), "Item finished");
            summary.record(item, outcome);
        }

        Ok(summary)
    }

    async fn resolve_orders(&self, selector: &OrderSelector) -> Result<Vec<OrderId>, ServiceError> {
        match selector {
            OrderSelector::All => {
                info!("Retrieving order list");
                let orders = self.service.list_orders().await?;
                info!(count = orders.len(), "Found orders");
                Ok(orders)
            }
            OrderSelector::Single(order) => Ok(vec![order.clone()]),
        }
    }

    async fn process_item(&mut self, item: &Item, index: usize, total: usize) -> Outcome {
        info!(
            order = %item.order_id,
            file = %item.filename,
            "Processing {} (file {} of {})",
            item.name(),
            index,
            total
        );

        if let Err(err) = self.inventory.ensure_order_dir(&item.order_id).await {
            return Outcome::Failed(err);
        }

        if self
            .inventory
            .already_present(&item.order_id, &item.filename, item.size)
            .await
        {
            info!(order = %item.order_id, file = %item.filename, "Already exists on disk, skipping");
            return Outcome::Skipped;
        }

        let expected = if self.verify_checksums {
            match fetch_expected_digest(&mut self.source, &self.inventory, item).await {
                Ok(Some(expected)) => Some(expected),
                Ok(None) => {
                    warn!(order = %item.order_id, file = %item.filename, "No checksum available, downloading unverified");
                    None
                }
                Err(err) => return Outcome::Failed(err),
            }
        } else {
            None
        };

        let destination = self.inventory.item_path(&item.order_id, &item.filename);
        let request = match self.source.request(&item.url, destination, item.size) {
            Ok(request) => request,
            Err(err) => return Outcome::Failed(err),
        };
        let verifier = expected
            .as_ref()
            .map(|expected| expected.digest.verifier());

        match download_item(&request, verifier).await {
            Ok(bytes) if expected.is_some() => Outcome::Verified { bytes },
            Ok(bytes) => Outcome::Downloaded { bytes },
            Err(err @ DownloadError::ChecksumMismatch { .. }) => {
                // Fetch the checksum file again next time along with the product.
                if let Some(checksum_file) = expected.and_then(|expected| expected.checksum_file) {
                    if let Err(e) = tokio::fs::remove_file(&checksum_file).await {
                        warn!(path = %checksum_file.display(), "Failed to remove checksum file: {}", e);
                    }
                }
                Outcome::ChecksumFailed(err)
            }
            Err(err) => Outcome::Failed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use opendal::Operator;
    use opendal::services::Memory;
    use url::Url;

    struct OneOrder {
        items: Vec<Item>,
    }

    #[async_trait]
    impl OrderService for OneOrder {
        async fn list_orders(&self) -> Result<Vec<OrderId>, ServiceError> {
            Ok(vec![OrderId::new("0001").unwrap()])
        }

        async fn list_items(&self, _order: &OrderId) -> Result<Vec<Item>, ServiceError> {
            Ok(self.items.clone())
        }
    }

    struct MemorySource(Operator);

    impl ItemSource for MemorySource {
        fn locate(&mut self, url: &Url) -> Result<(Operator, String), DownloadError> {
            Ok((self.0.clone(), url.path().to_string()))
        }
    }

    fn item(filename: &str) -> Item {
        let url = Url::parse(&format!("https://dl.example.com/0001/{filename}")).unwrap();
        Item::from_url(OrderId::new("0001").unwrap(), url).unwrap()
    }

    #[tokio::test]
    async fn test_checksum_requested_without_reference_downloads_unverified() {
        let temp_dir = tempfile::tempdir().unwrap();
        let operator = Operator::new(Memory::default()).unwrap().finish();
        operator.write("/0001/a.tar.gz", b"payload".to_vec()).await.unwrap();

        let mut orchestrator = Orchestrator::new(
            OneOrder {
                items: vec![item("a.tar.gz")],
            },
            MemorySource(operator),
            LocalInventory::new(temp_dir.path()),
            true,
        );
        let summary = orchestrator.run(&OrderSelector::All).await.unwrap();

        assert!(matches!(
            summary.outcome("0001/a.tar.gz"),
            Some(Outcome::Downloaded { bytes: 7 })
        ));
        assert!(temp_dir.path().join("0001/a.tar.gz").is_file());
    }

    #[tokio::test]
    async fn test_unparseable_checksum_file_fails_item() {
        let temp_dir = tempfile::tempdir().unwrap();
        let operator = Operator::new(Memory::default()).unwrap().finish();
        operator.write("/0001/a.tar.gz", b"payload".to_vec()).await.unwrap();
        operator.write("/0001/a.md5", b"garbage".to_vec()).await.unwrap();

        let item = item("a.tar.gz").with_checksum(crate::service::ChecksumReference::Remote(
            Url::parse("https://dl.example.com/0001/a.md5").unwrap(),
        ));
        let mut orchestrator = Orchestrator::new(
            OneOrder { items: vec![item] },
            MemorySource(operator),
            LocalInventory::new(temp_dir.path()),
            true,
        );
        let summary = orchestrator.run(&OrderSelector::All).await.unwrap();

        assert!(matches!(
            summary.outcome("0001/a.tar.gz"),
            Some(Outcome::Failed(DownloadError::InvalidChecksum { .. }))
        ));
        assert!(!temp_dir.path().join("0001/a.tar.gz").exists());
    }
}
