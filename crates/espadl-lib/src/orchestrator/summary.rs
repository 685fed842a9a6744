use crate::error::{DownloadError, ServiceError};
use crate::service::{Item, OrderId};
use tracing::{info, warn};

/// Terminal state of one item in a run.
#[derive(Debug)]
pub enum Outcome {
    /// A finished copy already existed locally.
    Skipped,
    Downloaded { bytes: u64 },
    /// Downloaded and matched its checksum.
    Verified { bytes: u64 },
    Failed(DownloadError),
    ChecksumFailed(DownloadError),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Skipped => "skipped",
            Outcome::Downloaded { .. } => "downloaded",
            Outcome::Verified { .. } => "verified",
            Outcome::Failed(_) => "failed",
            Outcome::ChecksumFailed(_) => "checksum failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_) | Outcome::ChecksumFailed(_))
    }

    pub fn error(&self) -> Option<&DownloadError> {
        match self {
            Outcome::Failed(err) | Outcome::ChecksumFailed(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct ItemReport {
    /// `<order>/<filename>`
    pub key: String,
    pub outcome: Outcome,
}

/// An order whose items could not be listed.
#[derive(Debug)]
pub struct OrderFailure {
    pub order: OrderId,
    pub error: ServiceError,
}

#[derive(Debug, Default)]
pub struct Summary {
    pub items: Vec<ItemReport>,
    pub order_failures: Vec<OrderFailure>,
}

impl Summary {
    pub(crate) fn record(&mut self, item: &Item, outcome: Outcome) {
        self.items.push(ItemReport {
            key: item.key(),
            outcome,
        });
    }

    pub(crate) fn record_order_failure(&mut self, order: OrderId, error: ServiceError) {
        self.order_failures.push(OrderFailure { order, error });
    }

    pub fn outcome(&self, key: &str) -> Option<&Outcome> {
        self.items
            .iter()
            .find(|report| report.key == key)
            .map(|report| &report.outcome)
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Skipped))
    }

    /// Downloaded items, verified or not.
    pub fn downloaded(&self) -> usize {
        self.count(|outcome| {
            matches!(
                outcome,
                Outcome::Downloaded { .. } | Outcome::Verified { .. }
            )
        })
    }

    pub fn verified(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Verified { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::is_failure)
    }

    pub fn bytes_downloaded(&self) -> u64 {
        self.items
            .iter()
            .map(|report| match report.outcome {
                Outcome::Downloaded { bytes } | Outcome::Verified { bytes } => bytes,
                _ => 0,
            })
            .sum()
    }

    /// Failed items plus orders that could not be listed.
    pub fn failure_count(&self) -> usize {
        self.failed() + self.order_failures.len()
    }

    pub fn total(&self) -> usize {
        self.items.len() + self.order_failures.len()
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.items
            .iter()
            .filter(|report| predicate(&report.outcome))
            .count()
    }

    /// Writes the end-of-run report to the log.
    pub fn log(&self) {
        for failure in &self.order_failures {
            warn!(
                order = %failure.order,
                kind = failure.error.kind(),
                "Order failed: {}",
                failure.error
            );
        }
        for report in &self.items {
            if let Some(err) = report.outcome.error() {
                warn!(
                    item = %report.key,
                    kind = err.kind(),
                    "Item {}: {}",
                    report.outcome.label(),
                    err
                );
            }
        }

        info!(
            skipped = self.skipped(),
            downloaded = self.downloaded(),
            verified = self.verified(),
            failed = self.failed(),
            failed_orders = self.order_failures.len(),
            bytes = self.bytes_downloaded(),
            "Run finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use url::Url;

    fn item(filename: &str) -> Item {
        let url = Url::parse(&format!("https://dl.example.com/0001/{filename}")).unwrap();
        Item::from_url(OrderId::new("0001").unwrap(), url).unwrap()
    }

    #[test]
    fn test_counts() {
        let mut summary = Summary::default();
        summary.record(&item("a.tar.gz"), Outcome::Skipped);
        summary.record(&item("b.tar.gz"), Outcome::Downloaded { bytes: 10 });
        summary.record(&item("c.tar.gz"), Outcome::Verified { bytes: 5 });
        summary.record(
            &item("d.tar.gz"),
            Outcome::Failed(DownloadError::transfer("https://dl.example.com/d", "reset")),
        );
        summary.record(
            &item("e.tar.gz"),
            Outcome::ChecksumFailed(DownloadError::ChecksumMismatch {
                path: PathBuf::from("e.tar.gz.corrupt"),
                expected: "00".to_string(),
                actual: "ff".to_string(),
            }),
        );
        summary.record_order_failure(
            OrderId::new("0002").unwrap(),
            ServiceError::NotFound {
                what: "order 0002".to_string(),
            },
        );

        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.downloaded(), 2);
        assert_eq!(summary.verified(), 1);
        assert_eq!(summary.failed(), 2);
        assert_eq!(summary.failure_count(), 3);
        assert_eq!(summary.total(), 6);
        assert_eq!(summary.bytes_downloaded(), 15);
        assert!(summary.has_failures());
        assert_eq!(summary.outcome("0001/a.tar.gz").map(Outcome::label), Some("skipped"));
        assert_eq!(
            summary
                .outcome("0001/d.tar.gz")
                .and_then(Outcome::error)
                .map(DownloadError::kind),
            Some("TransferError")
        );
    }

    #[test]
    fn test_empty_summary_is_success() {
        let summary = Summary::default();
        assert!(!summary.has_failures());
        assert_eq!(summary.total(), 0);
    }
}
