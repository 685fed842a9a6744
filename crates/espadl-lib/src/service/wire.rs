//! JSON shapes returned by the ESPA ordering API.

use super::types::{ChecksumReference, Item, OrderId};
use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

/// `list-orders` has been served both as a bare array and wrapped in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OrderListResponse {
    Bare(Vec<String>),
    Wrapped { orders: Vec<String> },
}

impl OrderListResponse {
    pub(crate) fn into_order_ids(self) -> Vec<String> {
        match self {
            OrderListResponse::Bare(orders) | OrderListResponse::Wrapped { orders } => orders,
        }
    }
}

/// `item-status` maps the order id onto the status of each of its items.
pub(crate) type ItemStatusResponse = HashMap<String, Vec<ItemStatus>>;

#[derive(Debug, Deserialize)]
pub(crate) struct ItemStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub product_dload_url: Option<String>,
    #[serde(default)]
    pub cksum_download_url: Option<String>,
}

const COMPLETE: &str = "complete";

impl ItemStatus {
    pub(crate) fn is_complete(&self) -> bool {
        self.status.as_deref().is_none_or(|status| status == COMPLETE)
    }

    /// Converts a completed entry into an [`Item`]. `Ok(None)` means there is nothing to
    /// download yet.
    pub(crate) fn into_item(self, order_id: &OrderId) -> Result<Option<Item>, String> {
        if !self.is_complete() {
            return Ok(None);
        }
        let Some(product_url) = non_empty(self.product_dload_url) else {
            return Ok(None);
        };

        let url = Url::parse(&product_url).map_err(|e| format!("invalid download URL {product_url:?}: {e}"))?;
        let mut item = Item::from_url(order_id.clone(), url)?;

        if let Some(checksum_url) = non_empty(self.cksum_download_url) {
            let checksum_url = Url::parse(&checksum_url)
                .map_err(|e| format!("invalid checksum URL {checksum_url:?}: {e}"))?;
            item = item.with_checksum(ChecksumReference::Remote(checksum_url));
        }

        Ok(Some(item))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_list_shapes() {
        let bare: OrderListResponse = serde_json::from_str(r#"["0001", "0002"]"#).unwrap();
        assert_eq!(bare.into_order_ids(), vec!["0001", "0002"]);

        let wrapped: OrderListResponse =
            serde_json::from_str(r#"{"orders": ["production@email.com-0000-00-00"]}"#).unwrap();
        assert_eq!(
            wrapped.into_order_ids(),
            vec!["production@email.com-0000-00-00"]
        );
    }

    #[test]
    fn test_item_status_filters_incomplete_items() {
        let body = r#"{
            "0001": [
                {"name": "LC08_A", "status": "complete",
                 "product_dload_url": "https://dl.example.com/0001/LC08_A.tar.gz",
                 "cksum_download_url": "https://dl.example.com/0001/LC08_A.md5"},
                {"name": "LC08_B", "status": "processing", "product_dload_url": ""},
                {"name": "LC08_C", "status": "complete", "product_dload_url": ""},
                {"product_dload_url": "http://download.com/filename.tar.gz"}
            ]
        }"#;
        let response: ItemStatusResponse = serde_json::from_str(body).unwrap();
        let order = OrderId::new("0001").unwrap();

        let items: Vec<Item> = response
            .into_values()
            .flatten()
            .filter_map(|status| status.into_item(&order).unwrap())
            .collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].filename, "LC08_A.tar.gz");
        assert_eq!(
            items[0].checksum,
            Some(ChecksumReference::Remote(
                Url::parse("https://dl.example.com/0001/LC08_A.md5").unwrap()
            ))
        );
        assert_eq!(items[1].filename, "filename.tar.gz");
        assert_eq!(items[1].checksum, None);
    }

    #[test]
    fn test_item_status_rejects_bad_urls() {
        let status = ItemStatus {
            status: Some("complete".to_string()),
            product_dload_url: Some("not a url".to_string()),
            cksum_download_url: None,
        };
        assert!(status.into_item(&OrderId::new("0001").unwrap()).is_err());
    }
}
