use super::OrderService;
use super::types::{Credentials, Item, OrderId};
use super::wire::{ItemStatusResponse, OrderListResponse};
use crate::error::{EspaError, ServiceError};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing;
use url::Url;

pub const DEFAULT_HOST: &str = "https://espa.cr.usgs.gov";

const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Client for the ESPA ordering API using HTTP basic authentication on every request.
#[derive(Debug, Clone)]
pub struct EspaClient {
    http: reqwest::Client,
    host: Url,
    email: String,
    credentials: Credentials,
}

impl EspaClient {
    pub fn new(
        host: &str,
        email: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, EspaError> {
        let host = Url::parse(host).map_err(|e| EspaError::CliArgumentValidation {
            details: format!("Invalid service host {host:?}: {e}"),
        })?;
        if host.cannot_be_a_base() {
            return Err(EspaError::CliArgumentValidation {
                details: format!("Service host {host} cannot be used as a base URL"),
            });
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("espadl/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            host,
            email: email.into(),
            credentials,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.host.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(API_PREFIX).extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T, ServiceError> {
        tracing::debug!(url = %url, "Querying order service");

        let response = self
            .http
            .get(url.clone())
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ServiceError::Unavailable {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        check_status(response.status(), &url, &self.credentials.username, what)?;

        let body = response.bytes().await.map_err(|e| ServiceError::Unavailable {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_slice(&body).map_err(|e| ServiceError::UnexpectedResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl OrderService for EspaClient {
    async fn list_orders(&self) -> Result<Vec<OrderId>, ServiceError> {
        let url = self.endpoint(&["list-orders", &self.email]);
        let response: OrderListResponse = self
            .get_json(url, &format!("orders for {}", self.email))
            .await?;

        let orders = response
            .into_order_ids()
            .into_iter()
            .filter_map(|order| match OrderId::new(order) {
                Ok(order) => Some(order),
                Err(reason) => {
                    tracing::warn!("Skipping order: {}", reason);
                    None
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(email = %self.email, count = orders.len(), "Listed orders");
        Ok(orders)
    }

    async fn list_items(&self, order: &OrderId) -> Result<Vec<Item>, ServiceError> {
        let url = self.endpoint(&["item-status", order.as_str()]);
        let mut response: ItemStatusResponse =
            self.get_json(url, &format!("order {order}")).await?;

        let mut items = Vec::new();
        for status in response.remove(order.as_str()).unwrap_or_default() {
            match status.into_item(order) {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {}
                Err(reason) => tracing::warn!(order = %order, "Skipping item: {}", reason),
            }
        }

        tracing::debug!(order = %order, count = items.len(), "Listed completed items");
        Ok(items)
    }
}

/// Maps HTTP status codes of the ordering API onto service errors.
pub(crate) fn check_status(
    status: StatusCode,
    url: &Url,
    username: &str,
    what: &str,
) -> Result<(), ServiceError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ServiceError::Authentication {
            username: username.to_string(),
        }),
        StatusCode::NOT_FOUND => Err(ServiceError::NotFound {
            what: what.to_string(),
        }),
        s => Err(ServiceError::Unavailable {
            url: url.to_string(),
            reason: format!("HTTP status {s}"),
        }),
    }
}
