use async_trait::async_trait;
use espadl_lib::download::ItemSource;
use espadl_lib::error::{DownloadError, ServiceError};
use espadl_lib::inventory::LocalInventory;
use espadl_lib::orchestrator::Orchestrator;
use espadl_lib::service::{ChecksumReference, Item, OrderId, OrderService};
use md5::{Digest, Md5};
use opendal::Operator;
use opendal::services::Memory;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

pub const TEST_USERNAME: &str = "production";
pub const FILE_HOST: &str = "https://download.example.com";

enum FakeOrder {
    Items(Vec<Item>),
    Unavailable,
}

/// In-process stand-in for the ESPA ordering API.
pub struct FakeOrderService {
    orders: BTreeMap<OrderId, FakeOrder>,
    reject_credentials: bool,
    list_items_calls: Arc<AtomicUsize>,
}

impl Default for FakeOrderService {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeOrderService {
    pub fn new() -> Self {
        Self {
            orders: BTreeMap::new(),
            reject_credentials: false,
            list_items_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_order(mut self, order: &str, items: Vec<Item>) -> Self {
        self.orders
            .insert(order_id(order), FakeOrder::Items(items));
        self
    }

    /// An order that is listed but whose item status cannot be retrieved.
    pub fn with_unavailable_order(mut self, order: &str) -> Self {
        self.orders.insert(order_id(order), FakeOrder::Unavailable);
        self
    }

    /// Answers every request as if the password were wrong.
    pub fn rejecting_credentials(mut self) -> Self {
        self.reject_credentials = true;
        self
    }

    pub fn list_items_calls(&self) -> Arc<AtomicUsize> {
        self.list_items_calls.clone()
    }

    fn authenticate(&self) -> Result<(), ServiceError> {
        if self.reject_credentials {
            return Err(ServiceError::Authentication {
                username: TEST_USERNAME.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl OrderService for FakeOrderService {
    async fn list_orders(&self) -> Result<Vec<OrderId>, ServiceError> {
        self.authenticate()?;
        Ok(self.orders.keys().cloned().collect())
    }

    async fn list_items(&self, order: &OrderId) -> Result<Vec<Item>, ServiceError> {
        self.list_items_calls.fetch_add(1, Ordering::SeqCst);
        self.authenticate()?;
        match self.orders.get(order) {
            Some(FakeOrder::Items(items)) => Ok(items.clone()),
            Some(FakeOrder::Unavailable) => Err(ServiceError::Unavailable {
                url: format!("http://espa.invalid/api/v1/item-status/{order}"),
                reason: "HTTP status 503 Service Unavailable".to_string(),
            }),
            None => Err(ServiceError::NotFound {
                what: format!("order {order}"),
            }),
        }
    }
}

/// In-memory file host. Files are addressed by their full URL on [`FILE_HOST`].
#[derive(Clone)]
pub struct FakeFileHost {
    operator: Operator,
    transfers: Arc<AtomicUsize>,
}

impl FakeFileHost {
    pub fn new() -> eyre::Result<Self> {
        Ok(Self {
            operator: Operator::new(Memory::default())?.finish(),
            transfers: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Publishes `content` at `<FILE_HOST><path>` and returns the URL.
    pub async fn put(&self, path: &str, content: impl Into<Vec<u8>>) -> eyre::Result<Url> {
        let url = Url::parse(&format!("{FILE_HOST}{path}"))?;
        self.operator.write(url.path(), content.into()).await?;
        Ok(url)
    }

    /// Number of transfers started against this host so far.
    pub fn transfers(&self) -> usize {
        self.transfers.load(Ordering::SeqCst)
    }

    pub fn source(&self) -> FakeItemSource {
        FakeItemSource {
            operator: self.operator.clone(),
            transfers: self.transfers.clone(),
        }
    }
}

pub struct FakeItemSource {
    operator: Operator,
    transfers: Arc<AtomicUsize>,
}

impl ItemSource for FakeItemSource {
    fn locate(&mut self, url: &Url) -> Result<(Operator, String), DownloadError> {
        self.transfers.fetch_add(1, Ordering::SeqCst);
        Ok((self.operator.clone(), url.path().to_string()))
    }
}

pub fn order_id(order: &str) -> OrderId {
    OrderId::new(order).expect("valid order id")
}

pub fn item(order: &str, url: &Url) -> Item {
    Item::from_url(order_id(order), url.clone()).expect("URL with a filename")
}

pub fn item_with_checksum(order: &str, url: &Url, checksum_url: &Url) -> Item {
    item(order, url).with_checksum(ChecksumReference::Remote(checksum_url.clone()))
}

/// Deterministic payload of `len` bytes.
pub fn scene_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Checksum file contents in the `<md5>  <filename>` form ESPA publishes.
pub fn md5_checksum_file(content: &[u8], filename: &str) -> String {
    format!("{}  {}\n", hex::encode(Md5::digest(content)), filename)
}

pub fn orchestrator(
    service: FakeOrderService,
    host: &FakeFileHost,
    target_directory: &Path,
    verify_checksums: bool,
) -> Orchestrator<FakeOrderService, FakeItemSource> {
    Orchestrator::new(
        service,
        host.source(),
        LocalInventory::new(target_directory),
        verify_checksums,
    )
}

/// Sorted names of the entries directly inside `dir`.
pub fn dir_entries(dir: &Path) -> eyre::Result<Vec<String>> {
    let mut names = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
        .collect::<Result<Vec<_>, _>>()?;
    names.sort();
    Ok(names)
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("espadl_lib=debug,espadl_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
