use crate::verification::ContentDigest;
use percent_encoding::percent_decode_str;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// The sentinel order selector requesting every order of the user.
pub const ALL_ORDERS: &str = "ALL";

/// Identifier of an order on the service. Always usable as a single path component.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        validate_path_component(&id).map_err(|reason| format!("invalid order id {id:?}: {reason}"))?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OrderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Which orders a run should process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderSelector {
    All,
    Single(OrderId),
}

impl FromStr for OrderSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == ALL_ORDERS {
            Ok(Self::All)
        } else {
            OrderId::new(s).map(Self::Single)
        }
    }
}

impl fmt::Display for OrderSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_ORDERS),
            Self::Single(order) => fmt::Display::fmt(order, f),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChecksumReference {
    /// A companion checksum file to fetch alongside the item.
    Remote(Url),
    /// A digest supplied directly by the service.
    Inline(ContentDigest),
}

/// One downloadable file belonging to an order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub order_id: OrderId,
    pub url: Url,
    pub filename: String,
    pub size: Option<u64>,
    pub checksum: Option<ChecksumReference>,
}

impl Item {
    /// Builds an item whose local filename is the last segment of its URL.
    pub fn from_url(order_id: OrderId, url: Url) -> Result<Self, String> {
        let filename = filename_from_url(&url)?;
        Ok(Self {
            order_id,
            url,
            filename,
            size: None,
            checksum: None,
        })
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_checksum(mut self, checksum: ChecksumReference) -> Self {
        self.checksum = Some(checksum);
        self
    }

    /// Product name, i.e. the filename without its archive extension.
    pub fn name(&self) -> &str {
        self.filename
            .strip_suffix(".tar.gz")
            .unwrap_or(&self.filename)
    }

    /// `<order>/<filename>`, used to identify the item in logs and summaries.
    pub fn key(&self) -> String {
        format!("{}/{}", self.order_id, self.filename)
    }
}

/// Service account credentials. Never persisted; the password is redacted from `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The percent-decoded last path segment of `url`, checked to be a plain file name.
pub fn filename_from_url(url: &Url) -> Result<String, String> {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    let filename = percent_decode_str(segment)
        .decode_utf8()
        .map_err(|_| format!("no usable filename in {url}: not valid UTF-8"))?;
    validate_path_component(&filename)
        .map_err(|reason| format!("no usable filename in {url}: {reason}"))?;
    Ok(filename.into_owned())
}

fn validate_path_component(component: &str) -> Result<(), &'static str> {
    if component.is_empty() {
        return Err("empty");
    }
    if component == "." || component == ".." {
        return Err("relative path component");
    }
    if component.contains(['/', '\\', '\0']) {
        return Err("contains a path separator");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_selector_parsing() {
        assert_eq!("ALL".parse::<OrderSelector>().unwrap(), OrderSelector::All);
        assert_eq!(
            "espa-user@example.com-0101".parse::<OrderSelector>().unwrap(),
            OrderSelector::Single(OrderId::new("espa-user@example.com-0101").unwrap())
        );
        // The sentinel is case-sensitive.
        assert_eq!(
            "all".parse::<OrderSelector>().unwrap(),
            OrderSelector::Single(OrderId::new("all").unwrap())
        );
    }

    #[test]
    fn test_order_id_rejects_path_tricks() {
        assert!(OrderId::new("").is_err());
        assert!(OrderId::new("..").is_err());
        assert!(OrderId::new("a/b").is_err());
        assert!(OrderId::new("a\\b").is_err());
        assert!(OrderId::new("0001").is_ok());
    }

    #[test]
    fn test_item_from_url() {
        let url = Url::parse("https://download.example.com/orders/0001/LC08_sr.tar.gz").unwrap();
        let item = Item::from_url(OrderId::new("0001").unwrap(), url).unwrap();
        assert_eq!(item.filename, "LC08_sr.tar.gz");
        assert_eq!(item.name(), "LC08_sr");
        assert_eq!(item.key(), "0001/LC08_sr.tar.gz");
        assert_eq!(item.size, None);
    }

    #[test]
    fn test_item_filename_is_percent_decoded() {
        let url = Url::parse("https://download.example.com/orders/0001/LC08%20sr.tar.gz").unwrap();
        let item = Item::from_url(OrderId::new("0001").unwrap(), url).unwrap();
        assert_eq!(item.filename, "LC08 sr.tar.gz");

        // An encoded separator must not smuggle a directory into the filename.
        let url = Url::parse("https://download.example.com/orders/..%2F..%2Fetc%2Fpasswd").unwrap();
        assert!(Item::from_url(OrderId::new("0001").unwrap(), url).is_err());
        let url = Url::parse("https://download.example.com/orders/%2E%2E").unwrap();
        assert!(Item::from_url(OrderId::new("0001").unwrap(), url).is_err());
    }

    #[test]
    fn test_item_from_url_without_filename() {
        let url = Url::parse("https://download.example.com/orders/").unwrap();
        assert!(Item::from_url(OrderId::new("0001").unwrap(), url).is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials::new("user", "hunter2");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("hunter2"));
    }
}
