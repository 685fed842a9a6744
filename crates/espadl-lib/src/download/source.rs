use super::types::DownloadRequest;
use crate::error::DownloadError;
use opendal::Operator;
use opendal::layers::TracingLayer;
use opendal::services::Http;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing;
use url::Url;

/// Resolves item URLs to the storage operator that serves them.
pub trait ItemSource: Send {
    /// Returns the operator for `url` and the path of the file below the operator's root.
    fn locate(&mut self, url: &Url) -> Result<(Operator, String), DownloadError>;

    fn request(
        &mut self,
        url: &Url,
        destination: PathBuf,
        expected_size: Option<u64>,
    ) -> Result<DownloadRequest, DownloadError> {
        let (operator, rel_path) = self.locate(url)?;
        Ok(DownloadRequest {
            url: url.clone(),
            operator,
            rel_path,
            destination,
            expected_size,
        })
    }
}

fn build_http_operator(base_url: &str) -> opendal::Result<Operator> {
    // No retry layer: failed transfers are reported and picked up by the next run.
    let builder = Http::default().endpoint(base_url);
    Ok(Operator::new(builder)?.layer(TracingLayer).finish())
}

/// Fetches items over plain HTTP(S), reusing one operator per origin.
#[derive(Debug, Default)]
pub struct HttpItemSource {
    operators: HashMap<String, Operator>,
}

impl HttpItemSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ItemSource for HttpItemSource {
    fn locate(&mut self, url: &Url) -> Result<(Operator, String), DownloadError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DownloadError::transfer(
                url,
                format!("unsupported URL scheme {:?}", url.scheme()),
            ));
        }
        // The HTTP operator addresses files by path alone and cannot carry a query.
        if url.query().is_some() {
            return Err(DownloadError::transfer(
                url,
                "download URLs with a query string are not supported",
            ));
        }
        // The operator percent-encodes the path itself.
        let path = percent_decode_str(url.path())
            .decode_utf8()
            .map_err(|e| DownloadError::transfer(url, format!("path is not valid UTF-8: {e}")))?
            .into_owned();

        let base_url = url.origin().ascii_serialization();
        let operator = match self.operators.get(&base_url) {
            Some(operator) => operator.clone(),
            None => {
                tracing::debug!(base = %base_url, "Creating operator");
                let operator = build_http_operator(&base_url)
                    .map_err(|e| DownloadError::transfer(url, e))?;
                self.operators.insert(base_url, operator.clone());
                operator
            }
        };

        Ok((operator, path))
    }
}
