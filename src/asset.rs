// Asset retrieval: fetch a signed URL from its own host and persist the
// bytes.
//
// The fetcher is built without any credential. The signed URL authorizes
// the request by itself, and the API token must never reach the asset host.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use url::Url;

use crate::error::{ApiError, Result};

/// A pre-authorized download URL split into the parts used to address the
/// asset host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub query: Option<String>,
}

impl SignedUrl {
    /// Parse an absolute URL. The port defaults to 443 for `https` and 80
    /// for anything else.
    pub fn parse(raw: &str) -> Result<SignedUrl> {
        let invalid = |reason: &str| ApiError::InvalidUrl {
            url: raw.to_string(),
            reason: reason.to_string(),
        };
        let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
        let scheme = url.scheme().to_string();
        if scheme != "http" && scheme != "https" {
            return Err(invalid("unsupported scheme"));
        }
        let host = url.host_str().ok_or_else(|| invalid("no host"))?.to_string();
        let default_port = if scheme == "https" { 443 } else { 80 };

        Ok(SignedUrl {
            port: url.port().unwrap_or(default_port),
            path: url.path().to_string(),
            query: url.query().map(str::to_string),
            scheme,
            host,
        })
    }

    /// Path plus query, as sent on the request line.
    pub fn target(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }

    /// The absolute URL rebuilt from its parts, port made explicit.
    pub fn to_request_url(&self) -> String {
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        format!("{}://{}:{}{}", self.scheme, host, self.port, self.target())
    }
}

/// Unauthenticated client for asset hosts.
#[derive(Clone)]
pub struct AssetFetcher {
    client: Client,
}

impl AssetFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .redirect(Policy::none())
            .build()?;
        Ok(AssetFetcher { client })
    }

    /// GET the asset with no extra headers. Only `200 OK` is a success; the
    /// body is read in full before it is returned.
    pub fn fetch(&self, url: &SignedUrl) -> Result<Vec<u8>> {
        let target = url.to_request_url();
        debug!("GET {}:{}{}", url.host, url.port, url.path);
        let res = self.client.get(target.as_str()).send()?;
        let status = res.status();
        if status != StatusCode::OK {
            return Err(ApiError::AssetStatus {
                status: status.as_u16(),
            });
        }
        Ok(res.bytes()?.to_vec())
    }
}

/// Where downloaded bytes end up.
pub trait AssetWriter {
    fn write(&self, bytes: &[u8], path: &Path) -> std::io::Result<()>;
}

/// Writes to the filesystem through a temporary sibling file that is
/// renamed over the destination, so a failed write leaves no partial file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

impl AssetWriter for FsWriter {
    fn write(&self, bytes: &[u8], path: &Path) -> std::io::Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}
