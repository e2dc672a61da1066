// Catalog client: session bootstrap, typed lookups and the two-hop
// wallpaper download, all built on top of `ApiClient`.

use std::path::Path;

use log::{debug, info, warn};
use serde_json::Value;

use crate::api::{ApiClient, Query};
use crate::asset::{AssetFetcher, AssetWriter, FsWriter, SignedUrl};
use crate::config::Config;
use crate::error::{ApiError, Result, SchemaError};
use crate::models::{parse_download_url, Account, Wallpaper};
use crate::session::Endpoints;

pub const SUMMARY_PATH: &str = "/core";
pub const ACCOUNT_PATH: &str = "/core/account";
pub const WALLPAPERS_PATH: &str = "/core/wallpapers";

/// One client per program run. Holds the two request-building
/// capabilities: `api` (token-bearing) and `assets` (credential-free).
pub struct Blasphemy<W = FsWriter> {
    api: ApiClient,
    assets: AssetFetcher,
    writer: W,
    endpoints: Option<Endpoints>,
}

impl Blasphemy<FsWriter> {
    pub fn new(config: &Config) -> Result<Self> {
        Blasphemy::with_writer(config, FsWriter)
    }
}

impl<W: AssetWriter> Blasphemy<W> {
    /// Build a client that persists downloads through `writer`.
    pub fn with_writer(config: &Config, writer: W) -> Result<Self> {
        Ok(Blasphemy {
            api: ApiClient::new(config)?,
            assets: AssetFetcher::new()?,
            writer,
            endpoints: None,
        })
    }

    /// Endpoint bases, once [`Blasphemy::initialize`] has succeeded.
    pub fn endpoints(&self) -> Option<&Endpoints> {
        self.endpoints.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.endpoints.is_some()
    }

    /// Run the discovery call and record the endpoint bases.
    ///
    /// Nothing is recorded unless every required key is present. Once
    /// initialized, later calls return the recorded bases without another
    /// round trip.
    pub fn initialize(&mut self) -> Result<&Endpoints> {
        let endpoints = match self.endpoints.take() {
            Some(endpoints) => endpoints,
            None => self.discover()?,
        };
        Ok(&*self.endpoints.insert(endpoints))
    }

    fn discover(&self) -> Result<Endpoints> {
        let summary = self.get_summary()?;
        let endpoints = Endpoints::from_summary(&summary).map_err(|e| {
            warn!("bootstrap failed: {e}");
            e
        })?;
        info!(
            "bootstrap ok: image={} thumb={} web={}",
            endpoints.image, endpoints.thumb, endpoints.web
        );
        Ok(endpoints)
    }

    /// Raw service summary document.
    pub fn get_summary(&self) -> Result<Value> {
        self.api.get(SUMMARY_PATH, None)
    }

    pub fn get_account(&self) -> Result<Account> {
        let payload = self.api.get(ACCOUNT_PATH, None)?;
        Account::from_payload(&payload).map_err(log_schema)
    }

    /// One catalog page, undecoded. See [`crate::models::parse_wallpaper_listing`].
    pub fn list_wallpapers(&self, page: u32, limit: u32, order: &str) -> Result<Value> {
        let query = Query::new()
            .with("page", page)
            .with("limit", limit)
            .with("order", order);
        self.api.get(WALLPAPERS_PATH, Some(&query))
    }

    pub fn get_wallpaper(&self, wallpaper_id: u64) -> Result<Wallpaper> {
        let payload = self.api.get(&format!("/core/wallpaper/{wallpaper_id}"), None)?;
        Wallpaper::from_payload(&payload).map_err(log_schema)
    }

    /// Variant lookup; on success the payload carries `download.url`.
    ///
    /// `presentation` is the layout key the variant is listed under
    /// (`single`, `dual`, `triple`, ...).
    pub fn get_wallpaper_variant(
        &self,
        wallpaper_id: u64,
        width: u32,
        height: u32,
        presentation: &str,
        show_watermark: bool,
    ) -> Result<Value> {
        let path = variant_path(wallpaper_id, width, height, presentation);
        let query = Query::new().with("show_watermark", show_watermark);
        self.api.get(&path, Some(&query))
    }

    /// Resolve the signed URL for a variant, fetch it from its own host and
    /// write the bytes to `destination`.
    ///
    /// Nothing is written unless the asset host answers `200 OK`.
    pub fn download_wallpaper(
        &self,
        wallpaper_id: u64,
        width: u32,
        height: u32,
        presentation: &str,
        show_watermark: bool,
        destination: &Path,
    ) -> Result<u64> {
        let payload =
            self.get_wallpaper_variant(wallpaper_id, width, height, presentation, show_watermark)?;
        let raw_url = parse_download_url(&payload).map_err(log_schema)?;
        let signed = SignedUrl::parse(raw_url)?;
        debug!("resolved wallpaper {wallpaper_id} to {}", signed.host);

        let bytes = self.assets.fetch(&signed).map_err(|e| {
            warn!("asset fetch for wallpaper {wallpaper_id} failed: {e}");
            e
        })?;
        self.writer.write(&bytes, destination)?;
        info!(
            "saved wallpaper {wallpaper_id} ({} bytes) to {}",
            bytes.len(),
            destination.display()
        );
        Ok(bytes.len() as u64)
    }
}

fn variant_path(wallpaper_id: u64, width: u32, height: u32, presentation: &str) -> String {
    format!("/core/download/wallpaper/{presentation}/{width}/{height}/{wallpaper_id}")
}

fn log_schema(err: SchemaError) -> ApiError {
    warn!("unexpected payload: {err}");
    ApiError::Schema(err)
}
