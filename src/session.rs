// Session bootstrap: endpoint bases discovered from the service summary.

use serde_json::Value;

use crate::error::SchemaError;
use crate::models::{require_object, require_str, Resolution, Wallpaper};

/// Asset origins advertised by the summary document under
/// `db_core.endpoints`.
///
/// Only a successful bootstrap produces one, so anything that needs an
/// absolute asset URL takes `&Endpoints` and cannot run before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub image: String,
    pub thumb: String,
    pub web: String,
}

impl Endpoints {
    /// Validate the summary document, stopping at the first missing key:
    /// `db_core`, then `endpoints`, then `image`, `thumb` and `web`.
    pub fn from_summary(summary: &Value) -> Result<Endpoints, SchemaError> {
        require_object(summary, "summary", "db_core")?;
        let db_core = &summary["db_core"];
        require_object(db_core, "db_core", "endpoints")?;
        let endpoints = &db_core["endpoints"];

        let image = require_str(endpoints, "endpoints", "image")?.to_string();
        let thumb = require_str(endpoints, "endpoints", "thumb")?.to_string();
        let web = require_str(endpoints, "endpoints", "web")?.to_string();
        Ok(Endpoints { image, thumb, web })
    }

    pub fn thumbnail_url(&self, wallpaper: &Wallpaper) -> Option<String> {
        wallpaper.paths.thumb.as_deref().map(|p| join(&self.thumb, p))
    }

    pub fn web_url(&self, wallpaper: &Wallpaper) -> Option<String> {
        wallpaper.paths.web.as_deref().map(|p| join(&self.web, p))
    }

    /// Unsigned image URL of a variant, when the API supplied its path.
    pub fn image_url(&self, variant: &Resolution) -> Option<String> {
        variant.image.as_deref().map(|p| join(&self.image, p))
    }
}

fn join(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
