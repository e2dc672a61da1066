// Typed entities mapped from API payloads.
//
// Each `from_*` / `parse_*` function checks the fields an operation depends
// on, in order, and stops at the first one that is missing so the caller
// learns exactly which field broke the payload.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::SchemaError;

/// Look up `field` on a JSON object, reporting `context` on failure.
pub(crate) fn require<'a>(
    value: &'a Value,
    context: &'static str,
    field: &'static str,
) -> Result<&'a Value, SchemaError> {
    value
        .get(field)
        .filter(|v| !v.is_null())
        .ok_or(SchemaError::MissingField { context, field })
}

pub(crate) fn require_object<'a>(
    value: &'a Value,
    context: &'static str,
    field: &'static str,
) -> Result<&'a Map<String, Value>, SchemaError> {
    require(value, context, field)?
        .as_object()
        .ok_or(SchemaError::WrongType {
            context,
            field,
            expected: "object",
        })
}

pub(crate) fn require_str<'a>(
    value: &'a Value,
    context: &'static str,
    field: &'static str,
) -> Result<&'a str, SchemaError> {
    require(value, context, field)?
        .as_str()
        .ok_or(SchemaError::WrongType {
            context,
            field,
            expected: "string",
        })
}

fn require_bool(
    value: &Value,
    context: &'static str,
    field: &'static str,
) -> Result<bool, SchemaError> {
    require(value, context, field)?
        .as_bool()
        .ok_or(SchemaError::WrongType {
            context,
            field,
            expected: "boolean",
        })
}

fn require_i64(
    value: &Value,
    context: &'static str,
    field: &'static str,
) -> Result<i64, SchemaError> {
    require(value, context, field)?
        .as_i64()
        .ok_or(SchemaError::WrongType {
            context,
            field,
            expected: "integer",
        })
}

/// The authenticated user's account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub active: bool,
    pub display_name: String,
    pub id: i64,
    pub lifetime: bool,
    /// Paid membership flag.
    pub plus: bool,
    pub membership_level: Option<String>,
}

impl Account {
    /// Map an account lookup response. Requires a `user` object carrying
    /// `active`, `display_name`, `id`, `lifetime` and `plus`;
    /// `membership_level` is taken when present.
    pub fn from_payload(payload: &Value) -> Result<Account, SchemaError> {
        const CTX: &str = "account user";
        require_object(payload, "account response", "user")?;
        let user = &payload["user"];

        Ok(Account {
            active: require_bool(user, CTX, "active")?,
            display_name: require_str(user, CTX, "display_name")?.to_string(),
            id: require_i64(user, CTX, "id")?,
            lifetime: require_bool(user, CTX, "lifetime")?,
            plus: require_bool(user, CTX, "plus")?,
            membership_level: user
                .get("membership_level")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

/// Multi-monitor arrangement a resolution variant is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    Single,
    Dual,
    Triple,
}

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::Single, Layout::Dual, Layout::Triple];

    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Single => "single",
            Layout::Dual => "dual",
            Layout::Triple => "triple",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Layout::Single),
            "dual" => Ok(Layout::Dual),
            "triple" => Ok(Layout::Triple),
            other => Err(format!("unknown layout `{other}` (expected single, dual or triple)")),
        }
    }
}

/// One width x height rendering of a wallpaper.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub label: Option<String>,
    /// Image path relative to the image endpoint base.
    #[serde(default)]
    pub image: Option<String>,
}

/// Relative paths of a wallpaper's derived assets.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WallpaperPaths {
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(default)]
    pub web: Option<String>,
}

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Wallpaper {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub free: bool,
    #[serde(default)]
    pub all_free: bool,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub paths: WallpaperPaths,
    /// Variants grouped by layout key, in the order the API lists them.
    #[serde(default)]
    pub resolutions: BTreeMap<String, Vec<Resolution>>,
}

impl Wallpaper {
    /// Map a single wallpaper object.
    pub fn from_value(value: &Value) -> Result<Wallpaper, SchemaError> {
        Wallpaper::deserialize(value).map_err(|e| SchemaError::Invalid {
            context: "wallpaper",
            message: e.to_string(),
        })
    }

    /// Map a wallpaper lookup response, which wraps the item in `wallpaper`.
    pub fn from_payload(payload: &Value) -> Result<Wallpaper, SchemaError> {
        require_object(payload, "wallpaper response", "wallpaper")?;
        Wallpaper::from_value(&payload["wallpaper"])
    }

    /// Exact-size variant under `layout`. First match wins; an unknown
    /// layout or a size with no exact match yields `None`.
    pub fn find_variant(&self, layout: &str, width: u32, height: u32) -> Option<&Resolution> {
        self.resolutions
            .get(layout)?
            .iter()
            .find(|r| r.width == width && r.height == height)
    }
}

/// One page of the catalog listing.
#[derive(Debug, Clone, PartialEq)]
pub struct WallpaperListing {
    pub total_pages: Option<u64>,
    pub wallpapers: Vec<Wallpaper>,
}

/// Map a listing payload. `wallpapers` may be an array or an object keyed
/// by wallpaper id.
pub fn parse_wallpaper_listing(payload: &Value) -> Result<WallpaperListing, SchemaError> {
    let items: Vec<&Value> = match require(payload, "wallpaper listing", "wallpapers")? {
        Value::Array(items) => items.iter().collect(),
        Value::Object(items) => items.values().collect(),
        _ => {
            return Err(SchemaError::WrongType {
                context: "wallpaper listing",
                field: "wallpapers",
                expected: "array or object",
            })
        }
    };
    let wallpapers = items
        .into_iter()
        .map(Wallpaper::from_value)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WallpaperListing {
        total_pages: payload.get("total_pages").and_then(Value::as_u64),
        wallpapers,
    })
}

/// Signed URL handed out by the variant lookup; `download.url` in the payload.
pub fn parse_download_url(payload: &Value) -> Result<&str, SchemaError> {
    require_object(payload, "download response", "download")?;
    require_str(&payload["download"], "download", "url")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn account_payload() -> Value {
        json!({
            "user": {
                "active": true,
                "display_name": "ryan",
                "id": 4242,
                "lifetime": false,
                "plus": true
            }
        })
    }

    fn wallpaper() -> Wallpaper {
        Wallpaper::from_value(&json!({
            "id": 1087,
            "name": "Brahmaputra",
            "content": "landscape",
            "free": false,
            "rating": 4.6,
            "paths": { "thumb": "/thumbs/1087.jpg", "web": "/wallpaper/1087" },
            "resolutions": {
                "single": [
                    { "label": "1920x1080", "width": 1920, "height": 1080, "image": "/single/1920x1080/brahmaputra.jpg" },
                    { "label": "2560x1440", "width": 2560, "height": 1440 },
                    { "label": "dup", "width": 1920, "height": 1080 }
                ],
                "dual": [
                    { "width": 3840, "height": 1080 }
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn account_maps_required_fields() {
        let account = Account::from_payload(&account_payload()).unwrap();
        assert_eq!(
            account,
            Account {
                active: true,
                display_name: "ryan".into(),
                id: 4242,
                lifetime: false,
                plus: true,
                membership_level: None,
            }
        );
    }

    #[test]
    fn account_takes_membership_level_when_present() {
        let mut payload = account_payload();
        payload["user"]["membership_level"] = json!("gold");
        let account = Account::from_payload(&payload).unwrap();
        assert_eq!(account.membership_level.as_deref(), Some("gold"));
    }

    #[test]
    fn account_without_user_is_rejected() {
        let err = Account::from_payload(&json!({"error": "unauthorized"})).unwrap_err();
        assert_eq!(err.field(), Some("user"));
    }

    #[test]
    fn account_reports_first_missing_field() {
        let mut payload = account_payload();
        payload["user"].as_object_mut().unwrap().remove("lifetime");
        payload["user"].as_object_mut().unwrap().remove("plus");
        let err = Account::from_payload(&payload).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingField {
                context: "account user",
                field: "lifetime"
            }
        );
    }

    #[test]
    fn account_rejects_wrong_types() {
        let mut payload = account_payload();
        payload["user"]["id"] = json!("4242");
        let err = Account::from_payload(&payload).unwrap_err();
        assert!(matches!(err, SchemaError::WrongType { field: "id", .. }));
    }

    #[test]
    fn find_variant_matches_both_dimensions() {
        let wp = wallpaper();
        let hit = wp.find_variant("single", 1920, 1080).unwrap();
        assert_eq!(hit.label.as_deref(), Some("1920x1080"));
        assert_eq!(wp.find_variant("dual", 3840, 1080).unwrap().width, 3840);
    }

    #[test]
    fn find_variant_first_match_wins() {
        let wp = wallpaper();
        let hit = wp.find_variant("single", 1920, 1080).unwrap();
        assert_eq!(hit.image.as_deref(), Some("/single/1920x1080/brahmaputra.jpg"));
    }

    #[test]
    fn find_variant_misses() {
        let wp = wallpaper();
        assert!(wp.find_variant("quad", 1920, 1080).is_none());
        assert!(wp.find_variant("triple", 5760, 1080).is_none());
        assert!(wp.find_variant("single", 1920, 1200).is_none());
        assert!(wp.find_variant("single", 1080, 1920).is_none());
    }

    #[test]
    fn wallpaper_payload_needs_wallpaper_object() {
        let err = Wallpaper::from_payload(&json!({"wallpapers": []})).unwrap_err();
        assert_eq!(err.field(), Some("wallpaper"));

        let wp = Wallpaper::from_payload(&json!({"wallpaper": {"id": 3, "name": "Ascent"}})).unwrap();
        assert_eq!(wp.id, 3);
        assert!(wp.resolutions.is_empty());
    }

    #[test]
    fn wallpaper_without_id_is_invalid() {
        let err = Wallpaper::from_value(&json!({"name": "nameless"})).unwrap_err();
        assert!(matches!(err, SchemaError::Invalid { context: "wallpaper", .. }));
    }

    #[test]
    fn listing_accepts_array_and_keyed_object() {
        let from_array = parse_wallpaper_listing(&json!({
            "total_pages": 12,
            "wallpapers": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]
        }))
        .unwrap();
        assert_eq!(from_array.total_pages, Some(12));
        assert_eq!(from_array.wallpapers.len(), 2);

        let from_object = parse_wallpaper_listing(&json!({
            "wallpapers": {"9": {"id": 9, "name": "c"}}
        }))
        .unwrap();
        assert_eq!(from_object.total_pages, None);
        assert_eq!(from_object.wallpapers[0].name, "c");
    }

    #[test]
    fn listing_rejects_scalar_wallpapers() {
        let err = parse_wallpaper_listing(&json!({"wallpapers": 5})).unwrap_err();
        assert!(matches!(err, SchemaError::WrongType { field: "wallpapers", .. }));
    }

    #[test]
    fn download_url_checks_each_level() {
        let missing_download = parse_download_url(&json!({"status": "ok"})).unwrap_err();
        assert_eq!(missing_download.field(), Some("download"));

        let missing_url = parse_download_url(&json!({"download": {"expires": 60}})).unwrap_err();
        assert_eq!(missing_url.field(), Some("url"));

        let doc = json!({"download": {"url": "https://cdn.example/x.jpg?sig=1"}});
        let url = parse_download_url(&doc).unwrap();
        assert_eq!(url, "https://cdn.example/x.jpg?sig=1");
    }

    #[test]
    fn layout_round_trips() {
        for layout in Layout::ALL {
            assert_eq!(layout.as_str().parse::<Layout>().unwrap(), layout);
        }
        assert!("quad".parse::<Layout>().is_err());
    }
}
