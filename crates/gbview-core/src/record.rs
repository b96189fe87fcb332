//! Building records as served by the record JSON API.
//!
//! ## Observed wire shape
//!
//! The API is a thin layer over a MySQL text-protocol result set, so every
//! column can arrive either as a JSON number or as a numeric string
//! (`"48.2100"`), and missing values show up as `null` or `""`. The
//! deserializers in [`lenient`] accept all of these and map blanks and
//! unparseable text to `None` rather than failing the whole record.
//!
//! Column names keep their historical spelling on the wire (`Title`,
//! `Year_from`, `lat`, `zoom`, `streetviewlink`); the Rust field names say what
//! the value means. In particular `zoom` holds the stored field-of-view column,
//! whose unit is ambiguous (see [`crate::viewpoint`]).

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Builds a pair only when both components are finite.
    #[must_use]
    pub fn new_finite(lat: f64, lng: f64) -> Option<Self> {
        (lat.is_finite() && lng.is_finite()).then_some(Self { lat, lng })
    }
}

/// A building record owned by the external store. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,

    #[serde(
        default,
        rename = "Title",
        alias = "title",
        deserialize_with = "lenient::opt_text"
    )]
    pub title: Option<String>,

    /// Description of the artwork on the building, if any.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub art: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub architecture: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub all_architects: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub zipcode: Option<String>,

    #[serde(
        default,
        rename = "Year_from",
        alias = "year_from",
        deserialize_with = "lenient::opt_i32"
    )]
    pub year_from: Option<i32>,

    #[serde(
        default,
        rename = "Year_to",
        alias = "year_to",
        deserialize_with = "lenient::opt_i32"
    )]
    pub year_to: Option<i32>,

    #[serde(
        default,
        rename = "lat",
        alias = "latitude",
        deserialize_with = "lenient::opt_f64"
    )]
    pub latitude: Option<f64>,

    #[serde(
        default,
        rename = "lng",
        alias = "longitude",
        deserialize_with = "lenient::opt_f64"
    )]
    pub longitude: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub heading: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub pitch: Option<f64>,

    /// Stored field-of-view column. Historically holds either degrees or an
    /// already-converted zoom level.
    #[serde(
        default,
        rename = "zoom",
        alias = "field_of_view",
        deserialize_with = "lenient::opt_f64"
    )]
    pub field_of_view: Option<f64>,

    /// Raw link pasted into the editing tool.
    #[serde(default, deserialize_with = "lenient::opt_text")]
    pub url: Option<String>,

    /// Panorama reference link (share URL or embed URL).
    #[serde(
        default,
        rename = "streetviewlink",
        alias = "panorama_reference",
        deserialize_with = "lenient::opt_text"
    )]
    pub panorama_reference: Option<String>,

    /// Whether the artwork can be seen in the panorama. Only some actions
    /// return it; absent means "not reported", not "hidden".
    #[serde(
        default,
        alias = "artVisible",
        deserialize_with = "lenient::opt_bool"
    )]
    pub art_visible: Option<bool>,
}

impl Record {
    /// An otherwise empty record with the given id.
    #[must_use]
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            title: None,
            art: None,
            architecture: None,
            all_architects: None,
            zipcode: None,
            year_from: None,
            year_to: None,
            latitude: None,
            longitude: None,
            heading: None,
            pitch: None,
            field_of_view: None,
            url: None,
            panorama_reference: None,
            art_visible: None,
        }
    }

    /// Explicit latitude/longitude columns, if both are present and finite.
    #[must_use]
    pub fn stored_position(&self) -> Option<LatLng> {
        LatLng::new_finite(self.latitude?, self.longitude?)
    }
}

pub(crate) mod lenient {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Int(i64),
        Float(f64),
        Text(String),
        Bool(bool),
    }

    fn parse_f64(raw: &str) -> Option<f64> {
        raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    pub(crate) fn id<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Scalar::deserialize(deserializer)? {
            Scalar::Int(v) => Ok(v),
            Scalar::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| de::Error::custom(format!("invalid record id \"{s}\""))),
            Scalar::Float(_) | Scalar::Bool(_) => {
                Err(de::Error::custom("record id must be an integer"))
            }
        }
    }

    pub(crate) fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[allow(clippy::cast_precision_loss)]
        let value = match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Int(v)) => Some(v as f64),
            Some(Scalar::Float(v)) => Some(v).filter(|v| v.is_finite()),
            Some(Scalar::Text(s)) => parse_f64(&s),
            Some(Scalar::Bool(_)) | None => None,
        };
        Ok(value)
    }

    pub(crate) fn opt_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Int(v)) => i32::try_from(v).ok(),
            Some(Scalar::Text(s)) => s.trim().parse::<i32>().ok(),
            Some(Scalar::Float(_) | Scalar::Bool(_)) | None => None,
        };
        Ok(value)
    }

    /// `1`/`0`, `"1"`/`"0"`, `"true"`/`"false"` or a JSON bool.
    pub(crate) fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Bool(v)) => Some(v),
            Some(Scalar::Int(v)) => Some(v != 0),
            Some(Scalar::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => Some(true),
                "0" | "false" => Some(false),
                _ => None,
            },
            Some(Scalar::Float(_)) | None => None,
        };
        Ok(value)
    }

    pub(crate) fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Text(s)) => Some(s).filter(|s| !s.trim().is_empty()),
            Some(Scalar::Int(v)) => Some(v.to_string()),
            Some(Scalar::Float(v)) => Some(v.to_string()),
            Some(Scalar::Bool(_)) | None => None,
        };
        Ok(value)
    }
}
