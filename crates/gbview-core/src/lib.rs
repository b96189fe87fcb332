//! Domain core for the Gemeindebau panorama viewer.
//!
//! Everything in this crate is pure: reference-link parsing, unit
//! conversion, viewpoint resolution and zoom correction take records in and
//! hand view parameters back without touching the network or shared state.

mod app_config;
mod config;
pub mod embed;
pub mod record;
pub mod reference;
pub mod slideshow;
pub mod units;
pub mod viewpoint;
pub mod zoom;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use embed::{build_embed_url, parse_for_storage, StoredView};
pub use record::{LatLng, Record};
pub use reference::{parse_reference, ParsedReference};
pub use slideshow::{is_eligible_for_random_view, pick_random, Slideshow, SlideshowEntry};
pub use viewpoint::{record_position, resolve, Viewpoint};
pub use zoom::{correct_zoom, PaneDimensions, PaneFraming};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
