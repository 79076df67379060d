mod app_config;
mod config;
mod search;
mod vehicles;
mod view;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use search::{parse_rental_datetime, SearchCriteria, RENTAL_DATE_FORMAT};
pub use vehicles::{
    cities_from_branches, Branch, City, FuelType, Segment, Transmission, VehicleOffer,
    CURRENCY_TRY, DISPLAY_FALLBACK,
};
pub use view::{apply_view, OfferFacets, OfferFilter, Page, SortOrder};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unrecognized rental date \"{0}\"")]
    InvalidDate(String),

    #[error("dropoff {dropoff} must be after pickup {pickup}")]
    InvalidDateRange { pickup: String, dropoff: String },

    #[error("city slug must not be empty")]
    EmptyCitySlug,

    #[error("unknown {kind} \"{value}\"")]
    UnknownLabel { kind: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
