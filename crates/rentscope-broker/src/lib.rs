pub mod aggregate;
pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use aggregate::{AggregationReport, CityAggregator, CitySearch, UpstreamStatus};
pub use client::{BrokerClient, BrokerSettings};
pub use error::BrokerError;
pub use normalize::{normalize_branches, normalize_vehicles, parse_branches, parse_vehicles};
pub use types::SearchRequest;
