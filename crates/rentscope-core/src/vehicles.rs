//! Normalized rental domain: branches, offers and the closed code tables
//! the broker uses for fuel, transmission and segment.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// The broker prices everything in Turkish lira.
pub const CURRENCY_TRY: &str = "TRY";

/// Placeholder for display strings the broker did not send.
pub const DISPLAY_FALLBACK: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Gasoline,
    Diesel,
    Electric,
    Hybrid,
    Unknown,
}

impl FuelType {
    pub const ALL: [FuelType; 5] = [
        FuelType::Gasoline,
        FuelType::Diesel,
        FuelType::Electric,
        FuelType::Hybrid,
        FuelType::Unknown,
    ];

    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => FuelType::Gasoline,
            2 => FuelType::Diesel,
            3 => FuelType::Electric,
            4 => FuelType::Hybrid,
            _ => FuelType::Unknown,
        }
    }

    #[must_use]
    pub fn from_code_opt(code: Option<i64>) -> Self {
        code.map_or(FuelType::Unknown, Self::from_code)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FuelType::Gasoline => "Gasoline",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
            FuelType::Unknown => "Unknown",
        }
    }
}

/// Codes 1 and 2 are both automatic gearboxes on the broker side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Transmission {
    Automatic,
    Manual,
    Unknown,
}

impl Transmission {
    pub const ALL: [Transmission; 3] = [
        Transmission::Automatic,
        Transmission::Manual,
        Transmission::Unknown,
    ];

    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            1 | 2 => Transmission::Automatic,
            3 => Transmission::Manual,
            _ => Transmission::Unknown,
        }
    }

    #[must_use]
    pub fn from_code_opt(code: Option<i64>) -> Self {
        code.map_or(Transmission::Unknown, Self::from_code)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Transmission::Automatic => "Automatic",
            Transmission::Manual => "Manual",
            Transmission::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Segment {
    Economy,
    Comfort,
    Luxury,
    Prestige,
    Unknown,
}

impl Segment {
    pub const ALL: [Segment; 5] = [
        Segment::Economy,
        Segment::Comfort,
        Segment::Luxury,
        Segment::Prestige,
        Segment::Unknown,
    ];

    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Segment::Economy,
            2 => Segment::Comfort,
            3 => Segment::Luxury,
            4 => Segment::Prestige,
            _ => Segment::Unknown,
        }
    }

    #[must_use]
    pub fn from_code_opt(code: Option<i64>) -> Self {
        code.map_or(Segment::Unknown, Self::from_code)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Segment::Economy => "Economy",
            Segment::Comfort => "Comfort",
            Segment::Luxury => "Luxury",
            Segment::Prestige => "Prestige",
            Segment::Unknown => "Unknown",
        }
    }
}

macro_rules! label_impls {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.label().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| CoreError::UnknownLabel {
                        kind: $kind,
                        value: s.to_owned(),
                    })
            }
        }
    };
}

label_impls!(FuelType, "fuel type");
label_impls!(Transmission, "transmission");
label_impls!(Segment, "segment");

/// One rentable location, as listed by the broker's branch endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// The broker's `referenceId`; this is what the search endpoint calls a branch.
    pub branch_id: String,
    /// The broker's `id`; the search endpoint calls this a location.
    pub location_id: String,
    pub name: String,
    pub city_slug: String,
}

impl Branch {
    /// Case-insensitive city match.
    #[must_use]
    pub fn is_in_city(&self, city_slug: &str) -> bool {
        self.city_slug.to_lowercase() == city_slug.to_lowercase()
    }
}

/// A priced vehicle at one branch for one date range.
///
/// Numeric prices stay `None` when the broker omits them so a missing price
/// never masquerades as a free rental.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleOffer {
    pub brand_model: String,
    pub fuel: FuelType,
    pub gear: Transmission,
    pub segment_name: Segment,
    pub price_now_display: String,
    pub price_office_display: String,
    pub daily_price_display: String,
    pub price_now: Option<f64>,
    pub price_office: Option<f64>,
    pub daily_price: Option<f64>,
    pub currency: String,
    pub image: Option<String>,
    pub branch_id: String,
    pub location_id: String,
    pub branch_name: String,
    pub city_slug: String,
}

impl VehicleOffer {
    /// Stamps the originating branch onto the offer.
    pub fn tag_with_branch(&mut self, branch: &Branch) {
        self.branch_id.clone_from(&branch.branch_id);
        self.location_id.clone_from(&branch.location_id);
        self.branch_name.clone_from(&branch.name);
        self.city_slug.clone_from(&branch.city_slug);
    }

    /// Amount saved by paying now instead of at the counter.
    #[must_use]
    pub fn savings(&self) -> Option<f64> {
        match (self.price_office, self.price_now) {
            (Some(office), Some(now)) if office - now > 0.0 => Some(office - now),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub slug: String,
    pub name: String,
}

/// Distinct cities across `branches`, named after their slug and sorted by name.
#[must_use]
pub fn cities_from_branches(branches: &[Branch]) -> Vec<City> {
    let mut seen = HashSet::new();
    let mut cities: Vec<City> = branches
        .iter()
        .filter(|b| seen.insert(b.city_slug.as_str()))
        .map(|b| City {
            slug: b.city_slug.clone(),
            name: capitalize_first(&b.city_slug),
        })
        .collect();
    cities.sort_by(|a, b| a.name.cmp(&b.name));
    cities
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "vehicles_test.rs"]
mod tests;
