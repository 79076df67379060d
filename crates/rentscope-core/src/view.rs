//! Filtering, ordering and paging over an aggregated offer list.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::vehicles::{FuelType, Segment, Transmission, VehicleOffer};
use crate::CoreError;

const DEFAULT_PER_PAGE: usize = 20;
const MAX_PER_PAGE: usize = 100;

/// `None` on any field means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferFilter {
    pub fuel: Option<FuelType>,
    pub gear: Option<Transmission>,
    pub segment: Option<Segment>,
}

impl OfferFilter {
    #[must_use]
    pub fn matches(&self, offer: &VehicleOffer) -> bool {
        self.fuel.is_none_or(|f| offer.fuel == f)
            && self.gear.is_none_or(|g| offer.gear == g)
            && self.segment.is_none_or(|s| offer.segment_name == s)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fuel.is_none() && self.gear.is_none() && self.segment.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    PriceAsc,
    PriceDesc,
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "price_asc" => Ok(SortOrder::PriceAsc),
            "price_desc" => Ok(SortOrder::PriceDesc),
            _ => Err(CoreError::UnknownLabel {
                kind: "sort order",
                value: s.to_owned(),
            }),
        }
    }
}

impl SortOrder {
    /// Stable sort; offers without a pay-now price go last in either direction.
    pub fn sort(self, offers: &mut [VehicleOffer]) {
        offers.sort_by(|a, b| match (a.price_now, b.price_now) {
            (Some(x), Some(y)) => match self {
                SortOrder::PriceAsc => x.total_cmp(&y),
                SortOrder::PriceDesc => y.total_cmp(&x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }
}

/// The filter choices that actually occur in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OfferFacets {
    pub fuels: Vec<FuelType>,
    pub gears: Vec<Transmission>,
    pub segments: Vec<Segment>,
}

impl OfferFacets {
    #[must_use]
    pub fn from_offers(offers: &[VehicleOffer]) -> Self {
        let mut facets = Self::default();
        for offer in offers {
            if offer.fuel != FuelType::Unknown && !facets.fuels.contains(&offer.fuel) {
                facets.fuels.push(offer.fuel);
            }
            if offer.gear != Transmission::Unknown && !facets.gears.contains(&offer.gear) {
                facets.gears.push(offer.gear);
            }
            if offer.segment_name != Segment::Unknown
                && !facets.segments.contains(&offer.segment_name)
            {
                facets.segments.push(offer.segment_name);
            }
        }
        facets.fuels.sort_unstable();
        facets.gears.sort_unstable();
        facets.segments.sort_unstable();
        facets
    }
}

/// 1-based page window. Built through [`Page::new`], which keeps both fields
/// at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: usize,
    per_page: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Page {
    #[must_use]
    pub fn new(number: Option<usize>, per_page: Option<usize>) -> Self {
        Self {
            number: number.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(DEFAULT_PER_PAGE)
                .clamp(1, MAX_PER_PAGE),
        }
    }

    #[must_use]
    pub fn number(&self) -> usize {
        self.number
    }

    #[must_use]
    pub fn per_page(&self) -> usize {
        self.per_page
    }

    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.number.saturating_sub(1).saturating_mul(self.per_page);
        if start >= items.len() {
            return &[];
        }
        let end = start.saturating_add(self.per_page).min(items.len());
        &items[start..end]
    }
}

/// Applies `filter`, then orders the survivors by `sort`.
#[must_use]
pub fn apply_view(offers: &[VehicleOffer], filter: &OfferFilter, sort: SortOrder) -> Vec<VehicleOffer> {
    let mut view: Vec<VehicleOffer> = if filter.is_empty() {
        offers.to_vec()
    } else {
        offers
            .iter()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect()
    };
    sort.sort(&mut view);
    view
}
