use std::str::FromStr;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use rentscope_broker::AggregationReport;
use rentscope_core::{
    apply_view, CoreError, FuelType, OfferFacets, OfferFilter, Page, SearchCriteria, Segment,
    SortOrder, Transmission, VehicleOffer,
};
use serde::{Deserialize, Serialize};

use crate::middleware::{RequestId, UpstreamCalls};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Raw query parameters; parsed in the handler so failures become `ApiError`s.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct VehiclesQuery {
    pub city_slug: Option<String>,
    pub pickup_date: Option<String>,
    pub dropoff_date: Option<String>,
    pub fuel: Option<String>,
    pub gear: Option<String>,
    pub segment: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// An offer as the API returns it, with the pay-now saving precomputed.
#[derive(Debug, Serialize)]
pub(super) struct OfferView {
    #[serde(flatten)]
    pub offer: VehicleOffer,
    pub savings: Option<f64>,
}

impl From<VehicleOffer> for OfferView {
    fn from(offer: VehicleOffer) -> Self {
        Self {
            savings: offer.savings(),
            offer,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct VehiclesData {
    pub vehicles: Vec<OfferView>,
    /// Offers on this page.
    pub count: usize,
    /// Offers matching the filter across all pages.
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    /// Computed before filtering, so a client can always widen its filter.
    pub facets: OfferFacets,
    pub report: AggregationReport,
}

pub(super) async fn list_vehicles(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<VehiclesQuery>,
) -> Result<(Extension<UpstreamCalls>, Json<ApiResponse<VehiclesData>>), ApiError> {
    let rid = req_id.0.as_str();

    let pickup = required(rid, "pickupDate", query.pickup_date.as_deref())?;
    let dropoff = required(rid, "dropoffDate", query.dropoff_date.as_deref())?;
    let city = non_blank(query.city_slug.as_deref()).unwrap_or(state.config.default_city.as_str());

    let criteria =
        SearchCriteria::parse(city, pickup, dropoff).map_err(|e| validation_error(rid, &e))?;

    let filter = OfferFilter {
        fuel: parse_label::<FuelType>(rid, query.fuel.as_deref())?,
        gear: parse_label::<Transmission>(rid, query.gear.as_deref())?,
        segment: parse_label::<Segment>(rid, query.segment.as_deref())?,
    };
    let sort = parse_label::<SortOrder>(rid, query.sort.as_deref())?.unwrap_or_default();
    let page = Page::new(
        parse_count(rid, "page", query.page.as_deref())?,
        parse_count(rid, "perPage", query.per_page.as_deref())?,
    );

    let search = state.aggregator.search(&criteria).await;
    let facets = OfferFacets::from_offers(&search.offers);
    let view = apply_view(&search.offers, &filter, sort);
    let vehicles: Vec<OfferView> = page
        .slice(&view)
        .iter()
        .cloned()
        .map(OfferView::from)
        .collect();

    tracing::info!(
        city_slug = criteria.city_slug(),
        aggregated = search.offers.len(),
        matched = view.len(),
        returned = vehicles.len(),
        upstream = ?search.report.upstream,
        "vehicle search served"
    );

    let calls = UpstreamCalls(1 + search.report.branches_in_city);
    Ok((
        Extension(calls),
        Json(ApiResponse {
            data: VehiclesData {
                count: vehicles.len(),
                total: view.len(),
                vehicles,
                page: page.number(),
                per_page: page.per_page(),
                facets,
                report: search.report,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(
    request_id: &str,
    name: &str,
    value: Option<&'a str>,
) -> Result<&'a str, ApiError> {
    non_blank(value)
        .ok_or_else(|| ApiError::new(request_id, "bad_request", format!("{name} is required")))
}

fn parse_label<T>(request_id: &str, value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = CoreError>,
{
    non_blank(value)
        .map(str::parse)
        .transpose()
        .map_err(|e| validation_error(request_id, &e))
}

fn parse_count(
    request_id: &str,
    name: &str,
    value: Option<&str>,
) -> Result<Option<usize>, ApiError> {
    non_blank(value)
        .map(|v| {
            v.parse::<usize>().map_err(|_| {
                ApiError::new(
                    request_id,
                    "validation_error",
                    format!("{name} must be a positive integer"),
                )
            })
        })
        .transpose()
}

fn validation_error(request_id: &str, error: &CoreError) -> ApiError {
    ApiError::new(request_id, "validation_error", error.to_string())
}
