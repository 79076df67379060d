//! Conversion from the broker's JSON envelopes to [`rentscope_core`] types.
//!
//! Individual bad records are skipped, never fatal. Whole-envelope problems
//! are returned as errors by the `parse_*` functions; the `normalize_*`
//! wrappers log them and return an empty list instead.

use serde::Deserialize;
use serde_json::Value;

use rentscope_core::{
    Branch, FuelType, Segment, Transmission, VehicleOffer, CURRENCY_TRY, DISPLAY_FALLBACK,
};

use crate::error::BrokerError;
use crate::types::{RawBranch, RawVehicle};

const LOG_SNIPPET_CHARS: usize = 500;

/// Parses the `GetBranchesData` envelope.
///
/// Records missing any of `id`, `referenceId`, `name` or `citySlug` are
/// dropped; the rest keep their upstream order.
///
/// # Errors
///
/// - [`BrokerError::Deserialize`] if the body is not JSON.
/// - [`BrokerError::MalformedResponse`] if there is no `data` array.
pub fn parse_branches(raw: &str) -> Result<Vec<Branch>, BrokerError> {
    let envelope: Value = serde_json::from_str(raw).map_err(|e| BrokerError::Deserialize {
        context: "branch list".to_string(),
        source: e,
    })?;

    let items = envelope
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| BrokerError::MalformedResponse {
            context: "branch list".to_string(),
            reason: "missing `data` array".to_string(),
        })?;

    Ok(items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| branch_from_value(idx, item))
        .collect())
}

/// Like [`parse_branches`], but logs envelope problems and returns an empty list.
#[must_use]
pub fn normalize_branches(raw: &str) -> Vec<Branch> {
    parse_branches(raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, body = %snippet(raw), "failed to parse branch list");
        Vec::new()
    })
}

/// Parses the `Search` envelope into untagged offers.
///
/// Branch fields on the returned offers are empty; the aggregator fills them in.
///
/// # Errors
///
/// - [`BrokerError::Deserialize`] if the body is not JSON.
/// - [`BrokerError::Upstream`] if the broker answered `success: false`.
/// - [`BrokerError::MalformedResponse`] if there is no `data.vehicles` array.
pub fn parse_vehicles(raw: &str) -> Result<Vec<VehicleOffer>, BrokerError> {
    let envelope: Value = serde_json::from_str(raw).map_err(|e| BrokerError::Deserialize {
        context: "vehicle search".to_string(),
        source: e,
    })?;

    if let Some(items) = envelope.pointer("/data/vehicles").and_then(Value::as_array) {
        return Ok(items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| offer_from_value(idx, item))
            .collect());
    }

    if envelope.get("success").and_then(Value::as_bool) == Some(false) {
        let message = envelope
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(BrokerError::Upstream { message });
    }

    Err(BrokerError::MalformedResponse {
        context: "vehicle search".to_string(),
        reason: "missing `data.vehicles` array".to_string(),
    })
}

/// Like [`parse_vehicles`], but logs envelope problems and returns an empty list.
#[must_use]
pub fn normalize_vehicles(raw: &str) -> Vec<VehicleOffer> {
    match parse_vehicles(raw) {
        Ok(offers) => offers,
        Err(BrokerError::Upstream { message }) => {
            tracing::warn!(upstream_message = %message, "broker reported a vehicle search failure");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, body = %snippet(raw), "failed to parse vehicle search");
            Vec::new()
        }
    }
}

fn branch_from_value(idx: usize, item: &Value) -> Option<Branch> {
    let raw = match RawBranch::deserialize(item) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(idx, error = %e, "skipping unreadable branch record");
            return None;
        }
    };

    match (raw.id, raw.reference_id, raw.name, raw.city_slug) {
        (Some(location_id), Some(branch_id), Some(name), Some(city_slug)) => Some(Branch {
            branch_id,
            location_id,
            name,
            city_slug,
        }),
        _ => {
            tracing::debug!(idx, "skipping branch record with missing fields");
            None
        }
    }
}

fn offer_from_value(idx: usize, item: &Value) -> Option<VehicleOffer> {
    let raw = match RawVehicle::deserialize(item) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(idx, error = %e, "skipping unreadable vehicle record");
            return None;
        }
    };

    let (Some(info), Some(price)) = (raw.vehicle_info, raw.price_info) else {
        tracing::debug!(idx, "skipping vehicle without vehicleInfo and priceInfo");
        return None;
    };

    let or_fallback = |s: Option<String>| s.unwrap_or_else(|| DISPLAY_FALLBACK.to_string());

    Some(VehicleOffer {
        brand_model: or_fallback(info.vehicle_description),
        fuel: FuelType::from_code_opt(info.fuel_type),
        gear: Transmission::from_code_opt(info.transmission_type),
        segment_name: Segment::from_code_opt(info.segment),
        price_now_display: or_fallback(price.discounted_price_str),
        price_office_display: or_fallback(price.net_price_str),
        daily_price_display: or_fallback(price.daily_price_str),
        price_now: price.discounted_price,
        price_office: price.net_price,
        daily_price: price.daily_price,
        currency: CURRENCY_TRY.to_string(),
        image: info.image,
        branch_id: String::new(),
        location_id: String::new(),
        branch_name: String::new(),
        city_slug: String::new(),
    })
}

fn snippet(raw: &str) -> String {
    raw.chars().take(LOG_SNIPPET_CHARS).collect()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
