//! Wire types for the rental broker's JSON API.
//!
//! ## Observed shapes
//!
//! ### `GET /GetBranchesData`
//! `{"data": [{"id", "referenceId", "name", "citySlug", ...}]}`. Branches carry
//! many more fields (coordinates, opening hours); only the four we need are
//! modelled. Any of them may be missing on individual records.
//!
//! ### `POST /Search`
//! Success: `{"data": {"vehicles": [{"vehicleInfo": {...}, "priceInfo": {...}}]}}`.
//! Failure: `{"success": false, "error": {"message": "..."}}`, still with a 2xx status.
//!
//! ### Codes and prices
//! `fuelType`, `transmissionType` and `segment` are small integers. Prices are
//! JSON numbers with a pre-formatted `...Str` sibling (e.g. `"1.234,50 ₺"`).
//! Both are read leniently: numeric strings are accepted and anything else is
//! treated as absent rather than failing the record. Display strings are
//! read the same way, and branch ids may arrive as integers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use rentscope_core::Branch;

/// One entry of the branch list. Every field is optional here; the
/// normalizer decides which records are usable.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBranch {
    /// Usually a string; integer ids are accepted and stringified.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub reference_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city_slug: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVehicle {
    #[serde(default)]
    pub vehicle_info: Option<RawVehicleInfo>,
    #[serde(default)]
    pub price_info: Option<RawPriceInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVehicleInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub vehicle_description: Option<String>,
    #[serde(default, deserialize_with = "lenient_code")]
    pub fuel_type: Option<i64>,
    #[serde(default, deserialize_with = "lenient_code")]
    pub transmission_type: Option<i64>,
    #[serde(default, deserialize_with = "lenient_code")]
    pub segment: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPriceInfo {
    /// Pay-now price.
    #[serde(default, deserialize_with = "lenient_price")]
    pub discounted_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub discounted_price_str: Option<String>,
    /// Pay-at-office price.
    #[serde(default, deserialize_with = "lenient_price")]
    pub net_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub net_price_str: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub daily_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub daily_price_str: Option<String>,
}

/// Body of `POST /Search`.
///
/// Only same-branch round trips are supported, so the arrival branch and
/// location always mirror the pickup ones.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest<'a> {
    pub branch_id: &'a str,
    pub location_id: &'a str,
    pub arrival_branch_id: &'a str,
    pub arrival_location_id: &'a str,
    pub month: Option<u8>,
    pub rent_id: Option<&'a str>,
    pub coupon_code: Option<&'a str>,
    pub collaboration_id: Option<&'a str>,
    pub collaboration_reference_id: Option<&'a str>,
    /// `DD.MM.YYYY HH:MM`
    pub pickup_date: &'a str,
    /// `DD.MM.YYYY HH:MM`
    pub dropoff_date: &'a str,
}

impl<'a> SearchRequest<'a> {
    #[must_use]
    pub fn round_trip(branch: &'a Branch, pickup_date: &'a str, dropoff_date: &'a str) -> Self {
        Self {
            branch_id: &branch.branch_id,
            location_id: &branch.location_id,
            arrival_branch_id: &branch.branch_id,
            arrival_location_id: &branch.location_id,
            month: None,
            rent_id: None,
            coupon_code: None,
            collaboration_id: None,
            collaboration_reference_id: None,
            pickup_date,
            dropoff_date,
        }
    }
}

fn lenient_code<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(code_from_value))
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(price_from_value))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(Some(n.to_string())),
        _ => Ok(None),
    }
}

fn code_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn price_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
