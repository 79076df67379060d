//! City-wide availability: discover branches, search each one, merge the
//! offers into a single price-ordered list.

use futures::stream::{self, StreamExt};
use serde::Serialize;

use rentscope_core::{
    cities_from_branches, AppConfig, Branch, City, SearchCriteria, SortOrder, VehicleOffer,
};

use crate::client::BrokerClient;
use crate::error::BrokerError;
use crate::normalize::{parse_branches, parse_vehicles};
use crate::types::SearchRequest;

const BRANCHES_PATH: &str = "/GetBranchesData";
const SEARCH_PATH: &str = "/Search";

/// What the broker looked like during one aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamStatus {
    #[default]
    Ok,
    /// The branch list could not be fetched or read.
    BranchListUnavailable,
    /// The branch list was readable but held no usable branches.
    NoBranches,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationReport {
    pub upstream: UpstreamStatus,
    pub branches_total: usize,
    pub branches_in_city: usize,
    pub branches_failed: usize,
    pub offers_dropped_unpriced: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CitySearch {
    pub offers: Vec<VehicleOffer>,
    pub report: AggregationReport,
}

/// Merges availability across every branch of a city.
///
/// Never fails for upstream problems: a missing branch list, an unknown city
/// or failing branches all shrink the result, down to an empty list.
pub struct CityAggregator {
    client: BrokerClient,
    max_concurrent_branches: usize,
}

impl CityAggregator {
    /// `max_concurrent_branches` of 1 searches branches strictly one after
    /// another; larger values overlap the calls. Zero is treated as 1.
    #[must_use]
    pub fn new(client: BrokerClient, max_concurrent_branches: usize) -> Self {
        Self {
            client,
            max_concurrent_branches: max_concurrent_branches.max(1),
        }
    }

    /// # Errors
    ///
    /// Returns [`BrokerError`] if the broker client cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, BrokerError> {
        Ok(Self::new(
            BrokerClient::from_app_config(config)?,
            config.broker_max_concurrent_branches,
        ))
    }

    #[must_use]
    pub fn client(&self) -> &BrokerClient {
        &self.client
    }

    /// Every usable branch the broker lists, in upstream order.
    ///
    /// # Errors
    ///
    /// Propagates transport errors and envelope-level parse errors.
    pub async fn fetch_branches(&self) -> Result<Vec<Branch>, BrokerError> {
        let body = self.client.get(BRANCHES_PATH).await?;
        parse_branches(&body)
    }

    /// Distinct cities across all branches, sorted by display name.
    ///
    /// # Errors
    ///
    /// See [`CityAggregator::fetch_branches`].
    pub async fn list_cities(&self) -> Result<Vec<City>, BrokerError> {
        let branches = self.fetch_branches().await?;
        Ok(cities_from_branches(&branches))
    }

    /// Searches one branch and tags the offers with it.
    ///
    /// # Errors
    ///
    /// Propagates transport errors, `success: false` answers and malformed
    /// envelopes.
    pub async fn search_branch(
        &self,
        branch: &Branch,
        pickup_date: &str,
        dropoff_date: &str,
    ) -> Result<Vec<VehicleOffer>, BrokerError> {
        let request = SearchRequest::round_trip(branch, pickup_date, dropoff_date);
        let body = self.client.post(SEARCH_PATH, &request).await?;
        let mut offers = parse_vehicles(&body)?;
        for offer in &mut offers {
            offer.tag_with_branch(branch);
        }
        Ok(offers)
    }

    /// All priced offers in `city_slug` for the given dates, cheapest first.
    ///
    /// Dates must already be in the broker's `DD.MM.YYYY HH:MM` format.
    pub async fn get_available_vehicles_by_city(
        &self,
        city_slug: &str,
        pickup_date: &str,
        dropoff_date: &str,
    ) -> Vec<VehicleOffer> {
        self.search_city(city_slug, pickup_date, dropoff_date)
            .await
            .offers
    }

    /// Same as [`CityAggregator::get_available_vehicles_by_city`], with a
    /// report that tells "nothing available" apart from "broker is down".
    pub async fn search(&self, criteria: &SearchCriteria) -> CitySearch {
        self.search_city(
            criteria.city_slug(),
            &criteria.pickup_display(),
            &criteria.dropoff_display(),
        )
        .await
    }

    async fn search_city(
        &self,
        city_slug: &str,
        pickup_date: &str,
        dropoff_date: &str,
    ) -> CitySearch {
        let mut report = AggregationReport::default();

        let branches = match self.fetch_branches().await {
            Ok(branches) => branches,
            Err(e) => {
                tracing::warn!(city_slug, error = %e, "failed to fetch branch list");
                report.upstream = UpstreamStatus::BranchListUnavailable;
                return CitySearch {
                    offers: Vec::new(),
                    report,
                };
            }
        };

        report.branches_total = branches.len();
        if branches.is_empty() {
            tracing::warn!(city_slug, "branch list contained no usable branches");
            report.upstream = UpstreamStatus::NoBranches;
            return CitySearch {
                offers: Vec::new(),
                report,
            };
        }

        let in_city: Vec<Branch> = branches
            .into_iter()
            .filter(|b| b.is_in_city(city_slug))
            .collect();
        report.branches_in_city = in_city.len();
        if in_city.is_empty() {
            tracing::info!(city_slug, "no branches found for city");
            return CitySearch {
                offers: Vec::new(),
                report,
            };
        }

        // `buffered` yields in branch order whatever the completion order.
        let results: Vec<Result<Vec<VehicleOffer>, BrokerError>> =
            stream::iter(in_city.iter().cloned())
                .map(|branch| async move {
                    self.search_branch(&branch, pickup_date, dropoff_date)
                        .await
                })
                .buffered(self.max_concurrent_branches)
                .collect()
                .await;

        let mut offers = Vec::new();
        for (branch, result) in in_city.iter().zip(results) {
            match result {
                Ok(found) => {
                    tracing::debug!(
                        branch_id = %branch.branch_id,
                        count = found.len(),
                        "branch search finished"
                    );
                    offers.extend(found);
                }
                Err(e) => {
                    report.branches_failed += 1;
                    tracing::warn!(
                        branch_id = %branch.branch_id,
                        location_id = %branch.location_id,
                        status = ?e.status(),
                        error = %e,
                        "branch search failed; skipping"
                    );
                }
            }
        }

        let before = offers.len();
        offers.retain(|o| o.price_now.is_some());
        report.offers_dropped_unpriced = before - offers.len();

        SortOrder::PriceAsc.sort(&mut offers);

        tracing::info!(
            city_slug,
            branches = report.branches_in_city,
            failed = report.branches_failed,
            offers = offers.len(),
            "city aggregation finished"
        );

        CitySearch { offers, report }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::BrokerSettings;

    #[test]
    fn zero_concurrency_is_clamped_to_sequential() {
        let client = BrokerClient::new(&BrokerSettings {
            base_url: "https://broker.test".to_string(),
            tenant_id: "t".to_string(),
            user_agent: "rentscope-test/0.1".to_string(),
            connect_timeout_secs: 1,
            request_timeout_secs: 1,
        })
        .unwrap();
        let aggregator = CityAggregator::new(client, 0);
        assert_eq!(aggregator.max_concurrent_branches, 1);
    }

    #[test]
    fn report_serializes_upstream_status_in_snake_case() {
        let report = AggregationReport {
            upstream: UpstreamStatus::BranchListUnavailable,
            ..AggregationReport::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["upstream"], "branch_list_unavailable");
        assert_eq!(json["branches_failed"], 0);
    }
}
