//! `search` command: one citywide aggregation, printed as a table or JSON.

use rentscope_broker::{CityAggregator, CitySearch, UpstreamStatus};
use rentscope_core::{apply_view, OfferFilter, SearchCriteria, SortOrder, VehicleOffer};

const MODEL_WIDTH: usize = 28;

pub(crate) struct SearchArgs<'a> {
    pub city: &'a str,
    pub pickup: &'a str,
    pub dropoff: &'a str,
    pub filter: OfferFilter,
    pub sort: SortOrder,
    pub limit: Option<usize>,
    pub json: bool,
}

/// # Errors
///
/// Returns an error if the dates are invalid or the broker's branch list
/// cannot be fetched. Failing branches are skipped, not reported as errors.
pub(crate) async fn run_search(
    aggregator: &CityAggregator,
    args: &SearchArgs<'_>,
) -> anyhow::Result<()> {
    let criteria = SearchCriteria::parse(args.city, args.pickup, args.dropoff)?;
    let search = aggregator.search(&criteria).await;

    if search.report.upstream == UpstreamStatus::BranchListUnavailable {
        anyhow::bail!("rental broker is unavailable; could not fetch the branch list");
    }

    let mut offers = apply_view(&search.offers, &args.filter, args.sort);
    if let Some(limit) = args.limit {
        offers.truncate(limit);
    }

    if args.json {
        let out = CitySearch {
            offers,
            report: search.report,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if offers.is_empty() {
        println!(
            "no offers in {} for {} to {}",
            criteria.city_slug(),
            criteria.pickup_display(),
            criteria.dropoff_display()
        );
        return Ok(());
    }

    println!("{}", table_header());
    for offer in &offers {
        println!("{}", table_row(offer));
    }
    println!();
    println!(
        "{} offers from {} branches in {} ({} failed)",
        offers.len(),
        search.report.branches_in_city,
        criteria.city_slug(),
        search.report.branches_failed
    );

    Ok(())
}

pub(crate) fn table_header() -> String {
    format!(
        "{:<14}{:<14}{:<10}{:<12}{:<w$}{:<10}{:<11}{:<10}BRANCH",
        "PAY NOW",
        "AT OFFICE",
        "SAVES",
        "DAILY",
        "MODEL",
        "FUEL",
        "GEAR",
        "SEGMENT",
        w = MODEL_WIDTH + 2
    )
}

pub(crate) fn table_row(offer: &VehicleOffer) -> String {
    format!(
        "{:<14}{:<14}{:<10}{:<12}{:<w$}{:<10}{:<11}{:<10}{}",
        offer.price_now_display,
        offer.price_office_display,
        fmt_savings(offer.savings()),
        offer.daily_price_display,
        truncate(&offer.brand_model, MODEL_WIDTH),
        offer.fuel.label(),
        offer.gear.label(),
        offer.segment_name.label(),
        offer.branch_name,
        w = MODEL_WIDTH + 2
    )
}

/// Pay-now saving with two decimals, or a dash when paying now is not cheaper.
fn fmt_savings(savings: Option<f64>) -> String {
    savings.map_or_else(|| "\u{2014}".to_string(), |s| format!("{s:.2}"))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars - 3).collect::<String>())
    } else {
        text.to_string()
    }
}
