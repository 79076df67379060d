use rentscope_broker::CityAggregator;

/// Prints every city with at least one branch.
///
/// # Errors
///
/// Returns an error if the branch list cannot be fetched.
pub(crate) async fn run_cities(aggregator: &CityAggregator, json: bool) -> anyhow::Result<()> {
    let cities = aggregator
        .list_cities()
        .await
        .map_err(|e| anyhow::anyhow!("failed to list cities: {e}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&cities)?);
        return Ok(());
    }

    if cities.is_empty() {
        println!("the broker lists no branches");
        return Ok(());
    }

    println!("{:<20}NAME", "SLUG");
    for city in &cities {
        println!("{:<20}{}", city.slug, city.name);
    }

    Ok(())
}
