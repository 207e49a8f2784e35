/// Traffic statistics over the current window.
use crate::domain::{ClassifiedAircraft, CountryCount, TrafficSummary};
use std::collections::HashMap;

pub const DEFAULT_TOP_COUNTRIES: usize = 5;

/// Most frequent values, ties broken alphabetically
pub fn top_counts<'a, I>(values: I, n: usize) -> Vec<CountryCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut ranked: Vec<CountryCount> = counts
        .into_iter()
        .map(|(country, count)| CountryCount {
            country: country.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.country.cmp(&b.country)));
    ranked.truncate(n);
    ranked
}

pub fn summarize(aircraft: &[ClassifiedAircraft], top_n: usize) -> TrafficSummary {
    let countries = aircraft.iter().filter_map(|a| a.origin_country.as_deref());
    let distinct = top_counts(countries.clone(), usize::MAX).len();

    TrafficSummary {
        total_aircraft: aircraft.len(),
        military_aircraft: aircraft.iter().filter(|a| a.is_military).count(),
        countries: distinct,
        top_countries: top_counts(countries, top_n),
        last_updated: aircraft.iter().map(|a| a.observed_at).max(),
    }
}
