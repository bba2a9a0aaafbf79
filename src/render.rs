//! Terminal rendering for the dashboard pages.
//!
//! Pure presentation: every function takes already-fetched state and prints
//! plain text tables. Nothing here touches the network or the cache.

use chrono::NaiveDate;

use agroclim::api::ListPage;
use agroclim::models::{Alert, Farmer, HistoricalRecord, Location};
use agroclim::view::{HistoricalView, ViewMode};
use agroclim::{AgroClimConfig, aggregate};

pub fn print_banner(config: &AgroClimConfig) {
    println!("AgroClim - climate dashboard for agricultural extension work");
    println!();
    println!("Backend: {}", config.backend.base_url);
    println!();
    println!("Commands:");
    println!("  historical --location <id> [--start/--end YYYY-MM-DD] [--view monthly|seasonal|annual] [--export FILE] [--no-fallback]");
    println!("  overview");
    println!("  locations [--admin]");
    println!("  alerts [list] [--export FILE]");
    println!("  alerts send --title T --message M [--priority low|medium|high] [--location <id>]");
    println!("  alerts delete --id <id>");
    println!("  farmers [list] [--export FILE]");
    println!("  farmers register --name N --phone P [--location NAME] [--crop C]");
    println!("  broadcast --body TEXT [--to id,id,...] [--location <id>]");
    println!();
    println!("Run 'agroclim --help' for flags, or see config.toml for settings.");
}

pub fn print_help() {
    print_banner(&AgroClimConfig::default());
    println!();
    println!("Global flags:");
    println!("  --config PATH   Use an explicit config file");
    println!("  --verbose, -v   Print config sources and debug logs");
    println!("  --help, -h      Show this help");
}

pub fn print_locations(locations: &[Location]) {
    if locations.is_empty() {
        println!("No locations configured on the backend.");
        return;
    }
    println!("{} location(s):", locations.len());
    for location in locations {
        let coords = location
            .format_coordinates()
            .map(|c| format!("  [{c}]"))
            .unwrap_or_default();
        println!(
            "  {:<6} {}{}",
            location.id.as_deref().unwrap_or("-"),
            location.label(),
            coords
        );
    }
}

pub fn print_alerts(page: &ListPage<Alert>) {
    if page.records.is_empty() {
        println!("No active alerts.");
        return;
    }
    println!(
        "{} alert(s) (page {} of {}):",
        page.pagination.total, page.pagination.page, page.pagination.total_pages
    );
    for alert in &page.records {
        println!(
            "  [{:<6}] {:<8} {}",
            alert.id.as_deref().unwrap_or("-"),
            alert.priority,
            alert.title
        );
        if !alert.message.is_empty() {
            println!("           {}", alert.message);
        }
    }
}

pub fn print_farmers(page: &ListPage<Farmer>) {
    if page.records.is_empty() {
        println!("No farmers registered.");
        return;
    }
    println!(
        "{} farmer(s) (page {} of {}):",
        page.pagination.total, page.pagination.page, page.pagination.total_pages
    );
    println!(
        "  {:<6} {:<24} {:<16} {:<16} {}",
        "id", "name", "phone", "location", "crop"
    );
    for farmer in &page.records {
        println!(
            "  {:<6} {:<24} {:<16} {:<16} {}",
            farmer.id.as_deref().unwrap_or("-"),
            farmer.name,
            farmer.phone_display(),
            farmer.location.as_deref().unwrap_or("-"),
            farmer.crop.as_deref().unwrap_or("-"),
        );
    }
}

pub fn print_historical(view: &HistoricalView, location: &str, start: NaiveDate, end: NaiveDate) {
    println!(
        "Historical weather for {location}, {start} to {end} ({} view)",
        view.mode
    );
    if view.is_sample() {
        println!("** Showing sample data - the backend could not be reached **");
    }
    if view.records.is_empty() {
        println!("No records in this range.");
        return;
    }
    println!("{} daily record(s)", view.records.len());
    println!();

    match view.mode {
        ViewMode::Monthly => print_monthly(&view.monthly()),
        ViewMode::Seasonal => print_seasonal(&view.seasonal()),
        ViewMode::Annual => print_annual(&view.annual()),
    }
}

fn print_monthly(buckets: &[aggregate::MonthlyBucket]) {
    println!(
        "  {:<6} {:>8} {:>8} {:>8} {:>10}",
        "month", "min C", "max C", "avg C", "rain mm"
    );
    for b in buckets {
        println!(
            "  {:<6} {:>8.1} {:>8.1} {:>8.1} {:>10.1}",
            b.month, b.temp_min, b.temp_max, b.temp_avg, b.rainfall
        );
    }
}

fn print_seasonal(buckets: &[aggregate::SeasonBucket; 3]) {
    println!(
        "  {:<10} {:>8} {:>10} {:>6}",
        "season", "avg C", "rain mm", "days"
    );
    for b in buckets {
        println!(
            "  {:<10} {:>8.1} {:>10.1} {:>6}",
            b.name, b.temperature, b.rainfall, b.days
        );
    }
}

fn print_annual(buckets: &[aggregate::AnnualBucket]) {
    println!(
        "  {:<6} {:>8} {:>8} {:>8} {:>10}",
        "year", "min C", "max C", "avg C", "rain mm"
    );
    for b in buckets {
        println!(
            "  {:<6} {:>8.1} {:>8.1} {:>8.1} {:>10.1}",
            b.year, b.temp_min, b.temp_max, b.temp_avg, b.rainfall
        );
    }
}

/// One line per location with its 30-day rainfall and average temperature,
/// or the fetch error when that location's history could not be loaded.
pub fn print_overview(
    locations: &[Location],
    results: &[anyhow::Result<Vec<HistoricalRecord>>],
    start: NaiveDate,
    end: NaiveDate,
) {
    println!("Overview, {start} to {end}");
    println!(
        "  {:<24} {:>8} {:>10} {:>6}",
        "location", "avg C", "rain mm", "days"
    );
    for (location, result) in locations.iter().zip(results) {
        match result {
            Ok(records) => {
                let seasons = aggregate::aggregate_by_season(records);
                let days: usize = seasons.iter().map(|s| s.days).sum();
                let rainfall: f64 = seasons.iter().map(|s| s.rainfall).sum();
                let temperature = if days > 0 {
                    seasons
                        .iter()
                        .map(|s| s.temperature * s.days as f64)
                        .sum::<f64>()
                        / days as f64
                } else {
                    0.0
                };
                println!(
                    "  {:<24} {:>8.1} {:>10.1} {:>6}",
                    location.label(),
                    temperature,
                    rainfall,
                    days
                );
            }
            Err(e) => {
                println!("  {:<24} unavailable: {e:#}", location.label());
            }
        }
    }
}
