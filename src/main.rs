use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use chrono_tz::Africa::Kigali;
use tracing_subscriber::EnvFilter;

use agroclim::api::{BackendClient, HistoricalQuery};
use agroclim::models::{BroadcastMessage, NewAlert, NewFarmer};
use agroclim::view::{HistoricalEvent, HistoricalView, ViewMode, ViewStatus};
use agroclim::{AgroClimConfig, AgroClimError, cache, export};

mod args;
mod render;

use args::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::parse(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("Error: Invalid input: {message}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run(cli).await {
        let message = e
            .downcast_ref::<AgroClimError>()
            .map_or_else(|| format!("{e:#}"), AgroClimError::user_message);
        eprintln!("Error: {message}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone();
    let config = AgroClimConfig::load_from_path(config_path.clone())?;

    init_tracing(&config, cli.verbose);

    if cli.verbose {
        let source = config_path
            .or_else(AgroClimConfig::get_config_path)
            .unwrap_or_else(|| PathBuf::from("config.toml"));
        println!("Using config from: {}", source.display());
        println!("Backend: {}", config.backend.base_url);
        println!("Cache location: {}", config.cache.location);
        println!("Log level: {}", config.logging.level);
    }

    let Some(command) = cli.command else {
        render::print_banner(&config);
        return Ok(());
    };

    if matches!(command, Command::Help) {
        render::print_help();
        return Ok(());
    }

    // The dashboard works without its cache (first run on a read-only
    // filesystem, for instance) - it just refetches every time.
    if let Err(e) = cache::init(&config.cache) {
        tracing::warn!("Running without response cache: {}", e);
    }

    let client = BackendClient::new(&config)?;

    match command {
        // handled above, before any client setup
        Command::Help => Ok(()),
        Command::Historical {
            location,
            start,
            end,
            view,
            export: export_path,
            no_fallback,
        } => {
            historical(
                &config,
                &client,
                location,
                start,
                end,
                view,
                export_path,
                !no_fallback,
            )
            .await
        }
        Command::Overview => overview(&config, &client).await,
        Command::Locations { admin } => {
            let locations = if admin {
                client.admin_locations().await?
            } else {
                client.locations().await?
            };
            render::print_locations(&locations);
            Ok(())
        }
        Command::AlertsList { export: export_path } => {
            let page = client.alerts().await?;
            render::print_alerts(&page);
            if let Some(path) = export_path {
                let csv = export::to_csv(&export::ALERT_HEADERS, &export::alert_rows(&page.records))?;
                export::write_csv_file(&path, &csv)?;
                println!("Exported {} alerts to {}", page.records.len(), path.display());
            }
            Ok(())
        }
        Command::AlertsSend {
            title,
            message,
            priority,
            location,
        } => {
            let receipt = client
                .create_alert(&NewAlert {
                    title,
                    message,
                    priority,
                    location_id: location,
                })
                .await?;
            println!("{}", receipt.text());
            Ok(())
        }
        Command::AlertsDelete { id } => {
            let receipt = client.delete_alert(&id).await?;
            println!("{}", receipt.text());
            Ok(())
        }
        Command::FarmersList { export: export_path } => {
            let page = client.farmers(1, config.defaults.page_limit).await?;
            render::print_farmers(&page);
            if let Some(path) = export_path {
                let csv = export::to_csv(&export::FARMER_HEADERS, &export::farmer_rows(&page.records))?;
                export::write_csv_file(&path, &csv)?;
                println!("Exported {} farmers to {}", page.records.len(), path.display());
            }
            Ok(())
        }
        Command::FarmersRegister {
            name,
            phone,
            location,
            crop,
        } => {
            let receipt = client
                .register_farmer(&NewFarmer {
                    name,
                    phone,
                    location,
                    crop,
                })
                .await?;
            println!("{}", receipt.text());
            Ok(())
        }
        Command::Broadcast { body, to, location } => {
            let receipt = client
                .broadcast(&BroadcastMessage {
                    body,
                    recipient_ids: to,
                    location_id: location,
                })
                .await?;
            println!("{}", receipt.text());
            Ok(())
        }
    }
}

fn init_tracing(config: &AgroClimConfig, verbose: bool) {
    let level = if verbose { "debug" } else { &config.logging.level };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("agroclim={level}")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A second init (e.g. in tests) is harmless; ignore the error.
    if config.logging.format == "json" {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

/// Today in the reporting timezone. Extension workers file by Kigali days,
/// not UTC days.
fn today() -> NaiveDate {
    chrono::Utc::now().with_timezone(&Kigali).date_naive()
}

#[allow(clippy::too_many_arguments)]
async fn historical(
    config: &AgroClimConfig,
    client: &BackendClient,
    location: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    mode: ViewMode,
    export_path: Option<PathBuf>,
    allow_sample: bool,
) -> Result<()> {
    let location = location
        .or_else(|| config.defaults.location_id.clone())
        .filter(|l| !l.is_empty())
        .ok_or_else(|| {
            AgroClimError::validation(
                "No location given. Pass --location or set defaults.location_id in config.",
            )
        })?;

    let end = end.unwrap_or_else(today);
    let start = start.unwrap_or_else(|| {
        end - chrono::Duration::days(i64::from(config.defaults.history_days))
    });
    if start > end {
        return Err(
            AgroClimError::validation("Start date must not be after end date").into(),
        );
    }

    let query = HistoricalQuery::for_range(start, end, config.defaults.page_limit.max(366));

    let mut view = HistoricalView::default()
        .apply(HistoricalEvent::FetchStarted {
            location_id: location.clone(),
        })
        .apply(HistoricalEvent::ModeChanged(mode));

    view = match client.historical_weather(&location, &query).await {
        Ok(records) => view.apply(HistoricalEvent::FetchSucceeded(records)),
        Err(e) => view.apply(HistoricalEvent::FetchFailed {
            message: e.to_string(),
            use_sample: allow_sample,
        }),
    };

    if let ViewStatus::Failed(message) = &view.status {
        return Err(anyhow!(AgroClimError::api(message.clone())));
    }

    render::print_historical(&view, &location, start, end);

    if let Some(path) = export_path {
        let csv = export::to_csv(
            &export::HISTORICAL_HEADERS,
            &export::historical_rows(&view.records),
        )?;
        export::write_csv_file(&path, &csv)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!(
            "Exported {} records to {}",
            view.records.len(),
            path.display()
        );
    }

    Ok(())
}

/// Dashboard landing view: fetch every location, then this month's records
/// for each of them concurrently.
async fn overview(config: &AgroClimConfig, client: &BackendClient) -> Result<()> {
    let locations = client.locations().await?;
    if locations.is_empty() {
        println!("No locations configured on the backend.");
        return Ok(());
    }

    let end = today();
    let start = end - chrono::Duration::days(30);
    let query = HistoricalQuery::for_range(start, end, config.defaults.page_limit);

    let fetches = locations.iter().map(|location| {
        let id = location.id.clone().unwrap_or_default();
        let query = query.clone();
        async move { client.historical_weather(&id, &query).await }
    });
    let results = futures::future::join_all(fetches).await;

    render::print_overview(&locations, &results, start, end);
    Ok(())
}
