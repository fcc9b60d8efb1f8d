mod card;
mod catalog;
mod config;
mod cost;
mod error;
mod format;
mod logging;
mod models;
mod session;
mod share;
mod ui;

use catalog::Catalog;
use clap::{Args, Parser, Subcommand};
use config::{ensure_initialized, load_config};
use error::AppError;
use format::{break_even_message, plain_number, rupees};
use logging::{init_logging, LogTarget};
use models::{CostResult, LocalRates, VehicleCategory, VehicleProfile, KM_CHIPS};
use serde::Serialize;
use session::Session;
use share::{Delivery, ExportRequest, Exporter};
use std::path::PathBuf;
use ui::run::run_tui;

#[derive(Debug, Parser)]
#[command(name = "bharat-ev-cost")]
#[command(about = "EV vs petrol running cost calculator for India")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Init,
    Vehicles {
        #[arg(long, value_parser = parse_category)]
        category: Option<VehicleCategory>,
    },
    Cities,
    Calc {
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[arg(long)]
        json: bool,
    },
    Share {
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[arg(long)]
        logo: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        no_native_share: bool,
    },
    Tui,
}

#[derive(Debug, Args)]
struct ScenarioArgs {
    #[arg(long)]
    vehicle: String,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    tariff: Option<String>,
    #[arg(long)]
    petrol: Option<String>,
    #[arg(long, value_parser = parse_chip, conflicts_with = "custom_km")]
    km: Option<u32>,
    #[arg(long)]
    custom_km: Option<String>,
}

#[derive(Debug, Serialize)]
struct CalcOutput<'a> {
    vehicle: &'a str,
    city: &'a str,
    rates: LocalRates,
    daily_km: f64,
    result: CostResult,
}

fn parse_category(input: &str) -> Result<VehicleCategory, String> {
    match input.trim().to_ascii_lowercase().as_str() {
        "two-wheeler" | "scooter" => Ok(VehicleCategory::TwoWheeler),
        "car" => Ok(VehicleCategory::Car),
        _ => Err("Unsupported category. Use two-wheeler or car.".into()),
    }
}

fn parse_chip(input: &str) -> Result<u32, String> {
    let chips = KM_CHIPS
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    match input.trim().parse::<u32>() {
        Ok(km) if KM_CHIPS.contains(&km) => Ok(km),
        _ => Err(format!(
            "Unsupported distance chip. Use one of {chips}, or --custom-km."
        )),
    }
}

fn build_session(cfg: &config::AppConfig, scenario: &ScenarioArgs) -> Result<Session, AppError> {
    let catalog = Catalog::from_config(cfg)?;
    let city = scenario.city.as_deref().unwrap_or(&cfg.default_city);
    let mut session = Session::new(catalog, city)?;
    session.select_vehicle(&scenario.vehicle)?;
    if let Some(tariff) = &scenario.tariff {
        session.set_tariff(tariff);
    }
    if let Some(petrol) = &scenario.petrol {
        session.set_petrol(petrol);
    }
    if let Some(km) = scenario.km {
        session.select_km_chip(km);
    } else if let Some(custom) = &scenario.custom_km {
        session.set_custom_km(custom);
    }
    session.set_logo(cfg.logo_path.clone());
    Ok(session)
}

fn selected_vehicle<'a>(
    session: &'a Session,
    requested: &str,
) -> Result<&'a VehicleProfile, AppError> {
    session
        .vehicle()
        .ok_or_else(|| AppError::UnknownVehicle(requested.to_string()))
}

/// Sharing needs a result; without a distance there is nothing to draw.
fn required_result(session: &Session) -> Result<CostResult, AppError> {
    session.result()?.ok_or(AppError::MissingDistance)
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    if !matches!(cli.command, Commands::Tui) {
        init_logging(LogTarget::Stderr);
    }

    match cli.command {
        Commands::Init => {
            ensure_initialized()?;
            println!("Initialized bharat-ev-cost config and data directories.");
        }
        Commands::Vehicles { category } => {
            let catalog = Catalog::from_config(&load_config()?)?;
            println!("id,brand,name,category,kwh_per_100km,petrol_alt_kmpl,ev_premium");
            for v in catalog
                .vehicles()
                .iter()
                .filter(|v| category.map_or(true, |c| v.category == c))
            {
                println!(
                    "{},{},{},{},{},{},{}",
                    v.id,
                    v.brand,
                    v.name,
                    v.category.as_label(),
                    plain_number(v.kwh_per_100km),
                    plain_number(v.petrol_alt_kmpl),
                    plain_number(v.ev_premium),
                );
            }
        }
        Commands::Cities => {
            let catalog = Catalog::from_config(&load_config()?)?;
            println!("city,tariff,petrol,discom,updated");
            for c in catalog.cities() {
                println!(
                    "{},{},{},{},{}",
                    c.name,
                    plain_number(c.tariff),
                    plain_number(c.petrol),
                    c.discom.as_deref().unwrap_or(""),
                    c.updated.map(|d| d.to_string()).unwrap_or_default(),
                );
            }
        }
        Commands::Calc { scenario, json } => {
            let cfg = load_config()?;
            let session = build_session(&cfg, &scenario)?;
            let vehicle = selected_vehicle(&session, &scenario.vehicle)?;
            let Some(result) = session.result()? else {
                println!("Select a daily distance first.");
                return Ok(());
            };

            if json {
                let out = CalcOutput {
                    vehicle: &vehicle.id,
                    city: session.city(),
                    rates: session.rates(),
                    daily_km: session.daily_km(),
                    result,
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                let rates = session.rates();
                println!("{} · {}", vehicle.display_name(), session.city());
                println!(
                    "Daily: {} km · Tariff: ₹{}/kWh · Petrol: ₹{}/L",
                    plain_number(session.daily_km()),
                    plain_number(rates.tariff),
                    plain_number(rates.petrol)
                );
                println!("₹/day        ₹{}", rupees(result.daily_cost));
                println!("₹/month      ₹{}", rupees(result.monthly_cost));
                println!("₹/year       ₹{}", rupees(result.yearly_cost));
                println!("Petrol/day   ₹{}", rupees(result.daily_petrol_cost));
                println!("Savings/month ₹{}", rupees(result.monthly_savings));
                println!("{}", break_even_message(result.break_even));
            }
        }
        Commands::Share {
            scenario,
            logo,
            out,
            no_native_share,
        } => {
            let cfg = load_config()?;
            let mut session = build_session(&cfg, &scenario)?;
            if logo.is_some() {
                session.set_logo(logo);
            }
            let vehicle = selected_vehicle(&session, &scenario.vehicle)?;
            let result = required_result(&session)?;

            let exporter = Exporter::from_config(&cfg, out, !no_native_share)?;
            let report = exporter
                .export(&ExportRequest {
                    vehicle: vehicle.clone(),
                    city: session.city().to_string(),
                    rates: session.rates(),
                    daily_km: session.daily_km(),
                    result,
                    logo: session.logo().cloned(),
                })
                .await?;
            match report.delivery {
                Delivery::Shared { target } => {
                    println!("Shared {} via {target}.", report.file_name)
                }
                Delivery::SharedAndSaved { target, path } => println!(
                    "Copied {} via {target} and saved {}",
                    report.file_name,
                    path.display()
                ),
                Delivery::Downloaded { path } => println!("Saved {}", path.display()),
            }
        }
        Commands::Tui => {
            ensure_initialized()?;
            init_logging(LogTarget::File);
            run_tui().await?;
        }
    }

    Ok(())
}
