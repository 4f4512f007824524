// Entry point and high-level CLI flow.
//
// - Option [1] loads the residents CSV into the record store.
// - Option [2] browses residents page by page, sized to the terminal.
// - Option [3] runs the demographics report and exports it.
// `--report` skips the menu and prints the report once.
mod config;
mod demographics;
mod error;
mod layout;
mod loader;
mod output;
mod reports;
mod store;
mod types;
mod util;

use chrono::{Local, NaiveDate};
use clap::Parser;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use demographics::DemographicsEngine;
use error::AppError;
use store::{InMemoryStore, ResidentFilter, ResidentSource};
use types::ResidentStatus;

#[derive(Parser, Debug)]
#[command(name = "vault_census")]
#[command(about = "Census and demographics console for vault residents")]
struct Args {
    /// Residents CSV file (overrides the config file)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Projection horizon in years
    #[arg(short, long)]
    years: Option<u32>,

    /// Reference date for ages, YYYY-MM-DD (default: today)
    #[arg(long)]
    as_of: Option<String>,

    /// Table width in characters (default: terminal width)
    #[arg(short, long)]
    width: Option<usize>,

    /// Print the demographics report and exit
    #[arg(long)]
    report: bool,
}

// Loaded once, reused by every menu option for the rest of the run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        config: AppConfig::default(),
        as_of: Local::now().date_naive(),
        width: None,
        store: None,
    })
});

struct AppState {
    config: AppConfig,
    as_of: NaiveDate,
    width: Option<usize>,
    store: Option<InMemoryStore>,
}

fn app_state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Read a single line of input after the common "Enter choice:" prompt.
fn read_choice() -> String {
    prompt("Enter choice: ")
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match prompt("Back to Main Menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the residents CSV into the record store.
fn handle_load() {
    let (path, page_size) = {
        let state = app_state();
        (
            state.config.data.residents_path.clone(),
            state.config.paging.scan_page_size,
        )
    };
    let (residents, report) = match loader::load_residents(&path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
            return;
        }
    };
    let store = match InMemoryStore::new(residents, page_size) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to build record store: {}\n", e);
            return;
        }
    };

    println!(
        "Loading residents... ({} rows read, {} residents registered)",
        util::format_int(report.total_rows),
        util::format_int(report.loaded_rows)
    );
    if report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse/validation errors.",
            util::format_int(report.parse_errors)
        );
    }
    if report.missing_sex > 0 {
        println!(
            "Info: {} residents have no recorded sex and are left out of sex ratios.",
            util::format_int(report.missing_sex)
        );
    }
    println!();
    info!(residents = store.len(), "Record store ready");
    app_state().store = Some(store);
}

fn loaded_store() -> Option<InMemoryStore> {
    let store = app_state().store.clone();
    if store.is_none() {
        println!("Error: No residents loaded. Please load the residents file first (option 1).\n");
    }
    store
}

/// Handle option [2]: paginated resident listing with optional filters.
fn handle_list_residents() {
    let Some(store) = loaded_store() else {
        return;
    };
    let (as_of, width, list_page_size) = {
        let state = app_state();
        (state.as_of, state.width, state.config.paging.list_page_size)
    };
    // The listing shows fewer rows per screen than the scan page size.
    let store = match store.with_page_size(list_page_size) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}\n", e);
            return;
        }
    };

    let status_input = prompt("Status filter (active/deceased/exiled/on-mission/quarantined, blank for all): ");
    let status = if status_input.is_empty() {
        None
    } else {
        match status_input.parse::<ResidentStatus>() {
            Ok(s) => Some(s),
            Err(()) => {
                println!("Unknown status '{}', showing all residents.", status_input);
                None
            }
        }
    };
    let search = prompt("Search name or registry number (blank for none): ");
    let filter = ResidentFilter {
        status,
        search: if search.is_empty() { None } else { Some(search) },
    };

    let mut page = 0usize;
    loop {
        let width = width.unwrap_or_else(|| output::terminal_width(output::DEFAULT_TERMINAL_WIDTH));
        let result = match store.list_residents(&filter, page) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Query failed: {}\n", e);
                return;
            }
        };
        println!();
        output::print_resident_page(&result, as_of, width);
        match prompt("[n]ext  [p]revious  [q]uit: ").to_lowercase().as_str() {
            "n" if page + 1 < result.total_pages => page += 1,
            "n" => println!("Already on the last page."),
            "p" if page > 0 => page -= 1,
            "p" => println!("Already on the first page."),
            "q" => {
                println!();
                return;
            }
            _ => println!("Invalid choice. Please enter n, p or q."),
        }
    }
}

/// Handle option [3]: compute the demographics report, print previews and
/// export CSV/JSON files.
fn handle_generate_report() -> Result<(), AppError> {
    let Some(store) = loaded_store() else {
        return Ok(());
    };
    let config = app_state().config.clone();
    let as_of = app_state().as_of;

    println!("Generating demographics report (as of {})...", as_of);
    let engine = DemographicsEngine::new(&store, &config.demographics);
    let report = reports::build_report(&engine, as_of, config.projection.years)?;
    let out_dir = &config.data.output_dir;

    let summary = reports::generate_summary_rows(&report);
    let export = |name: &str, result: Result<(), Box<dyn std::error::Error>>| {
        if let Err(e) = result {
            eprintln!("Write error ({}): {}", name, e);
        }
    };
    let summary_file = out_dir.join("report_population_summary.csv");
    export("summary", output::write_csv(&summary_file, &summary));
    println!("\nPopulation Summary\n");
    output::preview_table_rows(&summary, summary.len());

    let ages = reports::generate_age_rows(&report.age);
    let age_file = out_dir.join("report_age_distribution.csv");
    export("age distribution", output::write_csv(&age_file, &ages));
    println!("Age Distribution\n");
    output::preview_table_rows(&ages, ages.len());

    let projection = reports::generate_projection_rows(&report);
    let projection_file = out_dir.join("report_projection.csv");
    export("projection", output::write_csv(&projection_file, &projection));
    println!("Population Projection ({} years)\n", config.projection.years);
    output::preview_table_rows(&projection, projection.len());

    println!("Concerns:");
    for c in &report.projection.viability.concerns {
        println!("  - {}", c);
    }
    println!("Recommendations:");
    for r in &report.projection.viability.recommendations {
        println!("  - {}", r);
    }
    println!();

    let json_file = out_dir.join("demographics.json");
    output::write_json(&json_file, &report).map_err(|e| AppError::Export(e.to_string()))?;
    println!("(Full report exported to {})\n", out_dir.display());
    info!(dir = %out_dir.display(), "Report exported");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn main() -> Result<(), AppError> {
    init_tracing();
    let args = Args::parse();

    let mut config = AppConfig::load_or_default(args.config.as_deref())?;
    if let Some(data) = args.data {
        config.data.residents_path = data;
    }
    if let Some(years) = args.years {
        config.projection.years = years;
    }
    let as_of = match args.as_of.as_deref() {
        Some(s) => util::parse_date_safe(Some(s)).ok_or_else(|| AppError::AsOf(s.to_string()))?,
        None => Local::now().date_naive(),
    };
    {
        let mut state = app_state();
        state.config = config;
        state.as_of = as_of;
        state.width = args.width;
    }

    if args.report {
        handle_load();
        if app_state().store.as_ref().map_or(true, InMemoryStore::is_empty) {
            warn!("No residents loaded, report skipped");
            return Ok(());
        }
        return handle_generate_report();
    }

    loop {
        println!("Vault Census");
        println!("[1] Load the residents file");
        println!("[2] List residents");
        println!("[3] Demographics report");
        println!("[4] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(),
            "2" => handle_list_residents(),
            "3" => {
                println!();
                if let Err(e) = handle_generate_report() {
                    eprintln!("Report failed: {}\n", e);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "4" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1, 2, 3 or 4.\n"),
        }
    }
    Ok(())
}
