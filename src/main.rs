use anyhow::{Context, Result};
use catalog_search::config::Config;
use catalog_search::data::CatalogDb;
use catalog_search::logging;
use catalog_search::ui::{app, grid};
use std::fs;

fn print_help() {
    println!("catalog-search - search a document catalog database");
    println!();
    println!("Usage: catalog-search [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -d, --db <PATH>       Catalog database file to load on startup");
    println!("  -p, --print <SQL>     Run one command against --db and print the result");
    println!("  -h, --help            Show this help");
    println!("  -V, --version         Show version");
    println!();
    println!("Without --print an interactive terminal UI is started.");
}

fn load_db(path: &str) -> Result<CatalogDb> {
    let bytes = fs::read(path).with_context(|| format!("reading database file {}", path))?;
    CatalogDb::from_bytes(&bytes, 0)
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let mut db_path: Option<String> = None;
    let mut print_command: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--version" | "-V" => {
                println!("catalog-search {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--db" | "-d" => {
                i += 1;
                db_path = Some(args.get(i).context("--db requires a path")?.clone());
            }
            "--print" | "-p" => {
                i += 1;
                print_command =
                    Some(args.get(i).context("--print requires a SQL command")?.clone());
            }
            other => anyhow::bail!("unknown argument: {} (try --help)", other),
        }
        i += 1;
    }

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: could not load config: {}", e);
        Config::default()
    });

    // One-shot mode: load, run, print, exit
    if let Some(command) = print_command {
        let path = db_path.context("--print requires --db <path>")?;
        let db = load_db(&path)?;
        let (result, warning) = db.run_command(&command)?;
        if let Some(warning) = warning {
            eprintln!("{}", warning);
        }
        grid::print_result(&result);
        return Ok(());
    }

    logging::init_tracing();
    tracing::info!(target: "app", "catalog-search v{} starting", env!("CARGO_PKG_VERSION"));

    let db = match db_path {
        Some(path) => Some(load_db(&path)?),
        None => None,
    };

    app::run_app(config, db)
}
