//! Import a CSV file and save a fresh export next to it.
//!
//! ```text
//! cargo run --example bulk_import -- employees.csv
//! ```
//!
//! Rows are expected as `id,name,email,role,department,salary` after a header row.
//! The `id` column is ignored; the server assigns new ids.

#[macro_use]
extern crate tracing;

use anyhow::{Context, Result};
use ems_rs::{Client, Config, csv};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .context("usage: bulk_import <file.csv>")?;
    let upload = std::fs::read(&path).with_context(|| format!("reading {path}"))?;

    let config = Config::from_env()?;
    let client = Client::new(&config)?;

    let report = client.employees().import_csv(&upload).await?;
    info!(
        submitted = report.submitted,
        created = report.created,
        errors = report.errors,
        "import finished"
    );
    println!("{report}");

    let export = client.employees().export_csv().await?;
    csv::save_export(&export, &config.export_path).await?;
    println!("Exported employees to {}", config.export_path.display());

    let stats = client.employees().stats().await?;
    print!("{}", ems_rs::stats::render(&stats));

    Ok(())
}
