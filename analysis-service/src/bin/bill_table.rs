use analysis_service::{observability, validation::clamp_consumption};
use anyhow::{bail, Result};
use bill_core::calculate_bill;
use serde::Deserialize;
use std::{env, fs::File};

/// One household reading. Expected header: `household_id,bi_monthly_kwh`.
#[derive(Debug, Deserialize)]
struct Reading {
    household_id: String,
    bi_monthly_kwh: f64,
}

fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: bill_table <readings_csv_path>");
    }
    let path = &args[1];

    let mut reader = csv::Reader::from_reader(File::open(path)?);
    let (mut priced, mut skipped) = (0usize, 0usize);

    println!("{:<20} {:>12} {:>10} {:>10}  {}", "household", "kwh", "total", "monthly", "slab");
    for (line, row) in reader.deserialize::<Reading>().enumerate() {
        let reading = match row {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, line = line + 2, "skipping malformed row");
                skipped += 1;
                continue;
            }
        };

        let bill = match clamp_consumption(reading.bi_monthly_kwh)
            .map_err(anyhow::Error::from)
            .and_then(|kwh| calculate_bill(kwh).map_err(anyhow::Error::from))
        {
            Ok(bill) => bill,
            Err(e) => {
                tracing::warn!(error = %e, household = %reading.household_id, "skipping unpriceable reading");
                skipped += 1;
                continue;
            }
        };

        println!(
            "{:<20} {:>12.2} {:>10.0} {:>10.2}  {}",
            reading.household_id, reading.bi_monthly_kwh, bill.total, bill.monthly, bill.slab
        );
        priced += 1;
    }

    tracing::info!(priced, skipped, path = %path, "bill table complete");
    Ok(())
}
