mod aggregator;
mod archive;
mod cache;
mod cli;
mod error;
mod lister;
mod pattern;
mod prober;
mod report;
mod scheduler;
mod types;

use archive::UrlTemplate;
use clap::Parser;
use cli::Cli;
use colored::*;
use log::{error, info};
use scheduler::Scheduler;
use std::time::Instant;
use types::{ProbeRequest, RinexVersion};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    info!("Starting RINEX availability prober");

    let cli = Cli::parse();
    info!("CLI arguments parsed: parallelism={}", cli.parallelism);

    let Some(template) = cli.template() else {
        eprintln!("{}", "Either --archive or --base-url is required".red());
        anyhow::bail!("no archive template given");
    };

    let request = match build_request(&cli, &template) {
        Ok(request) => request,
        Err(e) => {
            error!("Invalid request: {}", e);
            eprintln!("{}", e.to_string().red());
            return Err(e.into());
        }
    };

    let lister = lister::build_lister(request.template.protocol())?;
    let scheduler = Scheduler::new(lister);
    let started = Instant::now();

    let records = match scheduler.run(&request).await {
        Ok(records) => records,
        Err(e) => {
            error!("Probe run failed: {}", e);
            eprintln!("{}", "Probe run failed".red());
            return Err(e.into());
        }
    };

    let summary = aggregator::summarize(&records, request.granularity);

    println!("\n{}", "Availability Summary:".bold());
    println!("Station: {}", request.station);
    println!(
        "Range: {} to {} ({} days)",
        request.start, request.end, summary.total_days
    );
    println!("Granularity: {}", request.granularity);
    println!(
        "Days with data: {} of {}",
        summary.days_with_data.to_string().green(),
        summary.total_days
    );
    println!(
        "Available units: {}/{}",
        summary.available_units, summary.possible_units
    );
    let percentage = format!("{:.2}%", summary.percentage);
    let percentage = if summary.percentage >= 95.0 {
        percentage.green()
    } else if summary.percentage > 0.0 {
        percentage.yellow()
    } else {
        percentage.red()
    };
    println!("Overall availability: {}", percentage);
    println!("Probe duration: {:.2?}", started.elapsed());

    let missing: Vec<_> = records
        .iter()
        .filter(|record| record.data.available() == 0)
        .collect();
    if !missing.is_empty() {
        println!("\n{}", "Days with no data:".red().bold());
        for record in &missing {
            println!("✗ {} {:03}", record.year, record.doy);
        }
    }

    match report::write_availability_csv(&records, &request, &cli.output_dir).await {
        Ok(path) => println!("\nReport written to {}", path.display()),
        Err(e) => error!("Failed to write availability CSV: {}", e),
    }

    Ok(())
}

fn build_request(cli: &Cli, template: &str) -> Result<ProbeRequest, error::ProberError> {
    ProbeRequest::new(
        &cli.station,
        cli.start,
        cli.end,
        cli.granularity,
        RinexVersion::from_number(cli.rinex_version)?,
        cli.parallelism,
        UrlTemplate::new(template)?,
    )
}
