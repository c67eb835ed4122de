use almanac_core::AlmanacConfig;
use almanac_schedule::{ParseOptions, ParsedSchedule, ScheduleExpression};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{debug, warn};

mod cli;
mod render;

use cli::{Cli, Command};
use render::{upcoming, DumpReport, TimeoutReport};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "almanac=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // load config: explicit path > ALMANAC_CONFIG env > ~/.almanac/almanac.toml
    let config = AlmanacConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let options = config
        .parse_options()
        .context("invalid [defaults] section")?;

    match cli.command {
        Command::Next {
            expression,
            after,
            count,
        } => {
            let expression = expression.into_expression();
            let schedule = parse(&expression, &options)?;
            let after = after.unwrap_or_else(Utc::now);
            let count = count.unwrap_or(config.defaults.preview);
            let report =
                TimeoutReport::new(None, &schedule, &upcoming(&schedule, after, count));
            print_report(&report, cli.json)?;
        }
        Command::Dump { expression } => {
            let expression = expression.into_expression();
            let schedule = parse(&expression, &options)?;
            if cli.json {
                let report = DumpReport {
                    expression: &expression,
                    decoded: schedule.to_string(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{schedule}");
            }
        }
        Command::List { after, count } => {
            let after = after.unwrap_or_else(Utc::now);
            let count = count.unwrap_or(config.defaults.preview);
            if config.schedules.is_empty() {
                warn!("no [[schedules]] configured");
            }

            let mut reports = Vec::with_capacity(config.schedules.len());
            for named in &config.schedules {
                let schedule = named.parse(&options)?;
                debug!(name = %named.name, "previewing schedule");
                reports.push(TimeoutReport::new(
                    Some(named.name.clone()),
                    &schedule,
                    &upcoming(&schedule, after, count),
                ));
            }

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    print!("{}", report.to_text());
                }
            }
        }
    }

    Ok(())
}

fn parse(expression: &ScheduleExpression, options: &ParseOptions) -> Result<ParsedSchedule> {
    expression
        .parse_with(options)
        .context("invalid schedule expression")
}

fn print_report(report: &TimeoutReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}
