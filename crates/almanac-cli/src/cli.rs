use almanac_schedule::ScheduleExpression;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

/// Almanac: preview calendar schedule expressions.
#[derive(Debug, Parser)]
#[command(name = "almanac", version, about)]
pub struct Cli {
    /// Path to the config file (default: $ALMANAC_CONFIG or ~/.almanac/almanac.toml).
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the upcoming timeouts of an expression.
    Next {
        #[command(flatten)]
        expression: ExpressionArgs,
        /// Search from this instant (RFC 3339, default: now).
        #[arg(long)]
        after: Option<DateTime<Utc>>,
        /// How many timeouts to print (default: `defaults.preview`).
        #[arg(long)]
        count: Option<usize>,
    },
    /// Print the decoded form of an expression.
    Dump {
        #[command(flatten)]
        expression: ExpressionArgs,
    },
    /// Print the upcoming timeouts of every configured schedule.
    List {
        /// Search from this instant (RFC 3339, default: now).
        #[arg(long)]
        after: Option<DateTime<Utc>>,
        /// How many timeouts to print per schedule (default: `defaults.preview`).
        #[arg(long)]
        count: Option<usize>,
    },
}

/// Expression attributes; anything left out keeps its calendar default.
#[derive(Debug, Clone, Args)]
pub struct ExpressionArgs {
    #[arg(long, allow_hyphen_values = true)]
    pub second: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub minute: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub hour: Option<String>,
    /// e.g. `15`, `Last`, `-3`, `2nd Tue`, `1st Mon-Last`.
    #[arg(long, allow_hyphen_values = true)]
    pub day_of_month: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub month: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub day_of_week: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub year: Option<String>,
    /// IANA zone id or `GMT±HH:MM`.
    #[arg(long)]
    pub timezone: Option<String>,
    #[arg(long)]
    pub start: Option<DateTime<Utc>>,
    #[arg(long)]
    pub end: Option<DateTime<Utc>>,
}

impl ExpressionArgs {
    pub fn into_expression(self) -> ScheduleExpression {
        let defaults = ScheduleExpression::default();
        ScheduleExpression {
            second: self.second.or(defaults.second),
            minute: self.minute.or(defaults.minute),
            hour: self.hour.or(defaults.hour),
            day_of_month: self.day_of_month.or(defaults.day_of_month),
            month: self.month.or(defaults.month),
            day_of_week: self.day_of_week.or(defaults.day_of_week),
            year: self.year.or(defaults.year),
            timezone: self.timezone,
            start: self.start,
            end: self.end,
        }
    }
}
