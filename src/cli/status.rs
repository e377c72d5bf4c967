use chrono::NaiveDate;
use clap::Parser;
use roombook::{BookingStatus, domain::WorkflowStats};
use tracing::instrument;

use super::{
    Sources, parse_date,
    terminal::{Colorize, is_narrow, status_badge},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show room, booking and request counts")]
pub struct Command {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Reference day for the meetings count (YYYY-MM-DD, default today)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Command {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, sources: &Sources) -> anyhow::Result<()> {
        let workflow = sources.workflow()?;
        let date = self
            .date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let stats = workflow.stats(date);

        match self.output {
            OutputFormat::Json => Self::output_json(&stats, date)?,
            OutputFormat::Table if self.quiet => Self::output_quiet(&stats),
            OutputFormat::Table => Self::output_table(&stats, date),
        }

        Ok(())
    }

    fn output_json(stats: &WorkflowStats, date: NaiveDate) -> anyhow::Result<()> {
        use serde_json::json;

        let by_status: serde_json::Map<_, _> = BookingStatus::ALL
            .iter()
            .map(|status| (status.to_string(), json!(count(stats, *status))))
            .collect();

        let output = json!({
            "rooms": stats.rooms,
            "bookings": {
                "total": stats.total_bookings,
                "by_status": by_status,
            },
            "pending_requests": stats.pending_requests,
            "active_users": stats.active_users,
            "meetings": {
                "date": date.to_string(),
                "count": stats.meetings_on_date,
            },
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_quiet(stats: &WorkflowStats) {
        println!(
            "rooms={} bookings={} pending={}",
            stats.rooms, stats.total_bookings, stats.pending_requests
        );
    }

    fn output_table(stats: &WorkflowStats, date: NaiveDate) {
        println!("Rooms: {}", stats.rooms);
        println!();

        println!("Bookings");
        println!("{}", "────────".dim());
        if is_narrow() {
            for status in BookingStatus::ALL {
                println!("{}: {}", status_badge(status), count(stats, status));
            }
        } else {
            println!("{:<12} Count", "Status");
            for status in BookingStatus::ALL {
                // Pad before coloring so escape codes do not skew the columns.
                let label = format!("{:<12}", status.as_str());
                let label = match status {
                    BookingStatus::Booked => label.success(),
                    BookingStatus::Pending => label.warning(),
                    BookingStatus::Cancelled => label.dim(),
                };
                println!("{label} {}", count(stats, status));
            }
        }
        println!("Total        {}", stats.total_bookings);
        println!();

        println!("Meetings on {date}: {}", stats.meetings_on_date);
        println!("Active users: {}", stats.active_users);
        println!();

        if stats.pending_requests == 0 {
            println!("Pending requests: {} ✅", "0".success());
        } else {
            println!(
                "Pending requests: {} ⏳",
                stats.pending_requests.to_string().warning()
            );
            println!("{}", "Run 'roombook session' as an admin to review them.".dim());
        }
    }
}

fn count(stats: &WorkflowStats, status: BookingStatus) -> usize {
    stats.by_status.get(&status).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_statuses_count_as_zero() {
        let stats = WorkflowStats::default();
        assert_eq!(count(&stats, BookingStatus::Pending), 0);
    }

    #[test]
    fn runs_against_the_demo_fixture() {
        let tmp = tempfile::tempdir().unwrap();
        let sources = Sources {
            fixture: None,
            config: tmp.path().join("config.toml"),
        };

        for output in [OutputFormat::Table, OutputFormat::Json] {
            let command = Command {
                output,
                date: Some("2024-06-07".parse().unwrap()),
                quiet: false,
            };
            command.run(&sources).unwrap();
        }
    }
}
