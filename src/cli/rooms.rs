use anyhow::Context as _;
use clap::Parser;
use regex::Regex;
use roombook::domain::{Room, RoomFilter};
use tracing::instrument;

use super::{
    Sources,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, Parser, Default)]
#[command(about = "List the room catalog")]
pub struct Command {
    /// Case-insensitive substring of the room name or location
    #[arg(long, value_name = "TERM")]
    search: Option<String>,

    /// Regular expression matched against the room name or location
    #[arg(long, value_name = "PATTERN")]
    regex: Option<String>,

    /// Only rooms seating at least this many people
    #[arg(long, value_name = "SEATS")]
    min_capacity: Option<u32>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
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
        let pattern = if let Some(pattern) = &self.regex {
            Some(Regex::new(pattern).with_context(|| format!("invalid regex: {pattern}"))?)
        } else {
            None
        };
        let filter = RoomFilter {
            term: self.search,
            pattern,
            min_capacity: self.min_capacity,
        };

        let workflow = sources.workflow()?;
        let rooms: Vec<&Room> = workflow.catalog().filter(&filter).collect();

        match self.output {
            OutputFormat::Json => output_json(&rooms)?,
            OutputFormat::Table if rooms.is_empty() => {
                println!("{}", "No rooms match the given filters.".dim());
            }
            OutputFormat::Table => output_table(&rooms),
        }

        Ok(())
    }
}

fn output_json(rooms: &[&Room]) -> anyhow::Result<()> {
    use serde_json::json;

    let rooms: Vec<_> = rooms
        .iter()
        .map(|room| {
            json!({
                "id": room.id.as_str(),
                "name": room.name,
                "location": room.location,
                "capacity": room.capacity.get(),
                "equipment": room.equipment,
                "image": room.image,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&rooms)?);
    Ok(())
}

fn output_table(rooms: &[&Room]) {
    if is_narrow() {
        for room in rooms {
            println!("{} {}", room.id.as_str().dim(), room.name.info());
            println!("  {} · {} seats", room.location, room.capacity);
            if !room.equipment.is_empty() {
                println!("  {}", room.equipment.join(", ").dim());
            }
        }
        return;
    }

    let name_width = column_width(rooms.iter().map(|r| r.name.as_str()), "Name");
    let location_width = column_width(rooms.iter().map(|r| r.location.as_str()), "Location");

    println!(
        "{:<4} {:<name_width$} {:<location_width$} {:>5}  Equipment",
        "Id", "Name", "Location", "Seats"
    );
    for room in rooms {
        println!(
            "{:<4} {:<name_width$} {:<location_width$} {:>5}  {}",
            room.id.as_str(),
            room.name,
            room.location,
            room.capacity,
            room.equipment.join(", ").dim()
        );
    }
    println!();
    println!("{} room(s)", rooms.len());
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(&["Name"], "Name" => 4; "header only")]
    #[test_case(&["Executive Boardroom", "Hub"], "Name" => 19; "longest value")]
    fn column_width_covers_header_and_values(values: &[&str], header: &str) -> usize {
        column_width(values.iter().copied(), header)
    }

    #[test]
    fn invalid_regex_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let sources = Sources {
            fixture: None,
            config: tmp.path().join("config.toml"),
        };

        let command = Command::try_parse_from(["rooms", "--regex", "("]).unwrap();
        let err = command.run(&sources).unwrap_err();
        assert!(err.to_string().starts_with("invalid regex"));
    }

    #[test]
    fn lists_filtered_demo_rooms() {
        let tmp = tempfile::tempdir().unwrap();
        let sources = Sources {
            fixture: None,
            config: tmp.path().join("config.toml"),
        };

        let command =
            Command::try_parse_from(["rooms", "--min-capacity", "8", "--output", "json"]).unwrap();
        command.run(&sources).unwrap();
    }
}
