use std::process;

use chrono::{NaiveDate, NaiveTime};
use clap::Parser;
use roombook::{
    BookingWorkflow, SlotRequest,
    domain::{Availability, AvailabilityPolicy, Booking, Slot, slot::TIME_FORMAT},
};
use tracing::instrument;

use super::{
    Sources, parse_date, parse_time,
    terminal::{Colorize, availability_badge},
};

/// Exit status when the slot needs approval.
const EXIT_UNAVAILABLE: i32 = 2;

#[derive(Debug, Parser)]
#[command(about = "Check whether a slot can be booked without approval")]
pub struct Command {
    /// Room id or name
    room: String,

    /// Date (YYYY-MM-DD)
    #[arg(value_parser = parse_date)]
    date: NaiveDate,

    /// Start time (HH:MM)
    #[arg(value_parser = parse_time)]
    start: NaiveTime,

    /// End time (HH:MM)
    #[arg(value_parser = parse_time)]
    end: NaiveTime,
}

impl Command {
    #[instrument(level = "debug", skip_all, fields(room = %self.room, date = %self.date))]
    pub fn run(self, sources: &Sources) -> anyhow::Result<()> {
        let workflow = sources.workflow()?;
        let (slot, availability) = self.evaluate(&workflow)?;

        let room = workflow
            .catalog()
            .get(&slot.room)
            .map_or_else(|| slot.room.to_string(), |r| r.name.clone());
        println!(
            "{room}, {} {}: {}",
            slot.date,
            slot.span,
            availability_badge(availability)
        );

        if !availability.is_available() {
            match workflow.policy() {
                AvailabilityPolicy::Denylist(_) => {
                    println!("{}", denylist_note(&slot).dim());
                }
                AvailabilityPolicy::Overlap => {
                    println!("Conflicts with:");
                    for booking in conflicts(&workflow, &slot) {
                        println!("  - booking {} ({}) by {}", booking.id, booking.slot.span, booking.owner);
                    }
                }
            }
            process::exit(EXIT_UNAVAILABLE);
        }

        Ok(())
    }

    fn evaluate(&self, workflow: &BookingWorkflow) -> anyhow::Result<(Slot, Availability)> {
        let request = SlotRequest::new(self.room.clone(), self.date, self.start, self.end);
        let slot = workflow.validate(&request)?;
        let availability = workflow.check_availability(&slot);
        Ok((slot, availability))
    }
}

fn denylist_note(slot: &Slot) -> String {
    format!(
        "Meetings starting at {} require administrator approval.",
        slot.span.start().format(TIME_FORMAT)
    )
}

fn conflicts<'a>(workflow: &'a BookingWorkflow, slot: &'a Slot) -> impl Iterator<Item = &'a Booking> {
    workflow
        .bookings()
        .filter(move |booking| booking.is_active() && booking.slot.conflicts_with(slot))
}
