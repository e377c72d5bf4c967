//! The interactive dashboards.
//!
//! A session logs in against the credential file, then loops over a menu
//! for the account's role. Everything happens in memory on top of the seed
//! fixture and is discarded on exit.

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::{NaiveDate, NaiveTime};
use dialoguer::{Confirm, Input, Password, Select};
use roombook::{
    BookingResult, CredentialStore, Session, SlotRequest,
    domain::{
        AdminSession, Authenticator, Booking, Catalog, Identity, PendingRequest, Room,
        UserSession, slot::TIME_FORMAT,
    },
};
use tracing::instrument;

use super::{
    Sources,
    account::CREDENTIALS_PATH,
    parse_date, parse_time,
    terminal::{Colorize, availability_badge, status_badge},
};

/// Failed logins allowed before giving up.
const MAX_LOGIN_ATTEMPTS: usize = 3;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Credential file
    #[arg(long, value_name = "PATH", default_value = CREDENTIALS_PATH)]
    credentials: PathBuf,

    /// The day treated as today (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    today: Option<NaiveDate>,
}

impl Command {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, sources: &Sources) -> anyhow::Result<()> {
        let store = CredentialStore::load(&self.credentials).with_context(|| {
            format!(
                "cannot open {} (create an account with 'roombook account add')",
                self.credentials.display()
            )
        })?;
        if store.accounts().next().is_none() {
            anyhow::bail!(
                "No accounts in {}. Create one with 'roombook account add'.",
                self.credentials.display()
            );
        }

        let mut workflow = sources.workflow()?;
        let identity = login(&store, prompt_credentials)?;
        let today = self
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());

        println!();
        println!(
            "Welcome, {} ({})",
            identity.username.as_str().info(),
            identity.role
        );

        match Session::open(&mut workflow, identity) {
            Session::User(session) => UserDashboard { session, today }.run()?,
            Session::Admin(session) => AdminDashboard { session, today }.run()?,
        }

        println!("{}", "Logged out. Changes from this session were discarded.".dim());
        Ok(())
    }
}

/// Asks for credentials until `authenticator` accepts them.
fn login<A, F>(authenticator: &A, mut prompt: F) -> anyhow::Result<Identity>
where
    A: Authenticator,
    F: FnMut() -> anyhow::Result<(String, String)>,
{
    for attempt in 1..=MAX_LOGIN_ATTEMPTS {
        let (username, password) = prompt()?;
        match authenticator.authenticate(username.trim(), &password) {
            Ok(identity) => return Ok(identity),
            Err(e) => {
                let left = MAX_LOGIN_ATTEMPTS - attempt;
                println!("{} ({left} attempt(s) left)", e.to_string().error());
            }
        }
    }
    anyhow::bail!("too many failed login attempts")
}

fn prompt_credentials() -> anyhow::Result<(String, String)> {
    let username: String = Input::new().with_prompt("Username").interact_text()?;
    let password = Password::new().with_prompt("Password").interact()?;
    Ok((username, password))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserAction {
    BrowseRooms,
    BookRoom,
    MyBookings,
    MyRequests,
    CancelBooking,
    LogOut,
}

impl UserAction {
    const ALL: [Self; 6] = [
        Self::BrowseRooms,
        Self::BookRoom,
        Self::MyBookings,
        Self::MyRequests,
        Self::CancelBooking,
        Self::LogOut,
    ];

    const fn label(self) -> &'static str {
        match self {
            Self::BrowseRooms => "Browse rooms",
            Self::BookRoom => "Book a room",
            Self::MyBookings => "My bookings",
            Self::MyRequests => "My pending requests",
            Self::CancelBooking => "Cancel a booking",
            Self::LogOut => "Log out",
        }
    }
}

struct UserDashboard<'w> {
    session: UserSession<'w>,
    today: NaiveDate,
}

impl UserDashboard<'_> {
    fn run(mut self) -> anyhow::Result<()> {
        loop {
            println!();
            let action = choose("What would you like to do?", &UserAction::ALL, |a| {
                a.label().to_string()
            })?;
            match action {
                Some(UserAction::BrowseRooms) => self.browse_rooms()?,
                Some(UserAction::BookRoom) => self.book_room()?,
                Some(UserAction::MyBookings) => self.my_bookings(),
                Some(UserAction::MyRequests) => self.my_requests(),
                Some(UserAction::CancelBooking) => self.cancel_booking()?,
                Some(UserAction::LogOut) | None => return Ok(()),
            }
        }
    }

    fn browse_rooms(&self) -> anyhow::Result<()> {
        let term: String = Input::new()
            .with_prompt("Search (name or location, blank for all)")
            .allow_empty(true)
            .interact_text()?;

        let catalog = self.session.catalog();
        let rooms: Vec<&Room> = catalog.search(&term).collect();
        if rooms.is_empty() {
            println!("{}", "No rooms match.".dim());
        }
        for room in rooms {
            println!("{}", room_line(room));
            if !room.equipment.is_empty() {
                println!("    {}", room.equipment.join(", ").dim());
            }
        }
        Ok(())
    }

    fn book_room(&mut self) -> anyhow::Result<()> {
        let rooms: Vec<&Room> = self.session.catalog().iter().collect();
        let Some(room) = choose("Room", &rooms, |room| room_line(room))? else {
            return Ok(());
        };
        let request = SlotRequest::new(
            room.id.as_str(),
            prompt_date("Date", self.today)?,
            prompt_time("Start time", "09:00")?,
            prompt_time("End time", "10:00")?,
        );

        let slot = match self.session.validate(&request) {
            Ok(slot) => slot,
            Err(e) => {
                println!("{}", e.to_string().error());
                return Ok(());
            }
        };
        println!(
            "{} {} {}: {}",
            room.name,
            slot.date,
            slot.span,
            availability_badge(self.session.check_availability(&slot))
        );

        match self.session.request_booking(&request)? {
            BookingResult::Confirmed(booking) => {
                println!("{} booking {}", "Confirmed".success(), booking.id);
            }
            BookingResult::NeedsApproval(_) => {
                println!(
                    "{}",
                    "This slot needs administrator approval.".warning()
                );
                let escalate = Confirm::new()
                    .with_prompt("Submit a request for approval?")
                    .default(true)
                    .interact()?;
                if escalate {
                    let description: String = Input::new()
                        .with_prompt("Purpose of the meeting")
                        .allow_empty(true)
                        .interact_text()?;
                    let pending = self
                        .session
                        .submit_approval_request(&request, description)?;
                    println!("{} request {}", "Submitted".info(), pending.id);
                }
            }
        }
        Ok(())
    }

    fn my_bookings(&self) {
        let bookings = self.session.bookings();
        if bookings.is_empty() {
            println!("{}", "You have no bookings.".dim());
        }
        for booking in bookings {
            println!("{}", booking_line(self.session.catalog(), booking));
        }
    }

    fn my_requests(&self) {
        let mut requests = self.session.pending_requests().peekable();
        if requests.peek().is_none() {
            println!("{}", "You have no pending requests.".dim());
        }
        for request in requests {
            println!("{}", request_line(self.session.catalog(), request));
        }
    }

    fn cancel_booking(&mut self) -> anyhow::Result<()> {
        let active: Vec<Booking> = self
            .session
            .bookings()
            .into_iter()
            .filter(|b| b.is_active())
            .cloned()
            .collect();
        if active.is_empty() {
            println!("{}", "You have no active bookings.".dim());
            return Ok(());
        }

        let catalog = self.session.catalog();
        let Some(booking) = choose("Cancel which booking?", &active, |b| booking_line(catalog, b))?
        else {
            return Ok(());
        };
        match self.session.cancel_booking(&booking.id) {
            Ok(_) => println!("{} booking {}", "Cancelled".success(), booking.id),
            Err(e) => println!("{}", e.to_string().error()),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdminAction {
    Dashboard,
    ReviewRequests,
    AllBookings,
    CancelBooking,
    LogOut,
}

impl AdminAction {
    const ALL: [Self; 5] = [
        Self::Dashboard,
        Self::ReviewRequests,
        Self::AllBookings,
        Self::CancelBooking,
        Self::LogOut,
    ];

    const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::ReviewRequests => "Review pending requests",
            Self::AllBookings => "All bookings",
            Self::CancelBooking => "Cancel a booking",
            Self::LogOut => "Log out",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Approve,
    Decline,
    Back,
}

impl Decision {
    const ALL: [Self; 3] = [Self::Approve, Self::Decline, Self::Back];

    const fn label(self) -> &'static str {
        match self {
            Self::Approve => "Approve",
            Self::Decline => "Decline",
            Self::Back => "Back",
        }
    }
}

struct AdminDashboard<'w> {
    session: AdminSession<'w>,
    today: NaiveDate,
}

impl AdminDashboard<'_> {
    fn run(mut self) -> anyhow::Result<()> {
        loop {
            println!();
            let action = choose("What would you like to do?", &AdminAction::ALL, |a| {
                a.label().to_string()
            })?;
            match action {
                Some(AdminAction::Dashboard) => self.dashboard(),
                Some(AdminAction::ReviewRequests) => self.review_requests()?,
                Some(AdminAction::AllBookings) => self.all_bookings(),
                Some(AdminAction::CancelBooking) => self.cancel_booking()?,
                Some(AdminAction::LogOut) | None => return Ok(()),
            }
        }
    }

    fn dashboard(&self) {
        let stats = self.session.stats(self.today);
        println!("Rooms:             {}", stats.rooms);
        println!("Total bookings:    {}", stats.total_bookings);
        println!("Meetings today:    {}", stats.meetings_on_date);
        println!("Active users:      {}", stats.active_users);
        let pending = stats.pending_requests.to_string();
        if stats.pending_requests == 0 {
            println!("Pending requests:  {}", pending.success());
        } else {
            println!("Pending requests:  {}", pending.warning());
        }
    }

    fn review_requests(&mut self) -> anyhow::Result<()> {
        let requests: Vec<PendingRequest> = self.session.pending_requests().cloned().collect();
        if requests.is_empty() {
            println!("{}", "No requests awaiting a decision.".success());
            return Ok(());
        }

        let catalog = self.session.catalog();
        let Some(request) = choose("Which request?", &requests, |r| request_line(catalog, r))?
        else {
            return Ok(());
        };
        if !request.description.is_empty() {
            println!("  {}", request.description.dim());
        }

        match choose("Decision", &Decision::ALL, |d| d.label().to_string())? {
            Some(Decision::Approve) => {
                let approval = self.session.approve_request(&request.id)?;
                match approval.booking {
                    Some(booking) => println!(
                        "{} request {}, created booking {}",
                        "Approved".success(),
                        approval.request.id,
                        booking.id
                    ),
                    None => println!("{} request {}", "Approved".success(), approval.request.id),
                }
            }
            Some(Decision::Decline) => {
                let declined = self.session.decline_request(&request.id)?;
                println!("{} request {}", "Declined".warning(), declined.id);
            }
            Some(Decision::Back) | None => {}
        }
        Ok(())
    }

    fn all_bookings(&self) {
        let catalog = self.session.catalog();
        let mut bookings = self.session.bookings().peekable();
        if bookings.peek().is_none() {
            println!("{}", "No bookings.".dim());
        }
        for booking in bookings {
            println!("{}", booking_line(catalog, booking));
        }
    }

    fn cancel_booking(&mut self) -> anyhow::Result<()> {
        let active: Vec<Booking> = self
            .session
            .bookings()
            .filter(|b| b.is_active())
            .cloned()
            .collect();
        if active.is_empty() {
            println!("{}", "No active bookings.".dim());
            return Ok(());
        }

        let catalog = self.session.catalog();
        let Some(booking) = choose("Cancel which booking?", &active, |b| booking_line(catalog, b))?
        else {
            return Ok(());
        };
        let outcome = self.session.cancel_booking(&booking.id)?;
        if outcome.already_cancelled {
            println!("{}", format!("Booking {} was already cancelled", booking.id).dim());
        } else {
            println!("{} booking {}", "Cancelled".success(), booking.id);
        }
        Ok(())
    }
}

/// Shows a menu and returns the chosen item, or `None` if the user escapes.
fn choose<'a, T>(
    prompt: &str,
    items: &'a [T],
    label: impl Fn(&T) -> String,
) -> anyhow::Result<Option<&'a T>> {
    let labels: Vec<String> = items.iter().map(label).collect();
    let index = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(index.and_then(|i| items.get(i)))
}

fn prompt_date(prompt: &str, default: NaiveDate) -> anyhow::Result<NaiveDate> {
    let text: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .validate_with(|s: &String| parse_date(s).map(|_| ()))
        .interact_text()?;
    parse_date(&text).map_err(anyhow::Error::msg)
}

fn prompt_time(prompt: &str, default: &str) -> anyhow::Result<NaiveTime> {
    let text: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .validate_with(|s: &String| parse_time(s).map(|_| ()))
        .interact_text()?;
    parse_time(&text).map_err(anyhow::Error::msg)
}

fn room_name(catalog: &Catalog, booking_room: &roombook::domain::RoomId) -> String {
    catalog
        .get(booking_room)
        .map_or_else(|| booking_room.to_string(), |room| room.name.clone())
}

fn room_line(room: &Room) -> String {
    format!(
        "{:<20} {:<22} {:>2} seats",
        room.name, room.location, room.capacity
    )
}

fn booking_line(catalog: &Catalog, booking: &Booking) -> String {
    format!(
        "#{:<3} {:<20} {} {}-{}  {:<10} {}",
        booking.id.as_str(),
        room_name(catalog, &booking.slot.room),
        booking.slot.date,
        booking.slot.span.start().format(TIME_FORMAT),
        booking.slot.span.end().format(TIME_FORMAT),
        booking.owner.as_str(),
        status_badge(booking.status)
    )
}

fn request_line(catalog: &Catalog, request: &PendingRequest) -> String {
    format!(
        "#{:<3} {:<20} {} {}  {}",
        request.id.as_str(),
        room_name(catalog, &request.slot.room),
        request.slot.date,
        request.slot.span,
        request.requester.as_str()
    )
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use roombook::{Config, Fixture, Role, Username, domain::BookingId};

    use super::*;

    fn store() -> CredentialStore {
        let mut store = CredentialStore::default();
        store
            .add_account(Username::new("admin").unwrap(), Role::Admin, "admin-pass")
            .unwrap();
        store
    }

    #[test]
    fn login_retries_until_credentials_match() {
        let attempts = RefCell::new(vec![
            ("admin".to_string(), "admin-pass".to_string()),
            ("admin".to_string(), "wrong".to_string()),
        ]);

        let identity = login(&store(), || Ok(attempts.borrow_mut().pop().unwrap())).unwrap();
        assert_eq!(identity.role, Role::Admin);
        assert!(attempts.borrow().is_empty());
    }

    #[test]
    fn login_gives_up_after_three_failures() {
        let mut calls = 0;
        let result = login(&store(), || {
            calls += 1;
            Ok(("admin".to_string(), "nope".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(calls, MAX_LOGIN_ATTEMPTS);
    }

    #[test]
    fn lines_name_the_room_and_slot() {
        let workflow = Fixture::demo().into_workflow(&Config::default()).unwrap();

        let booking = workflow.booking(&BookingId::new("2").unwrap()).unwrap();
        let line = booking_line(workflow.catalog(), booking);
        assert!(line.starts_with("#2"));
        assert!(line.contains("Innovation Hub"));
        assert!(line.contains("2024-06-08 14:00-15:00"));
        assert!(line.contains("john.doe"));

        let request = workflow.pending_requests().next().unwrap();
        let line = request_line(workflow.catalog(), request);
        assert!(line.contains("Executive Boardroom"));
        assert!(line.contains("14:00-16:00"));
        assert!(line.contains("jane.smith"));
    }

    #[test]
    fn menus_list_every_action_once() {
        let labels: std::collections::BTreeSet<_> =
            UserAction::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels.len(), UserAction::ALL.len());
        assert_eq!(UserAction::ALL.last(), Some(&UserAction::LogOut));
        assert_eq!(AdminAction::ALL.last(), Some(&AdminAction::LogOut));
    }
}
