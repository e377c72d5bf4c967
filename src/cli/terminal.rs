//! Terminal capability detection and styling helpers

use owo_colors::{OwoColorize, Style, colors::css};
use roombook::{BookingStatus, domain::Availability};

/// Whether stdout should receive ANSI colors.
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Terminal width in columns, if stdout is a terminal.
pub fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Whether the terminal is too narrow for tabular output (< 72 columns).
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < 72)
}

/// Extension trait for styling output.
///
/// Styles are dropped when the terminal has no color support.
pub trait Colorize {
    /// Green.
    fn success(&self) -> String;
    /// Amber.
    fn warning(&self) -> String;
    /// Red.
    fn error(&self) -> String;
    /// Blue.
    fn info(&self) -> String;
    /// Dimmed.
    fn dim(&self) -> String;
}

fn paint(text: &str, style: Style) -> String {
    if supports_color() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), Style::new().fg::<css::Green>())
    }

    fn warning(&self) -> String {
        paint(self.as_ref(), Style::new().fg::<css::Orange>())
    }

    fn error(&self) -> String {
        paint(self.as_ref(), Style::new().fg::<css::Red>())
    }

    fn info(&self) -> String {
        paint(self.as_ref(), Style::new().fg::<css::LightBlue>())
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), Style::new().dimmed())
    }
}

/// A booking status, colored by how it affects the room.
pub fn status_badge(status: BookingStatus) -> String {
    match status {
        BookingStatus::Booked => status.as_str().success(),
        BookingStatus::Pending => status.as_str().warning(),
        BookingStatus::Cancelled => status.as_str().dim(),
    }
}

/// An availability verdict, colored.
pub fn availability_badge(availability: Availability) -> String {
    match availability {
        Availability::Available => "available".success(),
        Availability::Unavailable => "needs approval".warning(),
    }
}
