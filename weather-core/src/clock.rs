use chrono::{DateTime, Local, TimeZone};

/// "Monday, October 19, 2026 at 06:40 PM"
pub const DISPLAY_FORMAT: &str = "%A, %B %-d, %Y at %I:%M %p";

/// Source of wall-clock time for the date/time display.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

pub fn format_display<Tz: TimeZone>(when: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    when.format(DISPLAY_FORMAT).to_string()
}
