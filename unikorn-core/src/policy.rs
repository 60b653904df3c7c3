//! Auto-upgrade policy: when a resource is willing to be upgraded.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// An hour-of-day range `[start_hour, end_hour)`, in `0..24`.
///
/// `end_hour <= start_hour` means the window wraps past midnight; if they
/// are equal it spans the full day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl HourWindow {
    pub fn new(start_hour: u8, end_hour: u8) -> Self {
        Self { start_hour, end_hour }
    }

    /// Length of the window in hours, accounting for midnight wraparound.
    pub fn length_hours(&self) -> u8 {
        let mut length = self.end_hour as i16 - self.start_hour as i16;
        if length <= 0 {
            length += 24;
        }
        length as u8
    }
}

/// A resource's opt-in schedule for automatic bundle upgrades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoUpgradePolicy {
    /// Built-in office-hours spec: Monday through Friday, 00:00-07:00 UTC.
    /// The evaluator picks a pseudo-random weekday and hour within it.
    Auto,
    /// Explicit per-weekday windows; at most one window per weekday.
    WeekDay(BTreeMap<WeekdayKey, HourWindow>),
}

/// `chrono::Weekday` doesn't implement `Ord`/`Serialize` the way we need for
/// a stable, serializable map key, so we wrap it in a small newtype ordered
/// Sunday..Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeekdayKey(pub(crate) u8);

impl WeekdayKey {
    pub fn from_weekday(day: Weekday) -> Self {
        // num_days_from_sunday: Sun=0 .. Sat=6.
        Self(day.num_days_from_sunday() as u8)
    }

    pub fn to_weekday(self) -> Weekday {
        // `Weekday::try_from(u8)` uses num_days_from_monday (Mon=0..Sun=6),
        // one behind our Sun=0..Sat=6 numbering, so shift back by one mod 7.
        Weekday::try_from(((self.0 + 6) % 7) as u8).expect("0..7 maps to a valid weekday")
    }
}

/// The office-hours spec substituted whenever `AutoUpgradePolicy::Auto` (or
/// a forced upgrade applies: Mon-Fri, 00:00-07:00 UTC.
pub fn office_hours_spec() -> BTreeMap<WeekdayKey, HourWindow> {
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]
    .into_iter()
    .map(|d| (WeekdayKey::from_weekday(d), HourWindow::new(0, 7)))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_window_length_simple() {
        assert_eq!(HourWindow::new(0, 7).length_hours(), 7);
    }

    #[test]
    fn hour_window_length_wraps_midnight() {
        assert_eq!(HourWindow::new(22, 6).length_hours(), 8);
    }

    #[test]
    fn hour_window_length_full_day_when_equal() {
        assert_eq!(HourWindow::new(5, 5).length_hours(), 24);
    }

    #[test]
    fn weekday_key_roundtrips() {
        for d in [
            Weekday::Sun,
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
        ] {
            assert_eq!(WeekdayKey::from_weekday(d).to_weekday(), d);
        }
    }

    #[test]
    fn office_hours_spec_covers_weekdays_only() {
        let spec = office_hours_spec();
        assert_eq!(spec.len(), 5);
        assert!(!spec.contains_key(&WeekdayKey::from_weekday(Weekday::Sat)));
        assert!(!spec.contains_key(&WeekdayKey::from_weekday(Weekday::Sun)));
        for w in spec.values() {
            assert_eq!(*w, HourWindow::new(0, 7));
        }
    }
}
