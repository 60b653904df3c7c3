//! Time-window evaluator: maps a policy + entropy + "now" to an
//! hour-long window in which an upgrade may run, or `None`.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

use crate::entropy::digest;
use crate::policy::{office_hours_spec, AutoUpgradePolicy, WeekdayKey};

/// A one-hour instant range. "In the window" means `start <= now < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }
}

/// Evaluate a resource's policy against its stable id, returning the
/// current week's one-hour window, or `None` if the policy defines no
/// window at all. This function never consults `now` for suitability; the
/// caller checks [`TimeWindow::contains`] separately.
pub fn evaluate(policy: &AutoUpgradePolicy, stable_id: &str, now: DateTime<Utc>) -> Option<TimeWindow> {
    let spec = match policy {
        AutoUpgradePolicy::Auto => office_hours_spec(),
        AutoUpgradePolicy::WeekDay(spec) => spec.clone(),
    };

    if spec.is_empty() {
        return None;
    }

    let d = digest(stable_id);
    let days: Vec<WeekdayKey> = spec.keys().copied().collect();
    let chosen_day = days[(d[0] as usize) % days.len()];

    let window = spec[&chosen_day];
    let length = window.length_hours();
    let offset_hours = (d[1] as u32) % (length as u32);
    let nominal_start_hour = window.start_hour as u32 + offset_hours;

    let now_weekday_num = WeekdayKey::from_weekday(now.weekday()).0 as i64;
    let chosen_day_num = chosen_day.0 as i64;
    let days_back = (now_weekday_num - chosen_day_num).rem_euclid(7);

    let day_date = now.date_naive() - Duration::days(days_back);
    let day_midnight = Utc
        .from_utc_datetime(&day_date.and_hms_opt(0, 0, 0).expect("midnight is always valid"));

    let start = day_midnight + Duration::hours(nominal_start_hour as i64);
    let end = start + Duration::hours(1);

    Some(TimeWindow { start, end })
}
