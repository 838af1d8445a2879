use std::fmt;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};

/// Calendar date key format shared with the usage buckets.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Timestamp format of the usage API.
pub const LABEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Longest window the chart accepts.
pub const MAX_DAYS: u32 = 3650;

/// Zone in which the usage API expresses its timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampZone {
    /// Labels are already in the caller's local time.
    #[default]
    Local,
    /// Labels are UTC and must be shifted into the local calendar.
    Utc,
}

impl TimestampZone {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "local" => Some(Self::Local),
            "utc" => Some(Self::Utc),
            _ => None,
        }
    }
}

/// How a day is labeled in the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayLabel {
    Today,
    Yesterday,
    Weekday(Weekday),
}

impl fmt::Display for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => write!(f, "Today"),
            Self::Yesterday => write!(f, "Yesterday"),
            Self::Weekday(day) => write!(f, "{}", weekday_abbr(*day)),
        }
    }
}

fn weekday_abbr(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// The N local calendar days ending today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    /// Oldest day at `00:00:00`.
    pub start_label: String,
    /// Today at `23:59:59`.
    pub end_label: String,
    /// Most recent first; index 0 is today.
    pub days: Vec<(String, DayLabel)>,
}

impl DateWindow {
    /// Window of `days` days ending on `today`, clamped to `1..=MAX_DAYS` and
    /// cut short at the earliest representable date.
    pub fn ending(today: NaiveDate, days: u32) -> Self {
        let days = days.clamp(1, MAX_DAYS);
        let dates: Vec<NaiveDate> = (0..days)
            .map_while(|offset| today.checked_sub_signed(Duration::days(i64::from(offset))))
            .collect();
        let start = dates.last().copied().unwrap_or(today);

        let entries = dates
            .into_iter()
            .enumerate()
            .map(|(offset, date)| {
                let label = match offset {
                    0 => DayLabel::Today,
                    1 => DayLabel::Yesterday,
                    _ => DayLabel::Weekday(date.weekday()),
                };
                (date.format(DATE_FORMAT).to_string(), label)
            })
            .collect();

        Self {
            start_label: format!("{} 00:00:00", start.format(DATE_FORMAT)),
            end_label: format!("{} 23:59:59", today.format(DATE_FORMAT)),
            days: entries,
        }
    }

    /// Window ending on today's date in the system calendar.
    pub fn today(days: u32) -> Self {
        Self::ending(Local::now().date_naive(), days)
    }

    /// Key of today's usage bucket.
    pub fn today_key(&self) -> &str {
        self.days.first().map(|(date, _)| date.as_str()).unwrap_or_default()
    }

    /// Labels to send to the usage API. UTC-stamped APIs get the local window
    /// bounds converted to UTC.
    pub fn query_labels<Tz: TimeZone>(&self, zone: TimestampZone, local: &Tz) -> (String, String) {
        match zone {
            TimestampZone::Local => (self.start_label.clone(), self.end_label.clone()),
            TimestampZone::Utc => (
                to_utc_label(&self.start_label, local),
                to_utc_label(&self.end_label, local),
            ),
        }
    }
}

/// Reinterprets a local wall-clock label as UTC. Labels that do not map to a
/// single instant (DST gaps) are passed through unchanged.
fn to_utc_label<Tz: TimeZone>(label: &str, local: &Tz) -> String {
    NaiveDateTime::parse_from_str(label, LABEL_FORMAT)
        .ok()
        .and_then(|naive| local.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc).format(LABEL_FORMAT).to_string())
        .unwrap_or_else(|| label.to_string())
}
