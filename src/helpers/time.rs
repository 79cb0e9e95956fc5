use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use chrono_tz::Tz;

/// e.g. "Tue, 04 Jun 2024 14:05:30"
pub const DISPLAY_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// Time zone used for display strings and for calendar-based accounting
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Zone {
    #[default]
    Local,
    Named(Tz),
}

impl Zone {
    pub fn format_epoch_millis(&self, millis: i64) -> Option<String> {
        let utc = DateTime::from_timestamp_millis(millis)?;
        let formatted = match self {
            Zone::Local => utc.with_timezone(&Local).format(DISPLAY_FORMAT).to_string(),
            Zone::Named(tz) => utc.with_timezone(tz).format(DISPLAY_FORMAT).to_string(),
        };
        Some(formatted)
    }

    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            Zone::Local => instant.with_timezone(&Local).date_naive(),
            Zone::Named(tz) => instant.with_timezone(tz).date_naive(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.date_of(Utc::now())
    }
}

pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
