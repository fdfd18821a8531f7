use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::time::parse_date;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayLocale {
    #[default]
    #[serde(rename = "id")]
    Indonesian,
    #[serde(rename = "en")]
    English,
}

impl DisplayLocale {
    pub fn code(&self) -> &'static str {
        match self {
            DisplayLocale::Indonesian => "id",
            DisplayLocale::English => "en",
        }
    }

    /// Sunday-first long weekday names.
    fn weekdays(&self) -> [&'static str; 7] {
        match self {
            DisplayLocale::Indonesian => ["Minggu", "Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu"],
            DisplayLocale::English => [
                "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
            ],
        }
    }

    /// Sunday-first column headers for a month grid.
    pub fn weekday_headers(&self) -> [&'static str; 7] {
        match self {
            DisplayLocale::Indonesian => ["Min", "Sen", "Sel", "Rab", "Kam", "Jum", "Sab"],
            DisplayLocale::English => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
        }
    }

    fn months(&self) -> [&'static str; 12] {
        match self {
            DisplayLocale::Indonesian => [
                "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus",
                "September", "Oktober", "November", "Desember",
            ],
            DisplayLocale::English => [
                "January", "February", "March", "April", "May", "June", "July", "August",
                "September", "October", "November", "December",
            ],
        }
    }
}

impl FromStr for DisplayLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" | "id-id" => Ok(DisplayLocale::Indonesian),
            "en" | "en-us" | "en-gb" => Ok(DisplayLocale::English),
            other => Err(format!("unsupported locale '{}'", other)),
        }
    }
}

impl fmt::Display for DisplayLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// `HH:MM` for display. Handles a bare time, `"<date> <time>"` and
/// `"<date>T<time>"`; any other input comes back unchanged.
pub fn format_display_time(raw: &str) -> String {
    let trimmed = raw.trim();
    let time_part = trimmed
        .split_once(' ')
        .or_else(|| trimmed.split_once('T'))
        .map(|(_, time)| time)
        .unwrap_or(trimmed);

    match leading_hours_minutes(time_part) {
        Some(time) => time.format("%H:%M").to_string(),
        None => raw.to_string(),
    }
}

fn leading_hours_minutes(s: &str) -> Option<NaiveTime> {
    let head = s.get(..5)?;
    NaiveTime::parse_from_str(head, "%H:%M").ok()
}

/// Long-form date, e.g. `Selasa, 16 September 2025`. Unparsable input comes
/// back unchanged.
pub fn format_display_date(raw: &str, locale: DisplayLocale) -> String {
    match parse_date(raw) {
        Ok(date) => format_long_date(date, locale),
        Err(_) => raw.to_string(),
    }
}

pub fn format_long_date(date: NaiveDate, locale: DisplayLocale) -> String {
    let weekday = locale.weekdays()[date.weekday().num_days_from_sunday() as usize];
    let month = locale.months()[date.month0() as usize];
    format!("{}, {} {} {}", weekday, date.day(), month, date.year())
}

/// Grid header such as `September 2025`.
pub fn format_month_title(first_of_month: NaiveDate, locale: DisplayLocale) -> String {
    format!(
        "{} {}",
        locale.months()[first_of_month.month0() as usize],
        first_of_month.year()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_time_from_wire_shapes() {
        assert_eq!(format_display_time("2025-09-16 10:00:00"), "10:00");
        assert_eq!(format_display_time("2025-09-16T10:00:00.000Z"), "10:00");
        assert_eq!(format_display_time("08:05:00"), "08:05");
        assert_eq!(format_display_time("08:05"), "08:05");
    }

    #[test]
    fn display_time_passes_through_unknown_input() {
        assert_eq!(format_display_time("weird"), "weird");
        assert_eq!(format_display_time("Tuesday"), "Tuesday");
        assert_eq!(format_display_time(""), "");
        assert_eq!(format_display_time("2025-09-16 later"), "2025-09-16 later");
    }

    #[test]
    fn long_dates_per_locale() {
        assert_eq!(
            format_display_date("2025-09-16", DisplayLocale::Indonesian),
            "Selasa, 16 September 2025"
        );
        assert_eq!(
            format_display_date("2025-09-16T00:00:00.000Z", DisplayLocale::English),
            "Tuesday, 16 September 2025"
        );
        assert_eq!(format_display_date("soon", DisplayLocale::English), "soon");
    }

    #[test]
    fn month_titles() {
        let first = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        assert_eq!(format_month_title(first, DisplayLocale::Indonesian), "Agustus 2025");
        assert_eq!(format_month_title(first, DisplayLocale::English), "August 2025");
    }

    #[test]
    fn locale_codes_round_trip() {
        assert_eq!("ID".parse::<DisplayLocale>().unwrap(), DisplayLocale::Indonesian);
        assert_eq!("en-US".parse::<DisplayLocale>().unwrap(), DisplayLocale::English);
        assert!("fr".parse::<DisplayLocale>().is_err());
        assert_eq!(DisplayLocale::English.to_string(), "en");
    }
}
