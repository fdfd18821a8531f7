pub mod calendar_view;
pub mod class_service;
pub mod schedule_service;

pub use calendar_view::{CalendarView, Dashboard};

use crate::error::AppError;

/// Parses a positive integer identifier from a path segment, query value or
/// body field. `what` names the entity in the error ("class", "schedule").
pub fn parse_id(raw: &str, what: &str) -> Result<i64, AppError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::Validation(format!("Invalid {} ID", what))),
    }
}

/// Trims optional free text; blank values are stored as absent.
pub(crate) fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(parse_id("12", "class").unwrap(), 12);
        assert_eq!(parse_id(" 7 ", "class").unwrap(), 7);
        for bad in ["abc", "", "0", "-3", "1.5"] {
            let err = parse_id(bad, "schedule").unwrap_err();
            assert_eq!(err.to_string(), "Validation error: Invalid schedule ID");
        }
    }

    #[test]
    fn blank_text_becomes_none() {
        assert_eq!(normalize_text(Some("  ".to_string())), None);
        assert_eq!(normalize_text(Some(" Lab 2 ".to_string())), Some("Lab 2".to_string()));
        assert_eq!(normalize_text(None), None);
    }
}
