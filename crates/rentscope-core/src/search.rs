//! Rental date handling and the criteria for one city-wide search.

use chrono::{DateTime, NaiveDateTime};

use crate::CoreError;

/// The only date format the broker's search endpoint accepts.
pub const RENTAL_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

const ACCEPTED_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    RENTAL_DATE_FORMAT,
];

/// Parses a pickup or dropoff time as sent by a browser or typed on the CLI.
///
/// Accepts HTML `datetime-local` values, space-separated ISO dates, RFC 3339
/// timestamps (offset is discarded, wall-clock time kept) and the broker's own
/// `DD.MM.YYYY HH:MM` format.
///
/// # Errors
///
/// Returns [`CoreError::InvalidDate`] if no accepted format matches.
pub fn parse_rental_datetime(raw: &str) -> Result<NaiveDateTime, CoreError> {
    let trimmed = raw.trim();
    if let Some(parsed) = ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
    {
        return Ok(parsed);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.naive_local())
        .map_err(|_| CoreError::InvalidDate(raw.to_owned()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    city_slug: String,
    pickup: NaiveDateTime,
    dropoff: NaiveDateTime,
}

impl SearchCriteria {
    /// # Errors
    ///
    /// - [`CoreError::EmptyCitySlug`] if the slug is blank.
    /// - [`CoreError::InvalidDateRange`] unless dropoff is strictly after pickup.
    pub fn new(
        city_slug: &str,
        pickup: NaiveDateTime,
        dropoff: NaiveDateTime,
    ) -> Result<Self, CoreError> {
        let city_slug = city_slug.trim().to_lowercase();
        if city_slug.is_empty() {
            return Err(CoreError::EmptyCitySlug);
        }
        if dropoff <= pickup {
            return Err(CoreError::InvalidDateRange {
                pickup: pickup.format(RENTAL_DATE_FORMAT).to_string(),
                dropoff: dropoff.format(RENTAL_DATE_FORMAT).to_string(),
            });
        }
        Ok(Self {
            city_slug,
            pickup,
            dropoff,
        })
    }

    /// Parses both dates with [`parse_rental_datetime`] and validates the range.
    ///
    /// # Errors
    ///
    /// Propagates any [`CoreError`] from parsing or [`SearchCriteria::new`].
    pub fn parse(city_slug: &str, pickup: &str, dropoff: &str) -> Result<Self, CoreError> {
        Self::new(
            city_slug,
            parse_rental_datetime(pickup)?,
            parse_rental_datetime(dropoff)?,
        )
    }

    #[must_use]
    pub fn city_slug(&self) -> &str {
        &self.city_slug
    }

    #[must_use]
    pub fn pickup(&self) -> NaiveDateTime {
        self.pickup
    }

    #[must_use]
    pub fn dropoff(&self) -> NaiveDateTime {
        self.dropoff
    }

    #[must_use]
    pub fn pickup_display(&self) -> String {
        self.pickup.format(RENTAL_DATE_FORMAT).to_string()
    }

    #[must_use]
    pub fn dropoff_display(&self) -> String {
        self.dropoff.format(RENTAL_DATE_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn parses_datetime_local_input() {
        assert_eq!(
            parse_rental_datetime("2025-07-01T10:30").unwrap(),
            at(2025, 7, 1, 10, 30)
        );
    }

    #[test]
    fn parses_space_separated_iso() {
        assert_eq!(
            parse_rental_datetime("2025-07-01 10:30:00").unwrap(),
            at(2025, 7, 1, 10, 30)
        );
    }

    #[test]
    fn parses_broker_display_format() {
        assert_eq!(
            parse_rental_datetime("01.07.2025 10:30").unwrap(),
            at(2025, 7, 1, 10, 30)
        );
    }

    #[test]
    fn parses_rfc3339_keeping_wall_clock_time() {
        assert_eq!(
            parse_rental_datetime("2025-07-01T10:30:00+03:00").unwrap(),
            at(2025, 7, 1, 10, 30)
        );
    }

    #[test]
    fn rejects_garbage_dates() {
        let err = parse_rental_datetime("next tuesday").unwrap_err();
        assert!(matches!(err, CoreError::InvalidDate(ref s) if s == "next tuesday"));
    }

    #[test]
    fn criteria_formats_dates_for_the_broker() {
        let c = SearchCriteria::new("Ankara", at(2025, 7, 1, 9, 5), at(2025, 7, 4, 18, 0)).unwrap();
        assert_eq!(c.city_slug(), "ankara");
        assert_eq!(c.pickup_display(), "01.07.2025 09:05");
        assert_eq!(c.dropoff_display(), "04.07.2025 18:00");
    }

    #[test]
    fn criteria_rejects_dropoff_not_after_pickup() {
        let t = at(2025, 7, 1, 9, 0);
        assert!(matches!(
            SearchCriteria::new("ankara", t, t),
            Err(CoreError::InvalidDateRange { .. })
        ));
        assert!(matches!(
            SearchCriteria::new("ankara", t, at(2025, 6, 30, 9, 0)),
            Err(CoreError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn criteria_rejects_blank_city() {
        let err = SearchCriteria::parse("  ", "2025-07-01T10:00", "2025-07-02T10:00").unwrap_err();
        assert!(matches!(err, CoreError::EmptyCitySlug));
    }
}
