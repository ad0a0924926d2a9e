// Time-related operations.
use time::{format_description::BorrowedFormatItem, macros::format_description, Date, Duration};

// Use this format for formatting and parsing dates.
static ISO_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

// JSON serialisation and deserialisation for ISO dates.
pub mod iso_date_format {
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::ISO_FORMAT;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
        let s = date.format(&ISO_FORMAT).map_err(S::Error::custom)?;
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where D: Deserializer<'de> {
        let s = String::deserialize(deserializer)?;
        Date::parse(s.as_str(), ISO_FORMAT).map_err(D::Error::custom)
    }

    // Same as above, for optional dates.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Date;

        pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer {
            match date {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
        where D: Deserializer<'de> {
            #[derive(Deserialize)]
            struct Wrapper(#[serde(with = "super")] Date);

            let wrapped: Option<Wrapper> = Option::deserialize(deserializer)?;
            Ok(wrapped.map(|Wrapper(d)| d))
        }
    }
}

// Convert a Date object to an ISO string.
pub fn date_to_string(date: Date) -> String {
    date.format(&ISO_FORMAT).unwrap_or_default()
}

// Convert an ISO string to a Date object.
pub fn string_to_date(date: &str) -> Option<Date> {
    Date::parse(date, ISO_FORMAT).ok()
}

// Get the date a given number of weeks after the start date.
pub fn weeks_after(start: Date, weeks: u32) -> Date {
    start.saturating_add(Duration::weeks(weeks as i64))
}

// Get how many years there are in-between the two dates.
// Gives positive values if date2 is later than date1.
pub fn years_between(date1: Date, date2: Date) -> i32 {
    let years = date2.year() - date1.year();

    match (date2.month() as u8, date2.day()) < (date1.month() as u8, date1.day()) {
        true => years - 1,
        false => years,
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn years_between_counts_completed_years() {
        assert_eq!(years_between(date!(2000-06-15), date!(2025-06-14)), 24);
        assert_eq!(years_between(date!(2000-06-15), date!(2025-06-15)), 25);
    }

    #[test]
    fn iso_strings_round_trip_through_dates() {
        let d = string_to_date("2024-02-29");
        assert_eq!(d, Some(date!(2024-02-29)));
        assert_eq!(date_to_string(date!(2024-02-29)), "2024-02-29");
        assert_eq!(string_to_date("29.02.2024"), None);
    }
}
