use crate::error::ValidationError;
use chrono::{
    DateTime, Datelike, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
    Utc,
};

/// Zero-pads a time component to two digits, anything below one shows as "00"
pub fn format_time_component(value: impl Into<i128>) -> String {
    let value = value.into();
    if value <= 0 {
        "00".to_string()
    } else {
        format!("{value:02}")
    }
}

/// `DD/MM/YYYY`
pub fn format_date(date: &NaiveDateTime) -> String {
    format!(
        "{}/{}/{}",
        format_time_component(date.day()),
        format_time_component(date.month()),
        date.year()
    )
}

/// `HH:MM`
pub fn format_time(date: &NaiveDateTime) -> String {
    format!(
        "{}:{}",
        format_time_component(date.hour()),
        format_time_component(date.minute())
    )
}

/// Builds the date of a new event from a separately picked day and time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateComposer {
    date: NaiveDateTime,
}

impl DateComposer {
    pub fn new(date: NaiveDateTime) -> Self {
        Self { date }
    }

    /// Starts from the current local time
    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    /// Changes the day, keeping the time of day
    pub fn pick_date(&mut self, date: NaiveDate) {
        self.date = date.and_time(self.date.time());
    }

    /// Changes the time of day, keeping the day
    pub fn pick_time(&mut self, time: NaiveTime) {
        self.date = self.date.date().and_time(time);
    }

    /// Moves to midnight of the chosen day
    pub fn clear_time(&mut self) {
        self.date = self.date.date().and_time(NaiveTime::MIN);
    }

    /// Moves the chosen time of day onto `today`
    pub fn set_today(&mut self, today: NaiveDate) {
        self.date = today.and_time(self.date.time());
    }

    /// Resolves the local date into an absolute timestamp
    pub fn compose(&self) -> Result<DateTime<Utc>, ValidationError> {
        to_utc(&Local, &self.date)
    }
}

/// Ambiguous local times (clocks going back) resolve to the earlier instant
pub fn to_utc<Tz: TimeZone>(tz: &Tz, date: &NaiveDateTime) -> Result<DateTime<Utc>, ValidationError> {
    match tz.from_local_datetime(date) {
        LocalResult::Single(date) | LocalResult::Ambiguous(date, _) => Ok(date.with_timezone(&Utc)),
        LocalResult::None => Err(ValidationError::NonexistentLocalTime),
    }
}

/// Checks a new event before anything is written
pub fn validate_new_event(
    name: &str,
    date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        Err(ValidationError::EmptyName)?
    }
    if date <= now {
        Err(ValidationError::DateNotInFuture)?
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_format_time_component() {
        assert_eq!(format_time_component(0), "00");
        assert_eq!(format_time_component(7), "07");
        assert_eq!(format_time_component(-1), "00");
        assert_eq!(format_time_component(42u64), "42");
        assert_eq!(format_time_component(365u64), "365");
    }

    #[test]
    fn test_format_date_and_time() {
        let date = at(2024, 3, 9, 7, 5, 59);

        assert_eq!(format_date(&date), "09/03/2024");
        assert_eq!(format_time(&date), "07:05");
        assert_eq!(format_time(&at(2024, 3, 9, 0, 0, 0)), "00:00");
    }

    #[test]
    fn test_picking_date_keeps_time() {
        let mut composer = DateComposer::new(at(2024, 1, 1, 13, 45, 10));
        composer.pick_date(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());

        assert_eq!(composer.date(), at(2025, 6, 30, 13, 45, 10));
    }

    #[test]
    fn test_picking_time_keeps_date() {
        let mut composer = DateComposer::new(at(2024, 1, 1, 13, 45, 10));
        composer.pick_time(NaiveTime::from_hms_opt(8, 30, 0).unwrap());

        assert_eq!(composer.date(), at(2024, 1, 1, 8, 30, 0));
    }

    #[test]
    fn test_clear_time_and_today() {
        let mut composer = DateComposer::new(at(2030, 12, 24, 18, 0, 5));

        composer.set_today(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(composer.date(), at(2024, 2, 29, 18, 0, 5));

        composer.clear_time();
        assert_eq!(composer.date(), at(2024, 2, 29, 0, 0, 0));
    }

    #[test]
    fn test_to_utc_applies_offset() {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();

        assert_eq!(
            to_utc(&tz, &at(2024, 1, 1, 3, 0, 0)).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_validation() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = now + Duration::seconds(1);

        assert_eq!(validate_new_event("Party", later, now), Ok(()));
        assert_eq!(
            validate_new_event("", later, now),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            validate_new_event("   ", later, now),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            validate_new_event("Party", now, now),
            Err(ValidationError::DateNotInFuture)
        );
        assert_eq!(
            validate_new_event("Party", now - Duration::days(1), now),
            Err(ValidationError::DateNotInFuture)
        );
    }
}
