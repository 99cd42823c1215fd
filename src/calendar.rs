use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Timelike, Utc};

fn jst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("UTC+9 is a valid offset")
}

/// One "now" instant pinned to JST (fixed UTC+9, no DST).
///
/// A clock is captured once per logical request and shared by every derived
/// computation, so the calendar cannot roll over mid-request. All other
/// modules do their date math through this type; nothing else reads the
/// wall clock.
#[derive(Debug, Clone, Copy)]
pub struct JstClock {
    now: DateTime<FixedOffset>,
}

impl JstClock {
    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        Self {
            now: instant.with_timezone(&jst()),
        }
    }

    /// Reads the wall clock. Call once at the CLI edge, never inside the engine.
    pub fn system() -> Self {
        Self::from_utc(Utc::now())
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    pub fn yesterday(&self) -> NaiveDate {
        self.days_ago(1)
    }

    pub fn days_ago(&self, n: u32) -> NaiveDate {
        self.today() - Duration::days(i64::from(n))
    }

    pub fn hour(&self) -> u32 {
        self.now.hour()
    }

    /// 0 = Sunday .. 6 = Saturday.
    pub fn weekday_index(&self) -> u32 {
        self.now.weekday().num_days_from_sunday()
    }

    /// Monday on or before today. Weeks start on Monday, so Sunday maps
    /// back six days.
    pub fn this_week_monday(&self) -> NaiveDate {
        let back = match self.weekday_index() {
            0 => 6,
            w => w - 1,
        };
        self.today() - Duration::days(i64::from(back))
    }
}

/// Signed day count `b - a`.
pub fn date_difference(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn clock_at(year: i32, month: u32, day: u32, hour: u32) -> JstClock {
        // Arguments are JST wall time; shift back nine hours for the UTC instant.
        let utc = Utc
            .with_ymd_and_hms(year, month, day, hour, 0, 0)
            .unwrap()
            - Duration::hours(9);
        JstClock::from_utc(utc)
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn today_follows_jst_not_utc() {
        // 16:30 UTC is already the next day in Tokyo.
        let clock = JstClock::from_utc(Utc.with_ymd_and_hms(2026, 3, 2, 16, 30, 0).unwrap());
        assert_eq!(clock.today(), date(2026, 3, 3));
        assert_eq!(clock.hour(), 1);
    }

    #[test]
    fn days_ago_crosses_month_boundary() {
        let clock = clock_at(2026, 3, 1, 9);
        assert_eq!(clock.days_ago(1), date(2026, 2, 28));
    }

    #[test]
    fn days_ago_handles_leap_february() {
        let clock = clock_at(2024, 3, 1, 9);
        assert_eq!(clock.days_ago(1), date(2024, 2, 29));
        assert_eq!(clock.days_ago(2), date(2024, 2, 28));
    }

    #[test]
    fn days_ago_crosses_year_boundary() {
        let clock = clock_at(2026, 1, 1, 9);
        assert_eq!(clock.days_ago(1), date(2025, 12, 31));
    }

    #[test]
    fn weekday_index_is_sunday_based() {
        assert_eq!(clock_at(2026, 1, 4, 9).weekday_index(), 0); // Sunday
        assert_eq!(clock_at(2026, 1, 3, 9).weekday_index(), 6); // Saturday
        assert_eq!(clock_at(2026, 3, 3, 9).weekday_index(), 2); // Tuesday
    }

    #[test]
    fn week_monday_from_midweek() {
        let clock = clock_at(2026, 3, 3, 9); // Tuesday
        assert_eq!(clock.this_week_monday(), date(2026, 3, 2));
    }

    #[test]
    fn week_monday_from_sunday_goes_back_six_days() {
        let clock = clock_at(2026, 1, 4, 9); // Sunday
        assert_eq!(clock.this_week_monday(), date(2025, 12, 29));
    }

    #[test]
    fn week_monday_on_monday_is_today() {
        let clock = clock_at(2026, 3, 2, 9); // Monday
        assert_eq!(clock.this_week_monday(), date(2026, 3, 2));
    }

    #[test]
    fn date_difference_is_signed() {
        assert_eq!(date_difference(date(2026, 3, 1), date(2026, 3, 3)), 2);
        assert_eq!(date_difference(date(2026, 3, 3), date(2026, 3, 1)), -2);
        assert_eq!(date_difference(date(2026, 3, 3), date(2026, 3, 3)), 0);
    }
}
