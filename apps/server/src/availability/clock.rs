//! Local time policy: one fixed UTC offset for the whole service, plus an
//! injectable source of "now".

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// All wall-clock comparisons happen in this zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalZone {
    offset: FixedOffset,
}

impl LocalZone {
    pub fn utc() -> Self {
        Self {
            offset: FixedOffset::east_opt(0).expect("zero offset is valid"),
        }
    }

    /// `None` outside ±24h.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(|offset| Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Current local wall-clock time.
    pub fn now(&self, clock: &dyn Clock) -> NaiveDateTime {
        clock.now_utc().with_timezone(&self.offset).naive_local()
    }

    /// Attach the zone's offset to a local wall-clock time. `None` when the
    /// matching UTC instant falls off the calendar.
    pub fn to_timestamp(&self, local: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        let utc =
            local.checked_sub_signed(Duration::seconds(i64::from(self.offset.local_minus_utc())))?;
        Some(DateTime::from_naive_utc_and_offset(utc, self.offset))
    }

    /// Parse a requested date-time into local wall-clock time.
    ///
    /// RFC 3339 input with an explicit offset is converted into the zone;
    /// offset-less input (`2026-10-19T10:00`, `2026-10-19 10:00:00`) is taken
    /// as local already.
    pub fn parse_date_time(&self, raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&self.offset).naive_local());
        }
        const FORMATS: [&str; 4] = [
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M",
        ];
        FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// `HH:MM` or `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}
