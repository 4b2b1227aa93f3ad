/// A working window in minutes since local midnight.
///
/// Values are not range-checked: `"25:00-26:00"` parses fine and it is up to
/// the caller to decide what such a window means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_minute: u32,
    pub end_minute: u32,
}

impl TimeRange {
    /// Parse `"H:MM-H:MM"`. Returns `None` on any structural or numeric
    /// mismatch.
    pub fn parse(range: &str) -> Option<Self> {
        let parts: Vec<&str> = range.split('-').collect();
        if parts.len() != 2 {
            return None;
        }
        Some(Self {
            start_minute: parse_clock(parts[0])?,
            end_minute: parse_clock(parts[1])?,
        })
    }

    pub fn start_hour(&self) -> u32 {
        self.start_minute / 60
    }

    pub fn end_hour(&self) -> u32 {
        self.end_minute / 60
    }

    /// Inclusive on both ends: a request at exactly the closing time is inside.
    pub fn contains_minute(&self, minute_of_day: u32) -> bool {
        minute_of_day >= self.start_minute && minute_of_day <= self.end_minute
    }
}

/// `"H:MM"` → minutes since midnight.
fn parse_clock(clock: &str) -> Option<u32> {
    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hour: u32 = parts[0].trim().parse().ok()?;
    let minute: u32 = parts[1].trim().parse().ok()?;
    hour.checked_mul(60)?.checked_add(minute)
}
