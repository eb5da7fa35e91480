//! Schedule value type and the half-open interval overlap algebra.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CourseId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl DayOfWeek {
    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Mon => "MON",
            DayOfWeek::Tue => "TUE",
            DayOfWeek::Wed => "WED",
            DayOfWeek::Thu => "THU",
            DayOfWeek::Fri => "FRI",
        }
    }

    pub fn all() -> [DayOfWeek; 5] {
        [
            DayOfWeek::Mon,
            DayOfWeek::Tue,
            DayOfWeek::Wed,
            DayOfWeek::Thu,
            DayOfWeek::Fri,
        ]
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A day is stored as its `as_str()` form in the database; this is the
/// round-trip back from that form.
impl std::str::FromStr for DayOfWeek {
    type Err = InvalidDayOfWeek;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MON" => Ok(DayOfWeek::Mon),
            "TUE" => Ok(DayOfWeek::Tue),
            "WED" => Ok(DayOfWeek::Wed),
            "THU" => Ok(DayOfWeek::Thu),
            "FRI" => Ok(DayOfWeek::Fri),
            other => Err(InvalidDayOfWeek(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid day of week: {0}")]
pub struct InvalidDayOfWeek(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    pub course_id: CourseId,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl Schedule {
    /// Half-open interval overlap: `a.start < b.end && b.start < a.end`.
    /// Back-to-back schedules (one ending exactly when the other starts) do
    /// not conflict.
    pub fn conflicts_with(&self, other: &Schedule) -> bool {
        self.day_of_week == other.day_of_week
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} {}-{}",
            self.day_of_week.as_str(),
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sched(day: DayOfWeek, start: (u32, u32), end: (u32, u32)) -> Schedule {
        Schedule {
            id: 1,
            course_id: CourseId(1),
            day_of_week: day,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        }
    }

    #[test]
    fn overlapping_same_day_conflicts() {
        let a = sched(DayOfWeek::Mon, (9, 0), (10, 30));
        let b = sched(DayOfWeek::Mon, (10, 0), (11, 0));
        assert!(a.conflicts_with(&b));
        assert!(b.conflicts_with(&a));
    }

    #[test]
    fn back_to_back_does_not_conflict() {
        let a = sched(DayOfWeek::Mon, (9, 0), (10, 30));
        let b = sched(DayOfWeek::Mon, (10, 30), (11, 30));
        assert!(!a.conflicts_with(&b));
    }

    #[test]
    fn different_day_never_conflicts() {
        let a = sched(DayOfWeek::Mon, (9, 0), (10, 30));
        let b = sched(DayOfWeek::Tue, (9, 0), (10, 30));
        assert!(!a.conflicts_with(&b));
    }

    #[test]
    fn identical_interval_conflicts() {
        let a = sched(DayOfWeek::Fri, (9, 0), (10, 30));
        let b = sched(DayOfWeek::Fri, (9, 0), (10, 30));
        assert!(a.conflicts_with(&b));
    }

    #[test]
    fn day_round_trips_through_str() {
        for day in DayOfWeek::all() {
            let parsed: DayOfWeek = day.as_str().parse().unwrap();
            assert_eq!(day, parsed);
        }
    }
}
