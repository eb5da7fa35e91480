use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CourseId, DepartmentId, ProfessorId};

/// Credit value for a course; the domain only ever admits 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credits(u8);

#[derive(Debug, thiserror::Error)]
#[error("credits must be one of 1, 2, 3, 4 (got {0})")]
pub struct InvalidCredits(pub u8);

impl Credits {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Credits {
    type Error = InvalidCredits;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Credits(value))
        } else {
            Err(InvalidCredits(value))
        }
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    pub credits: Credits,
    pub capacity: i64,
    pub enrolled: i64,
    pub professor_id: ProfessorId,
    pub department_id: DepartmentId,
}

impl Course {
    /// Invariant C1: `0 <= enrolled <= capacity`.
    pub fn within_capacity(&self) -> bool {
        (0..=self.capacity).contains(&self.enrolled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credits_accepts_one_through_four() {
        for v in 1u8..=4 {
            assert!(Credits::try_from(v).is_ok());
        }
    }

    #[test]
    fn credits_rejects_out_of_range() {
        assert!(Credits::try_from(0).is_err());
        assert!(Credits::try_from(5).is_err());
    }
}
