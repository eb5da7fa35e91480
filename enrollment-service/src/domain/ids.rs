//! Newtype identifiers.
//!
//! Wrapping each entity's primary key in its own type means the compiler
//! rejects passing a `CourseId` where a `StudentId` is expected — a mistake
//! that a bare `i64` would let through silently.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                $name(value)
            }
        }

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }
    };
}

id_type!(DepartmentId);
id_type!(ProfessorId);
id_type!(CourseId);
id_type!(StudentId);
id_type!(EnrollmentId);
