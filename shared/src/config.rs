//! Typed process configuration, sourced from environment variables.
//!
//! Every key recognised here has a sane default so the service is runnable
//! with no environment at all (useful for `cargo test` and local dev); an
//! operator overrides individual keys without needing a config file.

use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {key} has an invalid value {value:?}: {source}")]
    InvalidValue {
        key: &'static str,
        value: String,
        source: std::num::ParseIntError,
    },
}

/// Process-wide settings, constructed once at start-up.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub max_credits_per_semester: u32,
    pub init_departments: usize,
    pub init_courses: usize,
    pub init_professors: usize,
    pub init_students: usize,
    pub log_level: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://enrollment.db".to_string(),
            max_credits_per_semester: 18,
            init_departments: 10,
            init_courses: 500,
            init_professors: 100,
            init_students: 10_000,
            log_level: "info".to_string(),
            port: 8000,
        }
    }
}

impl Settings {
    /// Load settings from the process environment, falling back to defaults
    /// for any key that is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Settings::default();

        Ok(Settings {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_credits_per_semester: parse_env(
                "MAX_CREDITS_PER_SEMESTER",
                defaults.max_credits_per_semester,
            )?,
            init_departments: parse_env("INIT_DEPARTMENTS", defaults.init_departments)?,
            init_courses: parse_env("INIT_COURSES", defaults.init_courses)?,
            init_professors: parse_env("INIT_PROFESSORS", defaults.init_professors)?,
            init_students: parse_env("INIT_STUDENTS", defaults.init_students)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            port: parse_env("PORT", defaults.port)?,
        })
    }
}

fn parse_env<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|source| ConfigError::InvalidValue { key, value, source }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let settings = Settings::default();
        assert_eq!(settings.max_credits_per_semester, 18);
        assert_eq!(settings.init_departments, 10);
        assert_eq!(settings.init_courses, 500);
        assert_eq!(settings.init_professors, 100);
        assert_eq!(settings.init_students, 10_000);
    }

    #[test]
    fn parse_env_falls_back_to_default_when_unset() {
        let value: u32 =
            parse_env("SOME_UNUSED_ENROLLMENT_SETTING_KEY", 42).expect("default is valid");
        assert_eq!(value, 42);
    }
}
