use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{LeagueError, Result};

const START_TIME_FORMAT: &str = "%H:%M";

/// Options for laying round-robin pairings onto a calendar.
///
/// Deserializes from a scheduling request body; every field except
/// `startDate` falls back to its default when absent.
///
/// ```
/// use chrono::NaiveDate;
/// use league_scheduler::ScheduleConfig;
///
/// let start = NaiveDate::from_ymd_opt(2030, 3, 2).unwrap();
/// let config = ScheduleConfig {
///     matches_per_day: 2,
///     ..ScheduleConfig::new(start)
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfig {
    pub start_date: NaiveDate,
    #[serde(default = "default_match_duration")]
    pub match_duration_minutes: u32,
    #[serde(default = "default_break")]
    pub break_between_matches: u32,
    #[serde(default = "default_matches_per_day")]
    pub matches_per_day: u32,
    /// Weekdays that never host a match, 0 = Sunday.
    #[serde(default = "default_exclude_days")]
    pub exclude_days: BTreeSet<u8>,
    /// First kick-off of each day, `HH:MM` 24-hour.
    #[serde(default = "default_start_time")]
    pub preferred_start_time: String,
}

fn default_match_duration() -> u32 {
    90
}

fn default_break() -> u32 {
    30
}

fn default_matches_per_day() -> u32 {
    4
}

fn default_exclude_days() -> BTreeSet<u8> {
    BTreeSet::from([0])
}

fn default_start_time() -> String {
    "10:00".to_string()
}

impl ScheduleConfig {
    /// Create a config starting on `start_date` with every other option at its default.
    pub fn new(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            match_duration_minutes: default_match_duration(),
            break_between_matches: default_break(),
            matches_per_day: default_matches_per_day(),
            exclude_days: default_exclude_days(),
            preferred_start_time: default_start_time(),
        }
    }

    /// Check every option is usable for calendar placement.
    pub fn validate(&self) -> Result<()> {
        if self.match_duration_minutes == 0 {
            return Err(invalid("matchDurationMinutes", "must be greater than 0"));
        }
        if self.matches_per_day == 0 {
            return Err(invalid("matchesPerDay", "must be greater than 0"));
        }
        if let Some(day) = self.exclude_days.iter().find(|d| **d > 6) {
            return Err(invalid(
                "excludeDays",
                format!("weekday index {day} is outside 0..=6"),
            ));
        }
        if self.exclude_days.len() == 7 {
            return Err(invalid("excludeDays", "every weekday is excluded"));
        }
        self.start_time()?;
        Ok(())
    }

    /// The parsed `preferred_start_time`.
    pub fn start_time(&self) -> Result<NaiveTime> {
        Ok(NaiveTime::parse_from_str(
            self.preferred_start_time.trim(),
            START_TIME_FORMAT,
        )?)
    }

    /// Minutes the clock advances after each placed match.
    pub fn slot_minutes(&self) -> u32 {
        self.match_duration_minutes
            .saturating_add(self.break_between_matches)
    }

    pub(crate) fn is_excluded(&self, weekday_from_sunday: u32) -> bool {
        u8::try_from(weekday_from_sunday).is_ok_and(|d| self.exclude_days.contains(&d))
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> LeagueError {
    LeagueError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 3, 4).unwrap()
    }

    #[test]
    fn test_defaults_from_request_body() {
        let config: ScheduleConfig = serde_json::from_str(r#"{"startDate":"2030-03-04"}"#).unwrap();

        assert_eq!(config, ScheduleConfig::new(start()));
        assert_eq!(config.match_duration_minutes, 90);
        assert_eq!(config.break_between_matches, 30);
        assert_eq!(config.matches_per_day, 4);
        assert_eq!(config.exclude_days, BTreeSet::from([0]));
        assert_eq!(config.preferred_start_time, "10:00");
    }

    #[test]
    fn test_request_body_overrides() {
        let config: ScheduleConfig = serde_json::from_str(
            r#"{
                "startDate": "2030-03-04",
                "matchDurationMinutes": 60,
                "breakBetweenMatches": 15,
                "matchesPerDay": 2,
                "excludeDays": [0, 6],
                "preferredStartTime": "18:30"
            }"#,
        )
        .unwrap();

        assert_eq!(config.slot_minutes(), 75);
        assert_eq!(config.matches_per_day, 2);
        assert!(config.is_excluded(6));
        assert!(!config.is_excluded(1));
        assert_eq!(
            config.start_time().unwrap(),
            NaiveTime::from_hms_opt(18, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_validate_rejects_bad_options() {
        let zero_duration = ScheduleConfig {
            match_duration_minutes: 0,
            ..ScheduleConfig::new(start())
        };
        assert!(matches!(
            zero_duration.validate(),
            Err(LeagueError::InvalidConfig { field: "matchDurationMinutes", .. })
        ));

        let zero_per_day = ScheduleConfig {
            matches_per_day: 0,
            ..ScheduleConfig::new(start())
        };
        assert!(zero_per_day.validate().is_err());

        let bad_weekday = ScheduleConfig {
            exclude_days: BTreeSet::from([7]),
            ..ScheduleConfig::new(start())
        };
        assert!(bad_weekday.validate().is_err());

        let whole_week = ScheduleConfig {
            exclude_days: (0..7).collect(),
            ..ScheduleConfig::new(start())
        };
        assert!(whole_week.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_malformed_start_time() {
        for raw in ["25:00", "ten", "10", ""] {
            let config = ScheduleConfig {
                preferred_start_time: raw.to_string(),
                ..ScheduleConfig::new(start())
            };
            let err = config.validate().unwrap_err();
            assert!(matches!(err, LeagueError::TimeParse(_)), "{raw}: {err}");
            assert!(err.is_validation());
        }
    }
}
