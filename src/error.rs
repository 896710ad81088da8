use chrono::NaiveDate;

use crate::model::{LeagueId, MatchId, MatchStatus};

/// All errors that can occur while scheduling fixtures or computing standings.
#[derive(thiserror::Error, Debug)]
pub enum LeagueError {
    /// Fewer than two teams were supplied to the fixture generator.
    #[error("at least 2 teams required, got {count}")]
    NotEnoughTeams { count: usize },

    /// More teams than round and match numbers can address.
    #[error("too many teams: {count}")]
    TooManyTeams { count: usize },

    /// The same team identifier was supplied more than once.
    #[error("duplicate team identifier: {0}")]
    DuplicateTeam(String),

    /// A scheduling option is out of range.
    #[error("invalid {field}: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// Failed to parse a date or an `HH:MM` time string.
    #[error("failed to parse date/time: {0}")]
    TimeParse(#[from] chrono::ParseError),

    /// A completed match record cannot be counted.
    #[error("invalid match: {0}")]
    InvalidMatch(String),

    /// The requested schedule would start before today.
    #[error("start date {start_date} is in the past (today is {today})")]
    StartDateInPast {
        start_date: NaiveDate,
        today: NaiveDate,
    },

    /// Calendar placement walked past the range chrono can represent.
    #[error("calendar overflow after {0}")]
    CalendarOverflow(NaiveDate),

    #[error("league {0} not found")]
    LeagueNotFound(LeagueId),

    #[error("match {0} not found")]
    MatchNotFound(MatchId),

    /// A schedule already exists; it has to be deleted before regenerating.
    #[error("schedule already exists for league {league_id} ({matches} matches)")]
    ScheduleExists { league_id: LeagueId, matches: usize },

    /// The league is in progress, so its schedule cannot be deleted.
    #[error("league {0} is in progress")]
    ScheduleLocked(LeagueId),

    /// The match is not in the state the operation requires.
    #[error("match {match_id} is {status}, expected {expected}")]
    InvalidMatchState {
        match_id: MatchId,
        status: MatchStatus,
        expected: MatchStatus,
    },

    /// The storage collaborator failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl LeagueError {
    /// Whether the error was caused by malformed input to the core functions.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LeagueError::NotEnoughTeams { .. }
                | LeagueError::TooManyTeams { .. }
                | LeagueError::DuplicateTeam(_)
                | LeagueError::InvalidConfig { .. }
                | LeagueError::TimeParse(_)
                | LeagueError::InvalidMatch(_)
                | LeagueError::StartDateInPast { .. }
        )
    }

    /// Whether the error is a caller-level precondition failure.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            LeagueError::LeagueNotFound(_)
                | LeagueError::MatchNotFound(_)
                | LeagueError::ScheduleExists { .. }
                | LeagueError::ScheduleLocked(_)
                | LeagueError::InvalidMatchState { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LeagueError>;
