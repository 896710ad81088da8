use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

use super::fixture::Fixture;
use super::standing::{MatchResult, Scoring, StandingRow};

pub type LeagueId = u32;
pub type TeamId = u32;
pub type MatchId = u32;

/// A league as the orchestration layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    pub status: LeagueStatus,
    pub scoring: Scoring,
}

impl League {
    pub fn new(id: LeagueId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: LeagueStatus::RegistrationOpen,
            scoring: Scoring::default(),
        }
    }
}

/// Where a league is in its season lifecycle.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LeagueStatus {
    #[default]
    Draft,
    RegistrationOpen,
    RegistrationClosed,
    InProgress,
    Completed,
}

/// Where a single match is in its lifecycle.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    strum_macros::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
}

/// A fixture as persisted by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub league_id: LeagueId,
    #[serde(flatten)]
    pub fixture: Fixture<TeamId>,
    pub status: MatchStatus,
    pub home_score: u32,
    pub away_score: u32,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    /// Referee notes from the last score update.
    pub notes: Option<String>,
}

impl MatchRecord {
    /// A freshly scheduled record with a 0-0 score.
    pub fn scheduled(id: MatchId, league_id: LeagueId, fixture: Fixture<TeamId>) -> Self {
        Self {
            id,
            league_id,
            fixture,
            status: MatchStatus::Scheduled,
            home_score: 0,
            away_score: 0,
            started_at: None,
            completed_at: None,
            notes: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    pub fn result(&self) -> MatchResult<TeamId> {
        MatchResult {
            home_team_id: self.fixture.home_team_id,
            away_team_id: self.fixture.away_team_id,
            home_score: self.home_score,
            away_score: self.away_score,
        }
    }
}

/// The stored table together with league progress counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingsSummary {
    pub league_id: LeagueId,
    pub status: LeagueStatus,
    pub total_teams: usize,
    pub total_matches: usize,
    pub completed_matches: usize,
    pub standings: Vec<StandingRow<TeamId>>,
}

/// Notifications published to subscribers after a state change.
#[derive(Debug, Clone, PartialEq, Serialize, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum LeagueEvent {
    ScheduleGenerated {
        league_id: LeagueId,
        total_matches: usize,
        total_rounds: usize,
    },
    MatchUpdated {
        league_id: LeagueId,
        match_id: MatchId,
        status: MatchStatus,
        home_score: u32,
        away_score: u32,
    },
    StandingsUpdated {
        league_id: LeagueId,
        standings: Vec<StandingRow<TeamId>>,
    },
}

impl LeagueEvent {
    pub fn league_id(&self) -> LeagueId {
        match self {
            LeagueEvent::ScheduleGenerated { league_id, .. }
            | LeagueEvent::MatchUpdated { league_id, .. }
            | LeagueEvent::StandingsUpdated { league_id, .. } => *league_id,
        }
    }

    pub(crate) fn match_updated(record: &MatchRecord) -> Self {
        LeagueEvent::MatchUpdated {
            league_id: record.league_id,
            match_id: record.id,
            status: record.status,
            home_score: record.home_score,
            away_score: record.away_score,
        }
    }
}
