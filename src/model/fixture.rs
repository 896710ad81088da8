use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::league::MatchRecord;

/// A pairing produced by the round-robin rotation, before it has a kick-off time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pairing<T> {
    pub round: u32,
    pub match_number: u32,
    pub home_team_id: T,
    pub away_team_id: T,
}

impl<T> Pairing<T> {
    /// Turn the pairing into a fixture kicking off at `scheduled_at`.
    pub fn at(self, scheduled_at: NaiveDateTime) -> Fixture<T> {
        Fixture {
            round: self.round,
            match_number: self.match_number,
            home_team_id: self.home_team_id,
            away_team_id: self.away_team_id,
            scheduled_at,
        }
    }
}

/// A single scheduled match between two teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture<T> {
    pub round: u32,
    pub match_number: u32,
    pub home_team_id: T,
    pub away_team_id: T,
    pub scheduled_at: NaiveDateTime,
}

impl<T: PartialEq> Fixture<T> {
    pub fn involves(&self, team: &T) -> bool {
        self.home_team_id == *team || self.away_team_id == *team
    }
}

/// Something that sits at a (round, match number) slot of a schedule.
pub trait RoundSlot {
    fn round(&self) -> u32;
    fn match_number(&self) -> u32;
}

impl<T> RoundSlot for Fixture<T> {
    fn round(&self) -> u32 {
        self.round
    }

    fn match_number(&self) -> u32 {
        self.match_number
    }
}

impl RoundSlot for MatchRecord {
    fn round(&self) -> u32 {
        self.fixture.round
    }

    fn match_number(&self) -> u32 {
        self.fixture.match_number
    }
}

/// All matches of one round, in match-number order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Round<M> {
    pub round: u32,
    pub matches: Vec<M>,
}

/// A stored schedule grouped by round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleSummary {
    pub total_matches: usize,
    pub total_rounds: usize,
    pub rounds: Vec<Round<MatchRecord>>,
}
