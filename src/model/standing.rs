use serde::{Deserialize, Serialize};

/// The final score of a completed match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult<T> {
    pub home_team_id: T,
    pub away_team_id: T,
    pub home_score: u32,
    pub away_score: u32,
}

/// League points awarded per result. Home and away results are weighted alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scoring {
    pub points_for_win: i32,
    pub points_for_draw: i32,
    pub points_for_loss: i32,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            points_for_win: 3,
            points_for_draw: 1,
            points_for_loss: 0,
        }
    }
}

/// One team's line in the league table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingRow<T> {
    pub team_id: T,
    /// 1-based rank; no two rows share a position.
    pub position: u32,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: i32,
}

impl<T> StandingRow<T> {
    pub(crate) fn empty(team_id: T) -> Self {
        Self {
            team_id,
            position: 0,
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
        }
    }
}
