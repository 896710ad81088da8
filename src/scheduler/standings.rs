use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, instrument, warn};

use crate::error::{LeagueError, Result};
use crate::model::{MatchResult, Scoring, StandingRow};

/// Rebuild the league table from every completed match.
///
/// Each listed team gets a row, even without a single match played. Rows are
/// ranked by points, goal difference, then goals for (all descending) and
/// finally by ascending team identifier, so equal inputs always give the same
/// table. Positions are strictly sequential.
#[instrument(skip_all, fields(teams = teams.len(), matches = completed.len()))]
pub fn compute_standings<T>(
    teams: &[T],
    completed: &[MatchResult<T>],
    scoring: &Scoring,
) -> Result<Vec<StandingRow<T>>>
where
    T: Clone + Ord + Hash + Debug,
{
    let mut rows: HashMap<&T, StandingRow<T>> = teams
        .iter()
        .map(|team| (team, StandingRow::empty(team.clone())))
        .collect();

    for result in completed {
        if result.home_team_id == result.away_team_id {
            return Err(LeagueError::InvalidMatch(format!(
                "team {:?} cannot play itself",
                result.home_team_id
            )));
        }

        let home_outcome = result.home_score.cmp(&result.away_score);
        let sides = [
            (&result.home_team_id, home_outcome, result.home_score, result.away_score),
            (&result.away_team_id, home_outcome.reverse(), result.away_score, result.home_score),
        ];
        for (team, outcome, scored, conceded) in sides {
            match rows.get_mut(team) {
                Some(row) => record(row, outcome, scored, conceded, scoring),
                None => warn!(team = ?team, "completed match names a team outside the league"),
            }
        }
    }

    let mut table: Vec<StandingRow<T>> = rows.into_values().collect();
    table.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
            .then(b.goals_for.cmp(&a.goals_for))
            .then_with(|| a.team_id.cmp(&b.team_id))
    });
    for (row, position) in table.iter_mut().zip(1..) {
        row.position = position;
    }

    debug!(rows = table.len(), "computed standings");
    Ok(table)
}

fn record<T>(
    row: &mut StandingRow<T>,
    outcome: Ordering,
    scored: u32,
    conceded: u32,
    scoring: &Scoring,
) {
    row.played += 1;
    row.goals_for = row.goals_for.saturating_add(scored);
    row.goals_against = row.goals_against.saturating_add(conceded);
    row.goal_difference = clamp_to_i32(i64::from(row.goals_for) - i64::from(row.goals_against));

    let awarded = match outcome {
        Ordering::Greater => {
            row.won += 1;
            scoring.points_for_win
        }
        Ordering::Equal => {
            row.drawn += 1;
            scoring.points_for_draw
        }
        Ordering::Less => {
            row.lost += 1;
            scoring.points_for_loss
        }
    };
    row.points = row.points.saturating_add(awarded);
}

fn clamp_to_i32(n: i64) -> i32 {
    i32::try_from(n).unwrap_or(if n < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(
        home: &'static str,
        away: &'static str,
        home_score: u32,
        away_score: u32,
    ) -> MatchResult<&'static str> {
        MatchResult {
            home_team_id: home,
            away_team_id: away,
            home_score,
            away_score,
        }
    }

    fn row<'a>(table: &'a [StandingRow<&'static str>], team: &str) -> &'a StandingRow<&'static str> {
        table.iter().find(|r| r.team_id == team).unwrap()
    }

    #[test]
    fn test_team_record() {
        let matches = vec![
            result("A", "B", 2, 0),
            result("C", "A", 0, 1),
            result("A", "D", 1, 1),
            result("B", "A", 2, 1),
        ];
        let table =
            compute_standings(&["A", "B", "C", "D"], &matches, &Scoring::default()).unwrap();

        let a = row(&table, "A");
        assert_eq!(a.played, 4);
        assert_eq!((a.won, a.drawn, a.lost), (2, 1, 1));
        assert_eq!((a.goals_for, a.goals_against), (5, 3));
        assert_eq!(a.goal_difference, 2);
        assert_eq!(a.points, 7);
        assert_eq!(a.position, 1);
    }

    #[test]
    fn test_team_without_matches() {
        let table = compute_standings(
            &["A", "B", "C"],
            &[result("A", "B", 3, 1)],
            &Scoring::default(),
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        let c = row(&table, "C");
        assert_eq!(c.played, 0);
        assert_eq!(c.points, 0);
        assert_eq!(c.goal_difference, 0);
        assert_eq!(c.position, 2);
        assert_eq!(row(&table, "B").position, 3);
    }

    #[test]
    fn test_ranking_keys() {
        let matches = vec![
            // B and C level on points, C better on goal difference
            result("B", "D", 1, 0),
            result("C", "D", 4, 0),
            // E and F level on points and goal difference, F scored more
            result("E", "A", 1, 1),
            result("F", "A", 3, 3),
        ];
        let table = compute_standings(
            &["A", "B", "C", "D", "E", "F"],
            &matches,
            &Scoring::default(),
        )
        .unwrap();

        let order: Vec<&str> = table.iter().map(|r| r.team_id).collect();
        assert_eq!(order, vec!["C", "B", "A", "F", "E", "D"]);
        assert_eq!(
            table.iter().map(|r| r.position).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5, 6]
        );
    }

    #[test]
    fn test_full_tie_falls_back_to_identifier() {
        let matches = vec![result("D", "B", 1, 1), result("C", "A", 1, 1)];
        let forward =
            compute_standings(&["D", "C", "B", "A"], &matches, &Scoring::default()).unwrap();
        let order: Vec<&str> = forward.iter().map(|r| r.team_id).collect();
        assert_eq!(order, vec!["A", "B", "C", "D"]);

        let reversed: Vec<_> = matches.iter().rev().cloned().collect();
        let backward =
            compute_standings(&["A", "B", "C", "D"], &reversed, &Scoring::default()).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_match_order_does_not_matter() {
        let mut matches = vec![
            result("A", "B", 2, 1),
            result("C", "D", 0, 0),
            result("A", "C", 1, 3),
            result("B", "D", 2, 2),
            result("D", "A", 0, 1),
            result("B", "C", 4, 0),
        ];
        let teams = ["A", "B", "C", "D"];
        let expected = compute_standings(&teams, &matches, &Scoring::default()).unwrap();

        for _ in 0..matches.len() {
            matches.rotate_left(1);
            assert_eq!(
                compute_standings(&teams, &matches, &Scoring::default()).unwrap(),
                expected
            );
        }
        matches.reverse();
        assert_eq!(
            compute_standings(&teams, &matches, &Scoring::default()).unwrap(),
            expected
        );
    }

    #[test]
    fn test_row_invariants() {
        let scoring = Scoring {
            points_for_win: 2,
            points_for_draw: 1,
            points_for_loss: -1,
        };
        let matches = vec![
            result("A", "B", 0, 5),
            result("B", "C", 1, 1),
            result("C", "A", 2, 0),
            result("A", "B", 3, 3),
        ];
        let table = compute_standings(&["A", "B", "C"], &matches, &scoring).unwrap();

        for r in &table {
            assert_eq!(r.played, r.won + r.drawn + r.lost);
            assert_eq!(r.goal_difference, r.goals_for as i32 - r.goals_against as i32);
            assert_eq!(r.points, r.won as i32 * 2 + r.drawn as i32 - r.lost as i32);
        }
        // A: two losses and a draw
        assert_eq!(row(&table, "A").points, -1);
    }

    #[test]
    fn test_unknown_team_counts_for_known_side() {
        let table = compute_standings(
            &["A", "B"],
            &[result("A", "Z", 2, 0)],
            &Scoring::default(),
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(row(&table, "A").won, 1);
    }

    #[test]
    fn test_rejects_self_match() {
        let err =
            compute_standings(&["A", "B"], &[result("A", "A", 1, 0)], &Scoring::default())
                .unwrap_err();
        assert!(matches!(err, LeagueError::InvalidMatch(_)));
    }
}
