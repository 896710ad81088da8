use std::fmt::Debug;
use std::hash::Hash;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::error::{LeagueError, Result};
use crate::model::Pairing;

/// Build the single round-robin plan with the circle method.
///
/// The first team stays fixed while every other slot rotates one step per
/// round. An odd field gets an empty slot; whoever faces it sits the round
/// out. Rounds and match numbers are 1-based.
#[instrument(skip_all, fields(teams = team_ids.len()))]
pub fn round_robin_pairings<T>(team_ids: &[T]) -> Result<Vec<Pairing<T>>>
where
    T: Clone + Eq + Hash + Debug,
{
    if team_ids.len() < 2 {
        return Err(LeagueError::NotEnoughTeams {
            count: team_ids.len(),
        });
    }
    let field = field_size(team_ids.len())?;
    if let Some(duplicate) = team_ids.iter().duplicates().next() {
        return Err(LeagueError::DuplicateTeam(format!("{duplicate:?}")));
    }

    let mut slots: Vec<Option<&T>> = team_ids.iter().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }

    // An odd field plays as many rounds as it has teams.
    let rounds = if field % 2 == 0 { field - 1 } else { field };
    let pairings: Vec<Pairing<T>> = (1..=rounds)
        .flat_map(|round| round_pairings(&slots, round))
        .collect();

    debug!(rounds, fixtures = pairings.len(), "generated round-robin pairings");
    Ok(pairings)
}

/// Pairings of a single round, read straight off the rotation for `round`.
fn round_pairings<T: Clone>(slots: &[Option<&T>], round: u32) -> Vec<Pairing<T>> {
    let size = slots.len();
    (0..size / 2)
        .filter_map(|i| {
            let home = rotated(slots, round as usize, i)?;
            let away = rotated(slots, round as usize, size - 1 - i)?;
            Some((home.clone(), away.clone()))
        })
        .zip(1..)
        .map(|((home_team_id, away_team_id), match_number)| Pairing {
            round,
            match_number,
            home_team_id,
            away_team_id,
        })
        .collect()
}

/// Team count as a round number; rounds and match numbers never exceed it.
fn field_size(count: usize) -> Result<u32> {
    u32::try_from(count).map_err(|_| LeagueError::TooManyTeams { count })
}

/// The occupant of `position` after `round - 1` single-step rotations of
/// positions `1..len`. Position 0 never moves.
fn rotated<'a, T>(slots: &[Option<&'a T>], round: usize, position: usize) -> Option<&'a T> {
    if position == 0 {
        return slots[0];
    }
    let cycle = slots.len() - 1;
    slots[1 + (position - 1 + round - 1) % cycle]
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;

    fn pairs(pairings: &[Pairing<&'static str>]) -> Vec<(u32, &'static str, &'static str)> {
        pairings
            .iter()
            .map(|p| (p.round, p.home_team_id, p.away_team_id))
            .collect()
    }

    #[test]
    fn test_four_teams() {
        let pairings = round_robin_pairings(&["A", "B", "C", "D"]).unwrap();

        assert_eq!(
            pairs(&pairings),
            vec![
                (1, "A", "D"),
                (1, "B", "C"),
                (2, "A", "B"),
                (2, "C", "D"),
                (3, "A", "C"),
                (3, "D", "B"),
            ]
        );
        assert_eq!(
            pairings.iter().map(|p| p.match_number).collect_vec(),
            vec![1, 2, 1, 2, 1, 2]
        );
    }

    #[test]
    fn test_three_teams_byes() {
        let pairings = round_robin_pairings(&["A", "B", "C"]).unwrap();

        assert_eq!(
            pairs(&pairings),
            vec![(1, "B", "C"), (2, "A", "B"), (3, "A", "C")]
        );
        assert!(pairings.iter().all(|p| p.match_number == 1));

        let mut appearances: HashMap<&str, usize> = HashMap::new();
        for p in &pairings {
            *appearances.entry(p.home_team_id).or_default() += 1;
            *appearances.entry(p.away_team_id).or_default() += 1;
        }
        assert!(appearances.values().all(|n| *n == 2));
    }

    #[test]
    fn test_two_teams() {
        let pairings = round_robin_pairings(&[1, 2]).unwrap();
        assert_eq!(pairings.len(), 1);
        assert_eq!((pairings[0].home_team_id, pairings[0].away_team_id), (1, 2));
    }

    #[test]
    fn test_every_pair_once() {
        for n in 2..=15u32 {
            let teams = (1..=n).collect_vec();
            let pairings = round_robin_pairings(&teams).unwrap();

            let expected_rounds = if n % 2 == 0 { n - 1 } else { n };
            let per_round = (n / 2) as usize;
            assert_eq!(pairings.len(), (n * (n - 1) / 2) as usize, "n = {n}");

            let seen: HashSet<(u32, u32)> = pairings
                .iter()
                .map(|p| {
                    assert_ne!(p.home_team_id, p.away_team_id);
                    (
                        p.home_team_id.min(p.away_team_id),
                        p.home_team_id.max(p.away_team_id),
                    )
                })
                .collect();
            let all_pairs: HashSet<(u32, u32)> =
                teams.iter().copied().tuple_combinations().collect();
            assert_eq!(seen, all_pairs, "n = {n}");

            for (round, group) in &pairings.iter().chunk_by(|p| p.round) {
                let group = group.collect_vec();
                assert_eq!(group.len(), per_round, "n = {n}, round {round}");
                let playing: HashSet<u32> = group
                    .iter()
                    .flat_map(|p| [p.home_team_id, p.away_team_id])
                    .collect();
                assert_eq!(playing.len(), per_round * 2);
            }
            assert_eq!(pairings.last().unwrap().round, expected_rounds);

            if n % 2 == 1 {
                // every team sits out exactly one round
                for team in &teams {
                    let rounds_played = pairings
                        .iter()
                        .filter(|p| p.home_team_id == *team || p.away_team_id == *team)
                        .count();
                    assert_eq!(rounds_played as u32, expected_rounds - 1);
                }
            }
        }
    }

    #[test]
    fn test_matches_stepwise_rotation() {
        let teams = ["A", "B", "C", "D", "E", "F", "G", "H"];
        let slots: Vec<Option<&&str>> = teams.iter().map(Some).collect();

        let mut stepwise = slots.clone();
        for round in 1..teams.len() {
            for position in 0..teams.len() {
                assert_eq!(rotated(&slots, round, position), stepwise[position]);
            }
            stepwise[1..].rotate_left(1);
        }
    }

    #[test]
    fn test_rejects_too_few_teams() {
        let err = round_robin_pairings(&["A"]).unwrap_err();
        assert!(matches!(err, LeagueError::NotEnoughTeams { count: 1 }));
        assert!(err.is_validation());

        let empty: [&str; 0] = [];
        assert!(round_robin_pairings(&empty).is_err());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_field_size_beyond_round_numbers() {
        assert_eq!(field_size(u32::MAX as usize).unwrap(), u32::MAX);

        let count = u32::MAX as usize + 1;
        let err = field_size(count).unwrap_err();
        assert!(matches!(err, LeagueError::TooManyTeams { count: c } if c == count));
        assert!(err.is_validation());
    }

    #[test]
    fn test_rejects_duplicate_teams() {
        let err = round_robin_pairings(&["A", "B", "A"]).unwrap_err();
        assert!(matches!(err, LeagueError::DuplicateTeam(_)));
    }
}
