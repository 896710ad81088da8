pub(crate) mod calendar;
pub(crate) mod pairing;
pub(crate) mod standings;

use std::fmt::Debug;
use std::hash::Hash;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::model::{Fixture, Round, RoundSlot, ScheduleConfig};

pub use calendar::place_fixtures;
pub use pairing::round_robin_pairings;
pub use standings::compute_standings;

/// Generate a complete single round-robin schedule and place it on the calendar.
///
/// Validation happens before any pairing is produced, so the call either
/// returns every fixture or fails without a partial plan.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
///
/// use chrono::NaiveDate;
/// use league_scheduler::{generate_schedule, ScheduleConfig};
///
/// let config = ScheduleConfig {
///     exclude_days: BTreeSet::new(),
///     ..ScheduleConfig::new(NaiveDate::from_ymd_opt(2030, 3, 4).unwrap())
/// };
/// let fixtures = generate_schedule(&["A", "B", "C", "D"], &config)?;
/// assert_eq!(fixtures.len(), 6);
/// # Ok::<(), league_scheduler::LeagueError>(())
/// ```
#[instrument(skip_all, fields(teams = team_ids.len(), start_date = %config.start_date))]
pub fn generate_schedule<T>(team_ids: &[T], config: &ScheduleConfig) -> Result<Vec<Fixture<T>>>
where
    T: Clone + Eq + Hash + Debug,
{
    config.validate()?;
    let pairings = pairing::round_robin_pairings(team_ids)?;
    let fixtures = calendar::place_fixtures(pairings, config)?;
    debug!(fixtures = fixtures.len(), "generated schedule");
    Ok(fixtures)
}

/// Group scheduled matches by round, each round in match-number order.
pub fn group_by_round<M: RoundSlot + Clone>(matches: &[M]) -> Vec<Round<M>> {
    matches
        .iter()
        .sorted_by_key(|m| (m.round(), m.match_number()))
        .chunk_by(|m| m.round())
        .into_iter()
        .map(|(round, group)| Round {
            round,
            matches: group.cloned().collect(),
        })
        .collect()
}
