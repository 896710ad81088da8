use std::collections::HashMap;
use std::future::Future;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::error::{LeagueError, Result};
use crate::model::{
    Fixture, League, LeagueEvent, LeagueId, LeagueStatus, MatchId, MatchRecord, StandingRow,
    TeamId,
};

/// Persistence for leagues, their matches and their standings.
///
/// `insert_matches` and the `replace_*` operations must look atomic to
/// concurrent callers.
pub trait LeagueStore: Send + Sync {
    fn league(&self, league_id: LeagueId) -> impl Future<Output = Result<Option<League>>> + Send;

    fn team_ids(&self, league_id: LeagueId) -> impl Future<Output = Result<Vec<TeamId>>> + Send;

    /// All matches of a league, in (round, match number) order.
    fn matches(&self, league_id: LeagueId)
        -> impl Future<Output = Result<Vec<MatchRecord>>> + Send;

    fn find_match(&self, match_id: MatchId)
        -> impl Future<Output = Result<Option<MatchRecord>>> + Send;

    /// Store `fixtures` as freshly scheduled matches of a league that has none.
    /// Returns the stored records with their new ids, or
    /// [`LeagueError::ScheduleExists`] if the league already has matches.
    fn insert_matches(
        &self,
        league_id: LeagueId,
        fixtures: Vec<Fixture<TeamId>>,
    ) -> impl Future<Output = Result<Vec<MatchRecord>>> + Send;

    /// Returns how many matches were deleted.
    fn delete_matches(&self, league_id: LeagueId) -> impl Future<Output = Result<usize>> + Send;

    fn save_match(&self, record: MatchRecord) -> impl Future<Output = Result<()>> + Send;

    fn standings(
        &self,
        league_id: LeagueId,
    ) -> impl Future<Output = Result<Vec<StandingRow<TeamId>>>> + Send;

    fn replace_standings(
        &self,
        league_id: LeagueId,
        rows: Vec<StandingRow<TeamId>>,
    ) -> impl Future<Output = Result<()>> + Send;

    fn set_league_status(
        &self,
        league_id: LeagueId,
        status: LeagueStatus,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Pub-sub delivery of league events to subscribers.
pub trait Notifier: Send + Sync {
    fn publish(&self, event: LeagueEvent) -> impl Future<Output = Result<()>> + Send;
}

/// An in-process [`LeagueStore`].
///
/// Every operation takes the lock once, so replacements are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    leagues: HashMap<LeagueId, LeagueEntry>,
    last_match_id: MatchId,
}

#[derive(Debug)]
struct LeagueEntry {
    league: League,
    team_ids: Vec<TeamId>,
    matches: Vec<MatchRecord>,
    standings: Vec<StandingRow<TeamId>>,
}

impl State {
    fn entry_mut(&mut self, league_id: LeagueId) -> Result<&mut LeagueEntry> {
        self.leagues
            .get_mut(&league_id)
            .ok_or(LeagueError::LeagueNotFound(league_id))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a league with its teams, replacing any league with the same id.
    pub async fn insert_league(&self, league: League, team_ids: Vec<TeamId>) {
        let mut state = self.state.write().await;
        state.leagues.insert(
            league.id,
            LeagueEntry {
                league,
                team_ids,
                matches: Vec::new(),
                standings: Vec::new(),
            },
        );
    }
}

impl LeagueStore for MemoryStore {
    async fn league(&self, league_id: LeagueId) -> Result<Option<League>> {
        let state = self.state.read().await;
        Ok(state.leagues.get(&league_id).map(|e| e.league.clone()))
    }

    async fn team_ids(&self, league_id: LeagueId) -> Result<Vec<TeamId>> {
        let state = self.state.read().await;
        Ok(state
            .leagues
            .get(&league_id)
            .map(|e| e.team_ids.clone())
            .unwrap_or_default())
    }

    async fn matches(&self, league_id: LeagueId) -> Result<Vec<MatchRecord>> {
        let state = self.state.read().await;
        Ok(state
            .leagues
            .get(&league_id)
            .map(|e| e.matches.clone())
            .unwrap_or_default())
    }

    async fn find_match(&self, match_id: MatchId) -> Result<Option<MatchRecord>> {
        let state = self.state.read().await;
        Ok(state
            .leagues
            .values()
            .flat_map(|e| e.matches.iter())
            .find(|m| m.id == match_id)
            .cloned())
    }

    async fn insert_matches(
        &self,
        league_id: LeagueId,
        fixtures: Vec<Fixture<TeamId>>,
    ) -> Result<Vec<MatchRecord>> {
        let mut state = self.state.write().await;
        let last_id = state.last_match_id;
        let count = MatchId::try_from(fixtures.len()).map_err(|_| {
            LeagueError::Storage(format!("{} matches exceed the id range", fixtures.len()))
        })?;
        let next_last_id = last_id
            .checked_add(count)
            .ok_or_else(|| LeagueError::Storage(format!("match ids exhausted after {last_id}")))?;

        let entry = state.entry_mut(league_id)?;
        if !entry.matches.is_empty() {
            return Err(LeagueError::ScheduleExists {
                league_id,
                matches: entry.matches.len(),
            });
        }

        entry.matches = fixtures
            .into_iter()
            .zip(1..=count)
            .map(|(fixture, n)| MatchRecord::scheduled(last_id + n, league_id, fixture))
            .collect();
        entry.matches.sort_by_key(|m| (m.fixture.round, m.fixture.match_number));
        let records = entry.matches.clone();

        state.last_match_id = next_last_id;
        debug!(league_id, matches = records.len(), "stored schedule");
        Ok(records)
    }

    async fn delete_matches(&self, league_id: LeagueId) -> Result<usize> {
        let mut state = self.state.write().await;
        let entry = state.entry_mut(league_id)?;
        Ok(std::mem::take(&mut entry.matches).len())
    }

    async fn save_match(&self, record: MatchRecord) -> Result<()> {
        let mut state = self.state.write().await;
        let entry = state.entry_mut(record.league_id)?;
        let stored = entry
            .matches
            .iter_mut()
            .find(|m| m.id == record.id)
            .ok_or(LeagueError::MatchNotFound(record.id))?;
        *stored = record;
        Ok(())
    }

    async fn standings(&self, league_id: LeagueId) -> Result<Vec<StandingRow<TeamId>>> {
        let state = self.state.read().await;
        Ok(state
            .leagues
            .get(&league_id)
            .map(|e| e.standings.clone())
            .unwrap_or_default())
    }

    async fn replace_standings(
        &self,
        league_id: LeagueId,
        rows: Vec<StandingRow<TeamId>>,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.entry_mut(league_id)?.standings = rows;
        Ok(())
    }

    async fn set_league_status(&self, league_id: LeagueId, status: LeagueStatus) -> Result<()> {
        let mut state = self.state.write().await;
        state.entry_mut(league_id)?.league.status = status;
        Ok(())
    }
}

/// A [`Notifier`] backed by a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<LeagueEvent>,
}

impl BroadcastNotifier {
    /// `capacity` is the number of events a slow subscriber may lag behind.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LeagueEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier for BroadcastNotifier {
    async fn publish(&self, event: LeagueEvent) -> Result<()> {
        let name = event.to_string();
        let league_id = event.league_id();
        match self.sender.send(event) {
            Ok(subscribers) => debug!(event = %name, league_id, subscribers, "published event"),
            // Nobody listening is not a failure.
            Err(_) => debug!(event = %name, league_id, "no subscribers for event"),
        }
        Ok(())
    }
}
