use chrono::{Local, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::error::{LeagueError, Result};
use crate::model::*;
use crate::scheduler;
use crate::store::{LeagueStore, Notifier};

/// Runs scheduling and standings for leagues held in a [`LeagueStore`].
///
/// `LeagueService` performs the precondition checks around the pure
/// scheduler functions, persists their output with replace semantics and
/// publishes a [`LeagueEvent`] after every state change.
///
/// # Examples
///
/// ```
/// # async fn example() -> league_scheduler::Result<()> {
/// use chrono::NaiveDate;
/// use league_scheduler::{BroadcastNotifier, League, LeagueService, MemoryStore, ScheduleConfig};
///
/// let store = MemoryStore::new();
/// store.insert_league(League::new(1, "Sunday League"), vec![10, 11, 12, 13]).await;
///
/// let service = LeagueService::new(store, BroadcastNotifier::default());
/// let start = NaiveDate::from_ymd_opt(2099, 3, 2).unwrap();
/// let summary = service.generate_schedule(1, &ScheduleConfig::new(start)).await?;
/// assert_eq!(summary.total_rounds, 3);
/// # Ok(())
/// # }
/// ```
pub struct LeagueService<S, N> {
    store: S,
    notifier: N,
    today: Option<NaiveDate>,
}

impl<S: LeagueStore, N: Notifier> LeagueService<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            store,
            notifier,
            today: None,
        }
    }

    /// Pin the date used to reject schedules starting in the past.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    /// Generate and store the league's full schedule.
    ///
    /// Refuses to overwrite an existing schedule; delete it first. The store
    /// repeats that check atomically, so concurrent calls cannot both succeed.
    #[instrument(skip(self, config), fields(start_date = %config.start_date))]
    pub async fn generate_schedule(
        &self,
        league_id: LeagueId,
        config: &ScheduleConfig,
    ) -> Result<ScheduleSummary> {
        self.require_league(league_id).await?;

        let existing = self.store.matches(league_id).await?;
        if !existing.is_empty() {
            return Err(LeagueError::ScheduleExists {
                league_id,
                matches: existing.len(),
            });
        }

        let today = self.today();
        if config.start_date < today {
            return Err(LeagueError::StartDateInPast {
                start_date: config.start_date,
                today,
            });
        }

        let team_ids = self.store.team_ids(league_id).await?;
        let fixtures = scheduler::generate_schedule(&team_ids, config)?;

        let records = self.store.insert_matches(league_id, fixtures).await?;
        self.store
            .set_league_status(league_id, LeagueStatus::RegistrationClosed)
            .await?;

        let summary = summarize(records);
        debug!(
            league_id,
            matches = summary.total_matches,
            rounds = summary.total_rounds,
            "schedule generated"
        );
        self.notifier
            .publish(LeagueEvent::ScheduleGenerated {
                league_id,
                total_matches: summary.total_matches,
                total_rounds: summary.total_rounds,
            })
            .await?;
        Ok(summary)
    }

    /// The stored schedule grouped by round.
    #[instrument(skip(self))]
    pub async fn schedule(&self, league_id: LeagueId) -> Result<ScheduleSummary> {
        self.require_league(league_id).await?;
        let records = self.store.matches(league_id).await?;
        Ok(summarize(records))
    }

    /// Delete the schedule and standings, reopening registration.
    /// Returns the number of deleted matches.
    #[instrument(skip(self))]
    pub async fn delete_schedule(&self, league_id: LeagueId) -> Result<usize> {
        let league = self.require_league(league_id).await?;
        if league.status == LeagueStatus::InProgress {
            return Err(LeagueError::ScheduleLocked(league_id));
        }

        let deleted = self.store.delete_matches(league_id).await?;
        self.store.replace_standings(league_id, Vec::new()).await?;
        self.store
            .set_league_status(league_id, LeagueStatus::RegistrationOpen)
            .await?;

        debug!(league_id, deleted, "schedule deleted");
        Ok(deleted)
    }

    #[instrument(skip(self))]
    pub async fn start_match(&self, match_id: MatchId) -> Result<MatchRecord> {
        let mut record = self.require_match(match_id).await?;
        expect_status(&record, MatchStatus::Scheduled)?;

        record.status = MatchStatus::InProgress;
        record.started_at = Some(self.now());
        self.store.save_match(record.clone()).await?;

        let league = self.require_league(record.league_id).await?;
        if league.status == LeagueStatus::RegistrationClosed {
            self.store
                .set_league_status(league.id, LeagueStatus::InProgress)
                .await?;
        }

        self.notifier
            .publish(LeagueEvent::match_updated(&record))
            .await?;
        Ok(record)
    }

    /// Record the running score of a match in progress. `notes` replaces any
    /// earlier referee notes.
    #[instrument(skip(self, notes))]
    pub async fn update_score(
        &self,
        match_id: MatchId,
        home_score: u32,
        away_score: u32,
        notes: Option<String>,
    ) -> Result<MatchRecord> {
        let mut record = self.require_match(match_id).await?;
        expect_status(&record, MatchStatus::InProgress)?;

        record.home_score = home_score;
        record.away_score = away_score;
        record.notes = notes;
        self.store.save_match(record.clone()).await?;

        self.notifier
            .publish(LeagueEvent::match_updated(&record))
            .await?;
        Ok(record)
    }

    /// Finish a match with its final score and rebuild the league table.
    ///
    /// The table is computed before anything is written. If storing it fails
    /// after the match was saved, [`LeagueService::refresh_standings`] rebuilds
    /// it.
    #[instrument(skip(self, notes))]
    pub async fn complete_match(
        &self,
        match_id: MatchId,
        home_score: u32,
        away_score: u32,
        notes: Option<String>,
    ) -> Result<Vec<StandingRow<TeamId>>> {
        let mut record = self.require_match(match_id).await?;
        expect_status(&record, MatchStatus::InProgress)?;

        record.home_score = home_score;
        record.away_score = away_score;
        record.notes = notes;
        record.status = MatchStatus::Completed;
        record.completed_at = Some(self.now());

        let mut matches = self.store.matches(record.league_id).await?;
        if let Some(stored) = matches.iter_mut().find(|m| m.id == record.id) {
            *stored = record.clone();
        }
        let standings = self.compute_table(record.league_id, &matches).await?;

        self.store.save_match(record.clone()).await?;
        self.store_table(record.league_id, &matches, &standings).await?;

        self.notifier
            .publish(LeagueEvent::match_updated(&record))
            .await?;
        self.notifier
            .publish(LeagueEvent::StandingsUpdated {
                league_id: record.league_id,
                standings: standings.clone(),
            })
            .await?;
        Ok(standings)
    }

    /// Rebuild and store the table from the league's completed matches.
    #[instrument(skip(self))]
    pub async fn refresh_standings(
        &self,
        league_id: LeagueId,
    ) -> Result<Vec<StandingRow<TeamId>>> {
        let matches = self.store.matches(league_id).await?;
        let standings = self.compute_table(league_id, &matches).await?;
        self.store_table(league_id, &matches, &standings).await?;
        Ok(standings)
    }

    /// The stored league table.
    #[instrument(skip(self))]
    pub async fn standings(&self, league_id: LeagueId) -> Result<Vec<StandingRow<TeamId>>> {
        self.require_league(league_id).await?;
        self.store.standings(league_id).await
    }

    /// The stored table with team and match counts.
    #[instrument(skip(self))]
    pub async fn standings_summary(&self, league_id: LeagueId) -> Result<StandingsSummary> {
        let league = self.require_league(league_id).await?;
        let total_teams = self.store.team_ids(league_id).await?.len();
        let matches = self.store.matches(league_id).await?;
        let standings = self.store.standings(league_id).await?;

        Ok(StandingsSummary {
            league_id,
            status: league.status,
            total_teams,
            total_matches: matches.len(),
            completed_matches: matches.iter().filter(|m| m.is_completed()).count(),
            standings,
        })
    }

    /// Up to `limit` completed matches, most recently completed first.
    #[instrument(skip(self))]
    pub async fn recent_results(
        &self,
        league_id: LeagueId,
        limit: usize,
    ) -> Result<Vec<MatchRecord>> {
        self.require_league(league_id).await?;
        let matches = self.store.matches(league_id).await?;

        let recent = matches
            .into_iter()
            .filter(MatchRecord::is_completed)
            .sorted_by(|a, b| (b.completed_at, b.id).cmp(&(a.completed_at, a.id)))
            .take(limit)
            .collect_vec();
        debug!(league_id, results = recent.len(), "loaded recent results");
        Ok(recent)
    }

    async fn compute_table(
        &self,
        league_id: LeagueId,
        matches: &[MatchRecord],
    ) -> Result<Vec<StandingRow<TeamId>>> {
        let league = self.require_league(league_id).await?;
        let team_ids = self.store.team_ids(league_id).await?;
        let completed: Vec<MatchResult<TeamId>> = matches
            .iter()
            .filter(|m| m.is_completed())
            .map(MatchRecord::result)
            .collect();
        scheduler::compute_standings(&team_ids, &completed, &league.scoring)
    }

    async fn store_table(
        &self,
        league_id: LeagueId,
        matches: &[MatchRecord],
        standings: &[StandingRow<TeamId>],
    ) -> Result<()> {
        self.store
            .replace_standings(league_id, standings.to_vec())
            .await?;

        let completed = matches.iter().filter(|m| m.is_completed()).count();
        if !matches.is_empty() && completed == matches.len() {
            self.store
                .set_league_status(league_id, LeagueStatus::Completed)
                .await?;
        }

        debug!(
            league_id,
            completed,
            remaining = matches.len() - completed,
            "standings refreshed"
        );
        Ok(())
    }

    async fn require_league(&self, league_id: LeagueId) -> Result<League> {
        self.store
            .league(league_id)
            .await?
            .ok_or(LeagueError::LeagueNotFound(league_id))
    }

    async fn require_match(&self, match_id: MatchId) -> Result<MatchRecord> {
        self.store
            .find_match(match_id)
            .await?
            .ok_or(LeagueError::MatchNotFound(match_id))
    }
}

fn expect_status(record: &MatchRecord, expected: MatchStatus) -> Result<()> {
    if record.status == expected {
        Ok(())
    } else {
        Err(LeagueError::InvalidMatchState {
            match_id: record.id,
            status: record.status,
            expected,
        })
    }
}

fn summarize(records: Vec<MatchRecord>) -> ScheduleSummary {
    let rounds = scheduler::group_by_round(&records);
    ScheduleSummary {
        total_matches: records.len(),
        total_rounds: rounds.len(),
        rounds,
    }
}
