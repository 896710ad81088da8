use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::{debug, instrument};

use crate::error::{LeagueError, Result};
use crate::model::{Fixture, Pairing, ScheduleConfig};

/// Once the clock reaches 22:00 the day is done.
const DAY_CUTOFF_MINUTES: u32 = 22 * 60;

/// Assign kick-off times to pairings, walking them in the given order.
///
/// Each day hosts at most `matches_per_day` matches, starting at the preferred
/// start time and spaced by match duration plus break. Excluded weekdays are
/// skipped entirely. Rounds are not interleaved: the output times are
/// non-decreasing in input order.
#[instrument(skip_all, fields(pairings = pairings.len(), start_date = %config.start_date))]
pub fn place_fixtures<T>(
    pairings: Vec<Pairing<T>>,
    config: &ScheduleConfig,
) -> Result<Vec<Fixture<T>>> {
    config.validate()?;
    let first_kickoff = config.start_time()?.num_seconds_from_midnight() / 60;

    let mut cursor = Cursor {
        date: config.start_date,
        minute: first_kickoff,
        placed_today: 0,
        first_kickoff,
    };
    let mut fixtures = Vec::with_capacity(pairings.len());

    for pairing in pairings {
        cursor.skip_excluded(config)?;
        if cursor.placed_today >= config.matches_per_day {
            cursor.next_day()?;
            cursor.skip_excluded(config)?;
        }

        fixtures.push(pairing.at(cursor.kickoff()?));

        // The clock is never wrapped, so a slot running past midnight also
        // lands beyond the cutoff and rolls the day over here.
        cursor.minute = cursor.minute.saturating_add(config.slot_minutes());
        cursor.placed_today += 1;
        if cursor.minute >= DAY_CUTOFF_MINUTES {
            cursor.next_day()?;
        }
    }

    debug!(
        fixtures = fixtures.len(),
        last_date = %cursor.date,
        "placed fixtures on calendar"
    );
    Ok(fixtures)
}

/// Placement position: the current day, minutes since its midnight, and how
/// many matches that day already holds.
struct Cursor {
    date: NaiveDate,
    minute: u32,
    placed_today: u32,
    first_kickoff: u32,
}

impl Cursor {
    fn next_day(&mut self) -> Result<()> {
        self.date = self
            .date
            .checked_add_days(Days::new(1))
            .ok_or(LeagueError::CalendarOverflow(self.date))?;
        self.minute = self.first_kickoff;
        self.placed_today = 0;
        Ok(())
    }

    fn skip_excluded(&mut self, config: &ScheduleConfig) -> Result<()> {
        while config.is_excluded(self.date.weekday().num_days_from_sunday()) {
            self.next_day()?;
        }
        Ok(())
    }

    fn kickoff(&self) -> Result<NaiveDateTime> {
        NaiveTime::from_num_seconds_from_midnight_opt(self.minute * 60, 0)
            .map(|time| self.date.and_time(time))
            .ok_or(LeagueError::CalendarOverflow(self.date))
    }
}
