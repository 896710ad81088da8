use chrono::{Days, Local};

use league_scheduler::{BroadcastNotifier, League, LeagueService, MemoryStore, ScheduleConfig};

#[tokio::main]
async fn main() {
    let store = MemoryStore::new();
    store
        .insert_league(League::new(1, "Riverside Five-a-side"), vec![11, 12, 13, 14, 15])
        .await;

    let service = LeagueService::new(store, BroadcastNotifier::default());
    let mut events = service.notifier().subscribe();

    let start = Local::now().date_naive().checked_add_days(Days::new(7)).unwrap();
    let config = ScheduleConfig {
        matches_per_day: 2,
        preferred_start_time: "18:00".to_string(),
        ..ScheduleConfig::new(start)
    };
    let summary = service.generate_schedule(1, &config).await.unwrap();
    println!(
        "Scheduled {} matches over {} rounds",
        summary.total_matches, summary.total_rounds
    );
    for round in &summary.rounds {
        for record in &round.matches {
            println!(
                "Round {} #{}: {} vs {} at {}",
                round.round,
                record.fixture.match_number,
                record.fixture.home_team_id,
                record.fixture.away_team_id,
                record.fixture.scheduled_at
            );
        }
    }

    // Play out the season with a deterministic scoreline per match.
    for record in summary.rounds.iter().flat_map(|r| &r.matches) {
        service.start_match(record.id).await.unwrap();
        let home = record.fixture.home_team_id % 4;
        let away = record.fixture.away_team_id % 3;
        let notes = (home == away).then(|| "level at full time".to_string());
        service
            .complete_match(record.id, home, away, notes)
            .await
            .unwrap();
    }

    for result in service.recent_results(1, 3).await.unwrap() {
        println!(
            "Recent: {} {}-{} {}",
            result.fixture.home_team_id,
            result.home_score,
            result.away_score,
            result.fixture.away_team_id
        );
    }

    let table = service.standings_summary(1).await.unwrap();
    println!("{}", serde_json::to_string_pretty(&table).unwrap());

    let mut published = 0;
    while events.try_recv().is_ok() {
        published += 1;
    }
    println!("Published {published} events");
}
