pub use error::{LeagueError, Result};
pub use model::*;
pub use scheduler::{
    compute_standings, generate_schedule, group_by_round, place_fixtures, round_robin_pairings,
};
pub use service::LeagueService;
pub use store::{BroadcastNotifier, LeagueStore, MemoryStore, Notifier};

mod error;
mod model;
mod scheduler;
mod service;
mod store;
