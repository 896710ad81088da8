mod config;
mod fixture;
mod league;
mod standing;

pub use config::*;
pub use fixture::*;
pub use league::*;
pub use standing::*;
