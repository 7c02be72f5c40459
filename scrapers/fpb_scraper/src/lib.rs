pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod fixture_parser;
pub mod pipeline;
pub mod standings_parser;
pub mod store;
pub mod sync;
pub mod types;
pub mod utils;

pub use fixture_parser::extract_fixtures;
pub use standings_parser::extract_standings;
pub use types::{FixtureRecord, FixtureStatus, StandingsRow};
