// The domain: plain data types and the rules that act on them. No I/O here.
pub mod competition;
pub mod game;
pub mod history;
pub mod league;
pub mod person;
pub mod stats;
pub mod team;
pub mod time;
pub mod types;
pub mod user;
