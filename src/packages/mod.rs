// Read models for the public pages: domain data joined with the names and crests shown next to it.
pub mod calendar;
pub mod cup;
pub mod player;
pub mod standings;
pub mod team;
