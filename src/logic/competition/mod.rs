// Competitions: league tables, knockout cups and cups with a group stage.
pub mod cup;
pub mod grouped_cup;
pub mod ranking;
pub mod round_robin;
pub mod standings;
pub mod template;
