pub mod chart;
pub mod combat;
pub mod entity;
pub mod schedule;
pub mod scores;
pub mod song;
