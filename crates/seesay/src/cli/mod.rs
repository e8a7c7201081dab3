//! Command handlers for the `seesay` binary.

pub mod config;
pub mod describe;
pub mod player;
pub mod serve;
