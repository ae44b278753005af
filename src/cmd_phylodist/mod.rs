//! Subcommand modules for the `phylodist` binary.

pub mod dist;
pub mod prune;
pub mod round;
pub mod utils;
pub mod variants;
