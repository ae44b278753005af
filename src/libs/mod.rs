pub mod config;
pub mod dataset;
pub mod distance;
pub mod index;
pub mod io;
pub mod names;
pub mod phylo;
pub mod round;
pub mod score;
pub mod transform;
