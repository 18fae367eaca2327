pub mod completions;
pub mod config;
pub mod run;
pub mod sessions;
pub mod stats;
