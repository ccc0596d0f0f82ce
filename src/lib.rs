pub mod analyze;
pub mod cli;
pub mod config;
pub mod diff;
pub mod git;
pub mod model;
pub mod project;
pub mod report;
pub mod util;
