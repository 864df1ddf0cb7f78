pub mod catalog;
pub mod config;
pub mod distractors;
pub mod engine;
pub mod enrichment;
pub mod leaderboard;
pub mod ranked;
pub mod scoring;
pub mod session;
pub mod stats;

#[cfg(test)]
pub mod test_utils;

pub use config::QuizConfig;
