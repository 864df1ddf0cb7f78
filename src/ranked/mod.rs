//! Fixed-composition ranked runs: a 20-card playlist ramping from staples to
//! obscure cards, and the summary shared when the run ends.

pub mod playlist;
pub mod summary;

pub use playlist::*;
pub use summary::*;

#[cfg(test)]
mod tests;
