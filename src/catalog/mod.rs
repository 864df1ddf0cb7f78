pub mod catalog;
pub mod errors;
pub mod names;
pub mod tiering;
pub mod types;

pub use catalog::*;
pub use errors::*;
pub use names::{display_name, initials_hint, is_correct_guess, normalize, normalize_aggressive};
pub use types::*;

#[cfg(test)]
mod tests;
