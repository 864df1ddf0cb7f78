pub mod actions;
pub mod engine;
pub mod errors;
pub mod events;
pub mod types;

pub use actions::*;
pub use engine::*;
pub use errors::*;
pub use events::*;
pub use types::*;

#[cfg(test)]
mod tests;
