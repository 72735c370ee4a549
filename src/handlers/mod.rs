// handlers/mod.rs - one module per route group
pub mod calculate;
pub mod history;
pub mod proceed;
pub mod root;

pub use calculate::calculate;
pub use proceed::check_proceed;
pub use root::{health, root};
