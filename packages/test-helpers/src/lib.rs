//! Test helpers shared by the tracker crates.
//!
//! They build ephemeral configurations so that every test works on its own
//! temporary database and no state leaks between tests.
pub mod configuration;
