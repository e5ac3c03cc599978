//! Test utilities for GraphCat integration tests
//!
//! `CatalogFixture` builds a catalog over the in-memory driver (or sled in a
//! temporary directory) with one graph and its default labels, plus helpers for
//! adding labels and building polymorphic scan plans.

pub mod test_fixture;
