//! Shared test utilities for the tsj workspace.
//!
//! A dev-dependency only, never published.
//!
//! - [`project`]: [`TestProject`](project::TestProject), a scratch project
//!   directory with runner-settings helpers

pub mod project;

pub use project::TestProject;
