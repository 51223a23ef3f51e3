//! Shared test utilities for the kubeshift workspace.
//!
//! This crate provides standardised test fixtures to avoid duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: git repository fixtures
//! - [`tree`]: [`TestTree`](tree::TestTree) builder for source and output trees

pub mod git;
pub mod tree;
