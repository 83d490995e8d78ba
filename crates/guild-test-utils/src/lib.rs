//! Shared fixtures for the guild-manager test suites.
//!
//! Dev-dependency only, never published. Keeps the engine, config, and
//! integration tests on the same sample server instead of each suite
//! hand-rolling its own.
//!
//! # Modules
//!
//! - [`fixtures`]: ready-made desired states and matching remote snapshots
//! - [`config`]: [`config::TestConfigDir`] builder for on-disk configuration

pub mod config;
pub mod fixtures;
