//! Cackle - manifest-driven build orchestrator for JavaScript mono repos
//!
//! This library tracks the packages of a workspace in `cackle.toml`, pairs
//! each with a bundler backend (webpack or rollup) and a transform profile,
//! and drives builds, watches and dev servers across many packages at once.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Manifest, profiles, builders and command dispatch
//! - [`registry`] - Package registry client (npm)
//! - [`infra`] - Infrastructure layer (processes, filesystem, network)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
pub mod registry;
