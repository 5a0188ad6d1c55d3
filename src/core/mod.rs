//! Core business logic module
//!
//! Process spawning, filesystem and network helpers live in
//! [`crate::infra`]; this module decides what to run and when.
//!
//! # Submodules
//!
//! - [`manifest`] - Manifest (cackle.toml) model and store
//! - [`options`] - Run options of one invocation
//! - [`profile`] - Transform profile composition
//! - [`builder`] - Builder abstraction and backend selection
//! - [`webpack`] - Webpack backend adapter
//! - [`rollup`] - Rollup backend adapter
//! - [`package`] - Package runtime
//! - [`dispatch`] - Command dispatch and fan-out
//! - [`init`] - Project initialization logic
//! - [`create`] - Package creation logic
//! - [`tree`] - Directory tree scaffolding
//! - [`workspace`] - Workspace layout
//! - [`global_config`] - Global configuration

pub mod builder;
pub mod create;
pub mod dispatch;
pub mod global_config;
pub mod init;
pub mod manifest;
pub mod options;
pub mod package;
pub mod profile;
pub mod rollup;
pub mod tree;
pub mod webpack;
pub mod workspace;
