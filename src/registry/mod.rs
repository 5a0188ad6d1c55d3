//! Package registry client
//!
//! Shells out to the registry client (npm by default) to link, pack and
//! install packages.

pub mod client;

pub use client::{InstallOptions, RegistryClient};
