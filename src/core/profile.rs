//! Transform profile composition
//!
//! Builds the babel plugin/preset pipeline handed to a backend. Each backend
//! starts from its own base set; toggles add presets where the backend needs
//! them and are no-ops elsewhere. Toggles are idempotent and their order does
//! not change the resulting set.

use serde::Serialize;

use crate::core::manifest::BuildSystem;

/// Babel plugin names
pub mod plugins {
    pub const TRANSFORM_RUNTIME: &str = "@babel/plugin-transform-runtime";
    pub const ADD_MODULE_EXPORTS: &str = "babel-plugin-add-module-exports";
    pub const CLASS_PROPERTIES: &str = "@babel/plugin-proposal-class-properties";
}

/// Babel preset names
pub mod presets {
    pub const ENV: &str = "@babel/preset-env";
    pub const FLOW: &str = "@babel/preset-flow";
    pub const TYPESCRIPT: &str = "@babel/preset-typescript";
    pub const REACT: &str = "@babel/preset-react";
}

/// Browser targets for the env preset
const ENV_TARGETS: &str = "> 0.25%, not dead";

/// A preset, optionally with options (`[name, {..}]` in babel terms)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Preset {
    /// Preset without options
    Name(String),
    /// Preset with options
    Configured(String, serde_json::Value),
}

impl Preset {
    /// Preset name
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Configured(name, _) => name,
        }
    }
}

/// Composed pipeline, consumed by the backend adapter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformProfile {
    pub plugins: Vec<String>,
    pub presets: Vec<Preset>,
}

impl TransformProfile {
    /// Whether nothing is configured
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty() && self.presets.is_empty()
    }

    /// Whether the pipeline contains the preset called `name`
    pub fn has_preset(&self, name: &str) -> bool {
        self.presets.iter().any(|p| p.name() == name)
    }

    /// Whether TypeScript sources can go through this pipeline
    pub fn handles_typescript(&self) -> bool {
        self.has_preset(presets::TYPESCRIPT)
    }
}

/// Source-syntax toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    /// Flow type annotations
    Flow,
    /// TypeScript sources
    TypeScript,
    /// JSX component syntax
    React,
}

impl Toggle {
    /// Map a feature tag to a toggle; unknown tags map to nothing
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "flow" => Some(Self::Flow),
            "typescript" | "ts" => Some(Self::TypeScript),
            "react" | "jsx" => Some(Self::React),
            _ => None,
        }
    }

    fn preset(self) -> &'static str {
        match self {
            Self::Flow => presets::FLOW,
            Self::TypeScript => presets::TYPESCRIPT,
            Self::React => presets::REACT,
        }
    }
}

/// Builder for a backend's [`TransformProfile`]
#[derive(Debug, Clone)]
pub struct ProfileComposer {
    system: BuildSystem,
    profile: TransformProfile,
}

impl ProfileComposer {
    /// Start from the base set of `system`
    pub fn new(system: BuildSystem) -> Self {
        let profile = match system {
            BuildSystem::Webpack => TransformProfile {
                plugins: vec![
                    plugins::TRANSFORM_RUNTIME.to_string(),
                    plugins::ADD_MODULE_EXPORTS.to_string(),
                    plugins::CLASS_PROPERTIES.to_string(),
                ],
                presets: vec![Preset::Configured(
                    presets::ENV.to_string(),
                    serde_json::json!({ "targets": ENV_TARGETS, "modules": "umd" }),
                )],
            },
            BuildSystem::Rollup => TransformProfile::default(),
        };

        Self { system, profile }
    }

    /// Enable a toggle
    #[must_use]
    pub fn toggle(mut self, toggle: Toggle) -> Self {
        match self.system {
            BuildSystem::Webpack => {
                let preset = toggle.preset();
                if !self.profile.has_preset(preset) {
                    self.profile.presets.push(Preset::Name(preset.to_string()));
                }
            }
            BuildSystem::Rollup => {
                tracing::debug!("{toggle:?} has no effect on the rollup backend");
            }
        }
        self
    }

    /// Enable Flow support
    #[must_use]
    pub fn flow(self) -> Self {
        self.toggle(Toggle::Flow)
    }

    /// Enable TypeScript support
    #[must_use]
    pub fn typescript(self) -> Self {
        self.toggle(Toggle::TypeScript)
    }

    /// Enable JSX support
    #[must_use]
    pub fn react(self) -> Self {
        self.toggle(Toggle::React)
    }

    /// Enable every toggle named by a recognized tag
    #[must_use]
    pub fn features<'a, I>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        tags.into_iter()
            .filter_map(Toggle::from_tag)
            .fold(self, Self::toggle)
    }

    /// Finish composition
    pub fn build(self) -> TransformProfile {
        self.profile
    }
}
