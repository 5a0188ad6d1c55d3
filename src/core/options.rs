//! Run options
//!
//! The invocation-wide settings derived once from the command line and then
//! passed, read-only, to every package operation of that invocation.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::core::manifest::split_features;

/// Build environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Optimized output
    Production,
    /// Unminified output with dev tooling
    #[default]
    Development,
}

impl Environment {
    /// Name passed to the backends
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(format!(
                "unknown environment '{other}' (expected production or development)"
            )),
        }
    }
}

/// Build variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Standalone application; a polyfill entry is prepended
    App,
    /// Reusable library module
    #[default]
    Module,
}

impl Variant {
    /// Name used on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Module => "module",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" | "application" => Ok(Self::App),
            "module" | "library" | "lib" => Ok(Self::Module),
            other => Err(format!("unknown variant '{other}' (expected app or module)")),
        }
    }
}

/// Raw run-option flags as given on the command line
#[derive(Debug, Clone, Default)]
pub struct RunFlags {
    /// `-p`: production shorthand
    pub production: bool,
    /// `--env`
    pub env: Option<Environment>,
    /// `--variant`
    pub variant: Option<Variant>,
    /// `--app`: application shorthand
    pub app: bool,
    /// `--features a,b`
    pub features: Option<String>,
}

/// Frozen settings of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunOptions {
    environment: Environment,
    variant: Variant,
    features: BTreeSet<String>,
}

impl RunOptions {
    /// Create run options from already-resolved values
    pub fn new(environment: Environment, variant: Variant, features: BTreeSet<String>) -> Self {
        Self {
            environment,
            variant,
            features,
        }
    }

    /// Derive run options from command-line flags
    ///
    /// Explicit options win over the shorthands, which win over the
    /// defaults (development, module, no features).
    pub fn from_flags(flags: &RunFlags) -> Self {
        let environment = flags.env.unwrap_or(if flags.production {
            Environment::Production
        } else {
            Environment::Development
        });

        let variant = flags.variant.unwrap_or(if flags.app {
            Variant::App
        } else {
            Variant::Module
        });

        let features = flags
            .features
            .as_deref()
            .map(|csv| split_features(csv).collect())
            .unwrap_or_default();

        Self {
            environment,
            variant,
            features,
        }
    }

    /// Build environment
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Build variant
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Feature tags enabled for every package of this invocation
    pub fn features(&self) -> &BTreeSet<String> {
        &self.features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RunOptions::from_flags(&RunFlags::default());
        assert_eq!(options.environment(), Environment::Development);
        assert_eq!(options.variant(), Variant::Module);
        assert!(options.features().is_empty());
    }

    #[test]
    fn test_production_flag() {
        let options = RunOptions::from_flags(&RunFlags {
            production: true,
            ..RunFlags::default()
        });
        assert_eq!(options.environment(), Environment::Production);
    }

    #[test]
    fn test_explicit_env_wins_over_flag() {
        let options = RunOptions::from_flags(&RunFlags {
            production: true,
            env: Some(Environment::Development),
            ..RunFlags::default()
        });
        assert_eq!(options.environment(), Environment::Development);
    }

    #[test]
    fn test_app_flag_and_explicit_variant() {
        let app = RunOptions::from_flags(&RunFlags {
            app: true,
            ..RunFlags::default()
        });
        assert_eq!(app.variant(), Variant::App);

        let explicit = RunOptions::from_flags(&RunFlags {
            app: true,
            variant: Some(Variant::Module),
            ..RunFlags::default()
        });
        assert_eq!(explicit.variant(), Variant::Module);
    }

    #[test]
    fn test_feature_list_is_split() {
        let options = RunOptions::from_flags(&RunFlags {
            features: Some("react, flow,,ts".to_string()),
            ..RunFlags::default()
        });
        let features: Vec<_> = options.features().iter().map(String::as_str).collect();
        assert_eq!(features, ["flow", "react", "ts"]);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("library".parse::<Variant>().unwrap(), Variant::Module);
        assert!("staging".parse::<Environment>().is_err());
        assert!("plugin".parse::<Variant>().is_err());
    }
}
