//! Default configuration values

/// Manifest file name, relative to the project root
pub const MANIFEST_FILE: &str = "cackle.toml";

/// Directory holding one sub-directory per package
pub const PACKAGES_DIR: &str = "packages";

/// Directory for generated backend configuration
pub const STATE_DIR: &str = ".cackle";

/// Namespace prefix applied to bare package names
pub const DEFAULT_PREFIX: &str = "ckl";

/// Shared static-assets directory served by the dev server
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Dev server port
pub const DEFAULT_DEV_SERVER_PORT: u16 = 8080;

/// Watch debounce window (milliseconds)
pub const DEFAULT_AGGREGATE_TIMEOUT_MS: u64 = 300;

/// How long to wait for a dev server to accept connections
pub const DEV_SERVER_READY_TIMEOUT_SECS: u64 = 60;

/// Entry prepended to application builds
pub const POLYFILL_ENTRY: &str = "@babel/polyfill";

/// Number of trailing output lines kept per stream for error reports
pub const OUTPUT_TAIL_LINES: usize = 5;

/// Tooling installed as dev dependencies by `cackle init`
pub const BASE_TOOLING: &[&str] = &[
    "webpack",
    "webpack-cli",
    "webpack-dev-server",
    "rollup",
    "@rollup/plugin-babel",
    "babel-loader",
    "@babel/core",
    "@babel/polyfill",
    "@babel/preset-env",
    "@babel/preset-flow",
    "@babel/preset-react",
    "@babel/preset-typescript",
    "@babel/plugin-transform-runtime",
    "@babel/plugin-proposal-class-properties",
    "babel-plugin-add-module-exports",
];

/// Runtime dependency installed by `cackle init`
pub const RUNTIME_DEPENDENCY: &str = "@babel/runtime";

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
