//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};

/// GeoDrop - leave audio clips where you stand
#[derive(Parser, Debug)]
#[command(name = "geodrop")]
#[command(version)]
#[command(about = "Record location-tagged audio drops and play them back")]
#[command(long_about = None)]
pub struct Cli {
    /// Override the drop store directory
    #[arg(long, global = true, value_name = "DIR", env = "GEODROP_DATA_DIR")]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a new drop at the current position (Enter stops, Ctrl-C cancels)
    Record {
        /// Display name attached to the drop
        #[arg(short, long, value_name = "NAME")]
        owner: Option<String>,

        /// Note attached to the drop
        #[arg(short, long, value_name = "TEXT")]
        note: Option<String>,

        /// Latitude override for this invocation
        #[arg(long, value_name = "DEG", requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude override for this invocation
        #[arg(long, value_name = "DEG", requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// List all stored drops, newest first
    List,

    /// Play a drop by id (a unique prefix is enough)
    Play {
        /// Drop id or id prefix
        id: String,
    },

    /// List drops within a radius of a position
    Nearby {
        #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
        lon: f64,

        /// Search radius in meters
        #[arg(short, long, value_name = "METERS", default_value_t = 100.0)]
        radius: f64,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "owner",
    "latitude",
    "longitude",
    "location_enabled",
    "data_dir",
    "map_span",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
