use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use pubframe::{MissingPolicy, OptimizeOptions, MISSING_SENTINEL};
use pubstats::{ChartColors, StatsError, DEFAULT_DATA_PATH};

pub const DEFAULT_PRIMARY: &str = "#ff4b4b";
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed secrets file: {0}")]
    Secrets(#[from] serde_path_to_error::Error<serde_json::Error>),

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error("tls needs both a certificate and a key")]
    PartialTls,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Publication statistics dashboard")]
pub struct Args {
    /// Publication table (.parquet, .csv or .csv.gz)
    #[arg(long, env = "PUBDASH_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// JSON file of the form {"passwords": {"user": "password"}}. Without it
    /// the dashboard is served ungated.
    #[arg(long, env = "PUBDASH_SECRETS")]
    pub secrets: Option<PathBuf>,

    #[arg(long, env = "PUBDASH_ADDR", default_value = "127.0.0.1:3038")]
    pub addr: SocketAddr,

    /// Narrow column types after loading
    #[arg(long, env = "PUBDASH_OPTIMIZE", default_value_t = false)]
    pub optimize: bool,

    /// Keep missing floats missing when optimizing instead of filling them with 999999
    #[arg(long, default_value_t = false)]
    pub keep_missing: bool,

    /// Bar color; setting this or the background switches charts to the theme colors
    #[arg(long, env = "PUBDASH_PRIMARY_COLOR")]
    pub primary_color: Option<String>,

    #[arg(long, env = "PUBDASH_BACKGROUND_COLOR")]
    pub background_color: Option<String>,

    #[arg(long, env = "PUBDASH_TLS_CERT")]
    pub tls_cert: Option<PathBuf>,

    #[arg(long, env = "PUBDASH_TLS_KEY")]
    pub tls_key: Option<PathBuf>,
}

impl Args {
    pub fn optimize_options(&self) -> Option<OptimizeOptions> {
        if !self.optimize {
            return None;
        }
        let missing = if self.keep_missing {
            MissingPolicy::KeepNull
        } else {
            MissingPolicy::Sentinel(MISSING_SENTINEL)
        };
        Some(OptimizeOptions { missing })
    }

    pub fn chart_colors(&self) -> ChartColors {
        match (&self.primary_color, &self.background_color) {
            (None, None) => ChartColors::Fixed,
            (p, b) => ChartColors::Theme {
                primary: p.clone().unwrap_or_else(|| DEFAULT_PRIMARY.to_string()),
                background: b.clone().unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
            },
        }
    }

    pub fn tls_pair(&self) -> Result<Option<(PathBuf, PathBuf)>, ConfigError> {
        match (&self.tls_cert, &self.tls_key) {
            (Some(c), Some(k)) => Ok(Some((c.clone(), k.clone()))),
            (None, None) => Ok(None),
            _ => Err(ConfigError::PartialTls),
        }
    }
}
