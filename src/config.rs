//! Runtime configuration: environment first, command-line flags on top.

use std::path::PathBuf;

use clap::Parser;

use crate::adapter::ServerConfig;
use crate::types::{clamp_animation_speed, DEFAULT_ANIMATION_SPEED, DEFAULT_SCRAMBLE_LEN};

/// Terminal 3x3x3 puzzle tutor.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "cube-tutor", version, about)]
pub struct Cli {
    /// Directory for saved cube state and progress [env: CUBE_DATA_DIR]
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Write logs to this file [env: CUBE_LOG_FILE]
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Animation speed multiplier, 0.25 to 4.0 [env: CUBE_ANIMATION_SPEED]
    #[arg(long)]
    pub speed: Option<f32>,

    /// Remote adapter bind address [env: CUBE_AI_HOST]
    #[arg(long)]
    pub ai_host: Option<String>,

    /// Remote adapter port, 0 for any free port [env: CUBE_AI_PORT]
    #[arg(long)]
    pub ai_port: Option<u16>,

    /// Disable the remote adapter [env: CUBE_AI_DISABLED]
    #[arg(long)]
    pub no_ai: bool,

    /// Seed for scrambles (random when unset)
    #[arg(long)]
    pub seed: Option<u32>,

    /// Number of quarter turns in a scramble
    #[arg(long, default_value_t = DEFAULT_SCRAMBLE_LEN)]
    pub scramble_len: usize,

    /// Ignore the saved cube and start solved
    #[arg(long)]
    pub fresh: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    pub animation_speed: f32,
    pub adapter: ServerConfig,
    pub seed: Option<u32>,
    pub scramble_len: usize,
    pub fresh: bool,
}

impl AppConfig {
    pub fn load(cli: Cli) -> Self {
        Self::from_sources(cli, |key| std::env::var(key).ok())
    }

    /// Merge `cli` over values read through `get`.
    pub fn from_sources(cli: Cli, get: impl Fn(&str) -> Option<String>) -> Self {
        let mut adapter = ServerConfig::from_lookup(&get);
        if let Some(host) = cli.ai_host {
            adapter.host = host;
        }
        if let Some(port) = cli.ai_port {
            adapter.port = port;
        }
        adapter.disabled |= cli.no_ai;

        let animation_speed = cli
            .speed
            .or_else(|| get("CUBE_ANIMATION_SPEED").and_then(|s| s.trim().parse().ok()))
            .map(clamp_animation_speed)
            .unwrap_or(DEFAULT_ANIMATION_SPEED);

        let data_dir = cli
            .data_dir
            .or_else(|| non_empty(get("CUBE_DATA_DIR")).map(PathBuf::from))
            .unwrap_or_else(|| default_data_dir(&get));

        let log_file = cli
            .log_file
            .or_else(|| non_empty(get("CUBE_LOG_FILE")).map(PathBuf::from));

        Self {
            data_dir,
            log_file,
            animation_speed,
            adapter,
            seed: cli.seed,
            scramble_len: if cli.scramble_len == 0 {
                DEFAULT_SCRAMBLE_LEN
            } else {
                cli.scramble_len
            },
            fresh: cli.fresh,
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// `$XDG_DATA_HOME/cube-tutor`, then `~/.local/share/cube-tutor`, then a
/// directory under the working directory.
fn default_data_dir(get: &impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(xdg) = non_empty(get("XDG_DATA_HOME")) {
        return PathBuf::from(xdg).join("cube-tutor");
    }
    if let Some(home) = non_empty(get("HOME")) {
        return PathBuf::from(home).join(".local/share/cube-tutor");
    }
    PathBuf::from(".cube-tutor")
}
