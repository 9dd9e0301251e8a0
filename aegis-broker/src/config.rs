//! Configuration resolution for aegis-broker
//!
//! String-valued settings (endpoints, credentials) resolve CLI → ENV → TOML
//! via aegis-common; numeric settings come straight from clap with an env
//! fallback. Nothing endpoint- or credential-shaped is baked into source.

use aegis_common::config::{load_toml_config, resolve_setting};
use aegis_common::Result;
use clap::Parser;
use std::time::Duration;

/// Command-line arguments for aegis-broker
#[derive(Parser, Debug)]
#[command(name = "aegis-broker")]
#[command(about = "Upload broker service for the Aegis verification pipeline")]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000", env = "AEGIS_BROKER_PORT")]
    pub port: u16,

    /// Object store gateway base URL
    #[arg(long)]
    pub object_store_endpoint: Option<String>,

    /// Object store bucket name
    #[arg(long)]
    pub object_store_bucket: Option<String>,

    /// Object store access token
    #[arg(long)]
    pub object_store_access_token: Option<String>,

    /// Worker service base URL
    #[arg(long)]
    pub worker_url: Option<String>,

    /// Timeout for the worker processing call, in seconds
    #[arg(long, default_value = "300", env = "AEGIS_WORKER_TIMEOUT_SECS")]
    pub worker_timeout_secs: u64,

    /// Narrative LLM chat-completions URL
    #[arg(long)]
    pub narrative_endpoint: Option<String>,

    /// Narrative LLM API key
    #[arg(long)]
    pub narrative_api_key: Option<String>,

    /// Video search API key
    #[arg(long)]
    pub video_api_key: Option<String>,

    /// Region code for the trending video chart
    #[arg(long)]
    pub video_region: Option<String>,
}

/// Resolved broker configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub object_store_endpoint: String,
    pub object_store_bucket: String,
    pub object_store_access_token: Option<String>,
    pub worker_url: String,
    pub worker_timeout: Duration,
    pub narrative_endpoint: Option<String>,
    pub narrative_api_key: Option<String>,
    pub video_api_key: Option<String>,
    pub video_region: String,
}

impl Config {
    /// Merge CLI arguments with ENV and the optional TOML config file
    pub fn resolve(args: &Args) -> Result<Self> {
        let toml = load_toml_config("aegis-broker")?;
        let toml = toml.as_ref();

        Ok(Self {
            port: args.port,
            object_store_endpoint: resolve_setting(
                args.object_store_endpoint.as_deref(),
                "AEGIS_OBJECT_STORE_ENDPOINT",
                toml,
                "object_store_endpoint",
            )
            .unwrap_or_else(|| "http://127.0.0.1:9000".to_string()),
            object_store_bucket: resolve_setting(
                args.object_store_bucket.as_deref(),
                "AEGIS_OBJECT_STORE_BUCKET",
                toml,
                "object_store_bucket",
            )
            .unwrap_or_else(|| "aegis-uploads".to_string()),
            object_store_access_token: resolve_setting(
                args.object_store_access_token.as_deref(),
                "AEGIS_OBJECT_STORE_ACCESS_TOKEN",
                toml,
                "object_store_access_token",
            ),
            worker_url: resolve_setting(
                args.worker_url.as_deref(),
                "AEGIS_WORKER_URL",
                toml,
                "worker_url",
            )
            .unwrap_or_else(|| "http://127.0.0.1:8001".to_string()),
            worker_timeout: Duration::from_secs(args.worker_timeout_secs),
            narrative_endpoint: resolve_setting(
                args.narrative_endpoint.as_deref(),
                "AEGIS_NARRATIVE_ENDPOINT",
                toml,
                "narrative_endpoint",
            ),
            narrative_api_key: resolve_setting(
                args.narrative_api_key.as_deref(),
                "AEGIS_NARRATIVE_API_KEY",
                toml,
                "narrative_api_key",
            ),
            video_api_key: resolve_setting(
                args.video_api_key.as_deref(),
                "AEGIS_VIDEO_API_KEY",
                toml,
                "video_api_key",
            ),
            video_region: resolve_setting(
                args.video_region.as_deref(),
                "AEGIS_VIDEO_REGION",
                toml,
                "video_region",
            )
            .unwrap_or_else(|| "US".to_string()),
        })
    }
}
