//! Configuration resolution for aegis-worker

use aegis_common::config::{load_toml_config, resolve_setting};
use aegis_common::Result;
use clap::Parser;
use std::path::PathBuf;

/// Default pretrained model identifier for manipulation detection
const DEFAULT_MODEL: &str = "prithivMLmods/Deep-Fake-Detector-v2-Model";

/// Command-line arguments for aegis-worker
#[derive(Parser, Debug)]
#[command(name = "aegis-worker")]
#[command(about = "Classification worker service for the Aegis verification pipeline")]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8001", env = "AEGIS_WORKER_PORT")]
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

    /// Inference API base URL
    #[arg(long)]
    pub classifier_endpoint: Option<String>,

    /// Pretrained model identifier
    #[arg(long)]
    pub classifier_model: Option<String>,

    /// Inference API key
    #[arg(long)]
    pub classifier_api_key: Option<String>,

    /// Directory for temporary local copies of downloaded objects
    #[arg(long, env = "AEGIS_WORKER_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,
}

/// Resolved worker configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub object_store_endpoint: String,
    pub object_store_bucket: String,
    pub object_store_access_token: Option<String>,
    pub classifier_endpoint: String,
    pub classifier_model: String,
    pub classifier_api_key: Option<String>,
    pub scratch_dir: PathBuf,
}

impl Config {
    /// Merge CLI arguments with ENV and the optional TOML config file
    pub fn resolve(args: &Args) -> Result<Self> {
        let toml = load_toml_config("aegis-worker")?;
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
            classifier_endpoint: resolve_setting(
                args.classifier_endpoint.as_deref(),
                "AEGIS_CLASSIFIER_ENDPOINT",
                toml,
                "classifier_endpoint",
            )
            .unwrap_or_else(|| "https://api-inference.huggingface.co".to_string()),
            classifier_model: resolve_setting(
                args.classifier_model.as_deref(),
                "AEGIS_CLASSIFIER_MODEL",
                toml,
                "classifier_model",
            )
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            classifier_api_key: resolve_setting(
                args.classifier_api_key.as_deref(),
                "AEGIS_CLASSIFIER_API_KEY",
                toml,
                "classifier_api_key",
            ),
            scratch_dir: args
                .scratch_dir
                .clone()
                .unwrap_or_else(|| std::env::temp_dir().join("aegis-worker")),
        })
    }
}
