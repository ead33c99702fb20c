//! Command-line arguments.
//!
//! Every flag is optional; anything left unset falls back to the config file,
//! then to built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::config::schema::LogFormat;

#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "s3cache")]
#[command(about = "Local caching proxy in front of an S3 bucket", long_about = None)]
pub struct CliArgs {
    /// TOML configuration file
    #[arg(short, long, env = "S3CACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bucket holding cache objects
    #[arg(short, long)]
    pub bucket: Option<String>,

    /// Region of the bucket
    #[arg(long)]
    pub region: Option<String>,

    /// Custom object store endpoint URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Interface to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Append logs to this file ("-" for stderr, default ~/.s3cache.log)
    #[arg(long)]
    pub log_file: Option<String>,

    /// Log line format (pretty, json)
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Shut down after this many idle minutes (0 disables)
    #[arg(long)]
    pub idle_minutes: Option<u64>,
}
