pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "drivefix", version)]
#[command(about = "List a Drive tree or normalize its sharing permissions")]
pub struct Args {
    /// Drive API base URL (defaults to the configured api_url)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// OAuth bearer token for the Drive API
    #[arg(long, global = true, env = "DRIVEFIX_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to the drivefix config directory (defaults to ~/.drivefix)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}
