use clap::Args;

use drivefix::state::{AppConfig, AppState, NormalizeSettings, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Children requested per listing page
    #[arg(long, default_value_t = 100)]
    pub page_size: u32,

    /// Default domain whose user grants `normalize` migrates
    #[arg(long)]
    pub source_domain: Option<String>,

    /// Default domain they are migrated to
    #[arg(long)]
    pub target_domain: Option<String>,

    /// Default deepest level `normalize` visits (root is 0)
    #[arg(long)]
    pub depth_cap: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            api_url: ctx.remote.clone(),
            page_size: self.page_size.max(1),
            normalize: NormalizeSettings {
                source_domain: self.source_domain.clone(),
                target_domain: self.target_domain.clone(),
                depth_cap: self.depth_cap,
                new_owner: None,
            },
            ..AppConfig::default()
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let depth_cap_str = match state.config.normalize.depth_cap {
            Some(cap) => cap.to_string(),
            None => "unbounded".to_string(),
        };

        let output = format!(
            "Initialized drivefix directory at: {}\n\
             - Config: {}\n\
             - API URL: {}\n\
             - Page size: {}\n\
             - Normalize depth cap: {}",
            state.app_dir.display(),
            state.config_path.display(),
            state.config.api_url,
            state.config.page_size,
            depth_cap_str
        );

        Ok(output)
    }
}
