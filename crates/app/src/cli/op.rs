use std::error::Error;
use std::path::PathBuf;

use url::Url;

use drivefix::drive::{DriveClient, DriveError};
use drivefix::state::{AppState, StateError};

#[derive(Debug, Clone)]
pub struct OpContext {
    /// Loaded (or default) configuration
    pub state: AppState,
    /// Drive API base URL
    pub remote: Url,
    /// Optional custom config path (defaults to ~/.drivefix)
    pub config_path: Option<PathBuf>,
    /// Token from the command line or environment, preferred over the config file
    token: Option<String>,
}

impl OpContext {
    /// Load configuration and apply command line overrides
    pub fn new(
        remote: Option<Url>,
        token: Option<String>,
        config_path: Option<PathBuf>,
    ) -> Result<Self, StateError> {
        let state = AppState::load_or_default(config_path.clone())?;
        let remote = remote.unwrap_or_else(|| state.config.api_url.clone());
        Ok(Self {
            state,
            remote,
            config_path,
            token,
        })
    }

    /// Build the Drive client. Fails when no token is available.
    pub fn client(&self) -> Result<DriveClient, DriveError> {
        let token = self
            .token
            .as_deref()
            .or(self.state.config.access_token.as_deref())
            .ok_or(DriveError::MissingToken)?;
        DriveClient::new(&self.remote, token, self.state.config.page_size)
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_remote_wins() {
        let temp = tempfile::tempdir().unwrap();
        let explicit = Url::parse("http://localhost:9999/drive/v3/").unwrap();
        let ctx = OpContext::new(Some(explicit.clone()), None, Some(temp.path().to_path_buf()))
            .unwrap();
        assert_eq!(ctx.remote, explicit);
    }

    #[test]
    fn test_remote_falls_back_to_config() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = OpContext::new(None, None, Some(temp.path().to_path_buf())).unwrap();
        assert_eq!(ctx.remote, ctx.state.config.api_url);
    }

    #[test]
    fn test_client_needs_token() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = OpContext::new(None, None, Some(temp.path().to_path_buf())).unwrap();
        assert!(matches!(ctx.client(), Err(DriveError::MissingToken)));

        let ctx = OpContext::new(
            None,
            Some("token".to_string()),
            Some(temp.path().to_path_buf()),
        )
        .unwrap();
        assert!(ctx.client().is_ok());
    }

    #[test]
    fn test_config_token_used_when_not_given() {
        let temp = tempfile::tempdir().unwrap();
        let mut config = drivefix::state::AppConfig::default();
        config.access_token = Some("from-config".to_string());
        AppState::init(Some(temp.path().to_path_buf()), Some(config)).unwrap();

        let ctx = OpContext::new(None, None, Some(temp.path().to_path_buf())).unwrap();
        assert!(ctx.client().is_ok());
    }
}
