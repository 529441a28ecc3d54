use clap::Args;

use common::prelude::{walk, Lister, WalkError};
use drivefix::drive::DriveError;

use super::finish_walk;

#[derive(Args, Debug, Clone)]
pub struct List {
    /// Deepest level to print (root is 0)
    #[arg(long, short = 'd')]
    pub max_depth: usize,

    /// Node to start from. `root` is the top of My Drive.
    #[arg(long, default_value = "root")]
    pub root: String,

    /// Character repeated once per level to indent each line
    #[arg(long, default_value_t = '-')]
    pub marker: char,
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("unable to set up Drive client: {0}")]
    Setup(#[from] DriveError),
    #[error(transparent)]
    Walk(#[from] WalkError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for List {
    type Error = ListError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let client = ctx.client().map_err(|e| {
            tracing::error!("unable to retrieve Drive client: {}", e);
            e
        })?;

        let lister = Lister::new(self.max_depth).with_marker(self.marker);
        tracing::debug!(root = %self.root, max_depth = self.max_depth, "listing tree");

        Ok(finish_walk(walk(&client, &self.root, &lister).await)?)
    }
}
