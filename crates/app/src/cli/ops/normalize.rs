use clap::Args;

use common::prelude::{
    walk, DomainMigration, NormalizeMode, Normalizer, NormalizerConfig, WalkError, WalkReport,
};
use drivefix::drive::DriveError;
use drivefix::state::NormalizeSettings;

use super::finish_walk;

#[derive(Args, Debug, Clone)]
pub struct Normalize {
    /// Node to start from
    #[arg(long)]
    pub root: String,

    /// Domain whose user grants are migrated (overrides the config)
    #[arg(long)]
    pub source_domain: Option<String>,

    /// Domain migrated grants move to (overrides the config)
    #[arg(long)]
    pub target_domain: Option<String>,

    /// Deepest level to normalize, root is 0 (overrides the config)
    #[arg(long)]
    pub depth_cap: Option<usize>,

    /// Make this account the owner of every node before demoting the rest
    #[arg(long)]
    pub transfer_to: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("unable to set up Drive client: {0}")]
    Setup(#[from] DriveError),
    #[error("domain migration needs both a source and a target domain")]
    IncompleteMigration,
    #[error(transparent)]
    Walk(#[from] WalkError),
}

impl Normalize {
    /// Merge the command line with the configured defaults
    pub fn resolve(&self, settings: &NormalizeSettings) -> Result<NormalizerConfig, NormalizeError> {
        let source = self
            .source_domain
            .as_ref()
            .or(settings.source_domain.as_ref());
        let target = self
            .target_domain
            .as_ref()
            .or(settings.target_domain.as_ref());

        let migration = match (source, target) {
            (Some(source), Some(target)) => Some(DomainMigration::new(source, target)),
            (None, None) => None,
            _ => return Err(NormalizeError::IncompleteMigration),
        };

        let mode = match self.transfer_to.as_ref().or(settings.new_owner.as_ref()) {
            Some(new_owner) => NormalizeMode::TransferOwnership {
                new_owner: new_owner.clone(),
            },
            None => NormalizeMode::ReadOnly,
        };

        Ok(NormalizerConfig {
            migration,
            depth_cap: self.depth_cap.or(settings.depth_cap),
            mode,
        })
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Normalize {
    type Error = NormalizeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = self.resolve(&ctx.state.config.normalize)?;
        let client = ctx.client().map_err(|e| {
            tracing::error!("unable to retrieve Drive client: {}", e);
            e
        })?;

        tracing::info!(
            root = %self.root,
            depth_cap = ?config.depth_cap,
            mode = ?config.mode,
            "normalizing permissions"
        );
        let normalizer = Normalizer::new(config);

        let result = walk(&client, &self.root, &normalizer)
            .await
            .map(|report| {
                let summary = summarize(&report);
                if report.is_empty() {
                    summary
                } else {
                    format!("{}\n{}", report, summary)
                }
            });

        Ok(finish_walk_with_summary(result)?)
    }
}

fn finish_walk_with_summary(result: Result<String, WalkError>) -> Result<String, WalkError> {
    match result {
        Ok(output) => Ok(output),
        Err(err) => {
            if let Some(partial) = err.partial() {
                tracing::warn!("{}", summarize(partial));
            }
            finish_walk(Err(err))
        }
    }
}

fn summarize(report: &WalkReport) -> String {
    format!(
        "{} nodes visited, {} changes applied, {} failures",
        report.nodes_visited,
        report.applied().count(),
        report.failures().count()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(root: &str) -> Normalize {
        Normalize {
            root: root.to_string(),
            source_domain: None,
            target_domain: None,
            depth_cap: None,
            transfer_to: None,
        }
    }

    #[test]
    fn test_defaults_are_read_only_everywhere() {
        let config = normalize("n").resolve(&NormalizeSettings::default()).unwrap();
        assert_eq!(config, NormalizerConfig::default());
    }

    #[test]
    fn test_flags_override_settings() {
        let settings = NormalizeSettings {
            source_domain: Some("old.example".to_string()),
            target_domain: Some("new.example".to_string()),
            depth_cap: Some(2),
            new_owner: None,
        };
        let mut op = normalize("n");
        op.source_domain = Some("onlab.us".to_string());
        op.depth_cap = Some(1);
        op.transfer_to = Some("admin@opennetworking.org".to_string());

        let config = op.resolve(&settings).unwrap();
        let migration = config.migration.unwrap();
        assert_eq!(migration.source(), "onlab.us");
        assert_eq!(migration.target(), "new.example");
        assert_eq!(config.depth_cap, Some(1));
        assert_eq!(
            config.mode,
            NormalizeMode::TransferOwnership {
                new_owner: "admin@opennetworking.org".to_string()
            }
        );
    }

    #[test]
    fn test_settings_used_when_flags_absent() {
        let settings = NormalizeSettings {
            source_domain: Some("onlab.us".to_string()),
            target_domain: Some("opennetworking.org".to_string()),
            depth_cap: Some(1),
            new_owner: Some("admin@opennetworking.org".to_string()),
        };
        let config = normalize("n").resolve(&settings).unwrap();
        assert_eq!(
            config.migration,
            Some(DomainMigration::new("onlab.us", "opennetworking.org"))
        );
        assert_eq!(config.depth_cap, Some(1));
        assert!(matches!(config.mode, NormalizeMode::TransferOwnership { .. }));
    }

    #[test]
    fn test_half_a_migration_is_rejected() {
        let mut op = normalize("n");
        op.target_domain = Some("opennetworking.org".to_string());
        assert!(matches!(
            op.resolve(&NormalizeSettings::default()),
            Err(NormalizeError::IncompleteMigration)
        ));
    }

    #[test]
    fn test_summary_counts() {
        let report = WalkReport::new();
        assert_eq!(
            summarize(&report),
            "0 nodes visited, 0 changes applied, 0 failures"
        );
    }
}
