pub mod init;
pub mod list;
pub mod normalize;

pub use init::Init;
pub use list::List;
pub use normalize::Normalize;

use common::prelude::{WalkError, WalkReport};

/// Render a finished walk for the terminal.
///
/// A root that cannot be fetched is reported as ordinary output. A failed
/// listing prints whatever was done before the failure and then fails.
pub(crate) fn finish_walk(result: Result<WalkReport, WalkError>) -> Result<String, WalkError> {
    match result {
        Ok(report) => Ok(report.to_string()),
        Err(err @ WalkError::Fetch { .. }) => Ok(err.to_string()),
        Err(err) => {
            if let Some(partial) = err.partial() {
                if !partial.is_empty() {
                    println!("{}", partial);
                }
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::prelude::TreeError;

    #[test]
    fn test_fetch_failure_is_output() {
        let result = Err(WalkError::Fetch {
            id: "missing".to_string(),
            source: TreeError::NotFound("missing".to_string()),
        });
        let output = finish_walk(result).unwrap();
        assert!(output.contains("missing"));
    }

    #[test]
    fn test_listing_failure_is_error() {
        let result = Err(WalkError::Listing {
            parent_id: "root".to_string(),
            depth: 1,
            source: TreeError::Transport("connection reset".to_string()),
            partial: Box::default(),
        });
        assert!(matches!(
            finish_walk(result),
            Err(WalkError::Listing { .. })
        ));
    }
}
