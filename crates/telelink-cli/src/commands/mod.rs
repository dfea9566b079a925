//! Command implementations.
//!
//! Each command loads its events and runs one engine query on a blocking
//! worker. The rendered output comes back whole; nothing is streamed.

pub mod chains;
pub mod changes;
pub mod config;
pub mod links;
pub mod locations;

pub use self::chains::execute_chains;
pub use self::changes::{execute_changes, execute_companions};
pub use self::config::execute_config;
pub use self::links::{execute_frequent, execute_links};
pub use self::locations::{execute_locations, execute_relocation};

use crate::error::Result;
use crate::input::EventFile;
use telelink_domain::{EventSource, InteractionEvent};

/// Load events and run `job` over them on the blocking pool.
pub(crate) async fn run_query<F>(source: EventFile, job: F) -> Result<String>
where
    F: FnOnce(&[InteractionEvent]) -> Result<String> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let events = source.load_events()?;
        tracing::debug!(events = events.len(), "running query");
        job(&events)
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_run_query_sees_loaded_events() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"subject": "a"}}, {{"subject": "b"}}]"#).unwrap();

        let source = EventFile::Path(file.path().to_path_buf());
        let output = run_query(source, |events| Ok(events.len().to_string())).await.unwrap();
        assert_eq!(output, "2");
    }

    #[tokio::test]
    async fn test_run_query_propagates_load_errors() {
        let source = EventFile::Path("/nonexistent/events.json".into());
        let result = run_query(source, |_| Ok(String::new())).await;
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
