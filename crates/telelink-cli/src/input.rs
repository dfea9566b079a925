//! Event file loading.
//!
//! Input is a JSON array of already-normalized `InteractionEvent`s. Unknown
//! fields are rejected.

use crate::error::{CliError, Result};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use telelink_domain::{EventSource, InteractionEvent};

/// Where events come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFile {
    /// A JSON file on disk
    Path(PathBuf),
    /// JSON on standard input
    Stdin,
}

impl EventFile {
    /// `-` means standard input
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            EventFile::Stdin
        } else {
            EventFile::Path(PathBuf::from(arg))
        }
    }

    fn read_text(&self) -> Result<String> {
        match self {
            EventFile::Path(path) => Ok(fs::read_to_string(path)?),
            EventFile::Stdin => {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                Ok(buffer)
            }
        }
    }
}

impl EventSource for EventFile {
    type Error = CliError;

    fn load_events(&self) -> Result<Vec<InteractionEvent>> {
        let events = parse_events(&self.read_text()?)?;
        tracing::debug!(source = ?self, events = events.len(), "events loaded");
        Ok(events)
    }
}

/// Parse a JSON array of events
pub fn parse_events(json: &str) -> Result<Vec<InteractionEvent>> {
    if json.trim().is_empty() {
        return Err(CliError::InvalidInput("event input is empty".to_string()));
    }
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_arg() {
        assert_eq!(EventFile::from_arg("-"), EventFile::Stdin);
        assert_eq!(EventFile::from_arg("cdr.json"), EventFile::Path(PathBuf::from("cdr.json")));
    }

    #[test]
    fn test_load_events_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"subject": "a", "counterpart": "b", "timestamp": "2024-03-01T09:00:00Z", "measure": 60}},
                {{"subject": "a", "timestamp": null, "attribute_value": "470010000000001"}}
            ]"#
        )
        .unwrap();

        let events = EventFile::Path(file.path().to_path_buf()).load_events().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[1].timestamp.is_none());
        assert_eq!(events[1].attribute(), Some("470010000000001"));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(parse_events("  "), Err(CliError::InvalidInput(_))));
        assert!(matches!(parse_events(r#"[{"subject": "a", "msisdn": "x"}]"#), Err(CliError::Serialization(_))));
        assert!(matches!(
            EventFile::Path(PathBuf::from("/nonexistent/events.json")).load_events(),
            Err(CliError::Io(_))
        ));
    }
}
