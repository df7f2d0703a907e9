/// Hook payload: the JSON object the host writes to a hook's stdin.
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;

/// Fields consumed from a hook invocation. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct HookPayload {
    pub session_id: String,
    /// Missing paths are treated like unreadable transcripts.
    #[serde(default)]
    pub transcript_path: Option<PathBuf>,
    /// Host event name (e.g. "PostToolUse"). Only used for logging.
    #[serde(default)]
    pub hook_event_name: Option<String>,
    /// Compaction trigger ("auto" or "manual"). Only used for logging.
    #[serde(default)]
    pub trigger: Option<String>,
}

/// Errors produced while reading a hook payload.
#[derive(Debug)]
pub enum PayloadError {
    /// Failed to read stdin to completion.
    Read { source: std::io::Error },
    /// Input was not a JSON object with a string `session_id`.
    Parse { source: serde_json::Error },
    /// `session_id` was present but empty.
    EmptySessionId,
}

impl std::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadError::Read { source } => write!(f, "failed to read hook payload: {}", source),
            PayloadError::Parse { source } => {
                write!(f, "failed to parse hook payload: {}", source)
            }
            PayloadError::EmptySessionId => write!(f, "hook payload has an empty session_id"),
        }
    }
}

impl std::error::Error for PayloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PayloadError::Read { source } => Some(source),
            PayloadError::Parse { source } => Some(source),
            PayloadError::EmptySessionId => None,
        }
    }
}

impl HookPayload {
    /// Parse a payload from a JSON string.
    pub fn from_json(input: &str) -> Result<Self, PayloadError> {
        let payload: HookPayload =
            serde_json::from_str(input).map_err(|e| PayloadError::Parse { source: e })?;
        if payload.session_id.is_empty() {
            return Err(PayloadError::EmptySessionId);
        }
        Ok(payload)
    }

    /// Read the reader to end-of-stream and parse the result.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, PayloadError> {
        let mut input = String::new();
        reader
            .read_to_string(&mut input)
            .map_err(|e| PayloadError::Read { source: e })?;
        Self::from_json(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_minimal_payload() {
        let p = HookPayload::from_json(
            r#"{"session_id":"abc-123","transcript_path":"/tmp/t.jsonl"}"#,
        )
        .unwrap();
        assert_eq!(p.session_id, "abc-123");
        assert_eq!(p.transcript_path, Some(PathBuf::from("/tmp/t.jsonl")));
        assert!(p.hook_event_name.is_none());
    }

    #[test]
    fn test_ignores_unknown_fields() {
        let p = HookPayload::from_json(
            r#"{
                "session_id": "s1",
                "transcript_path": "/tmp/t.jsonl",
                "cwd": "/home/user/project",
                "hook_event_name": "PreCompact",
                "trigger": "auto",
                "custom_instructions": ""
            }"#,
        )
        .unwrap();
        assert_eq!(p.hook_event_name.as_deref(), Some("PreCompact"));
        assert_eq!(p.trigger.as_deref(), Some("auto"));
    }

    #[test]
    fn test_missing_transcript_path_is_none() {
        let p = HookPayload::from_json(r#"{"session_id":"s1"}"#).unwrap();
        assert!(p.transcript_path.is_none());
    }

    #[test]
    fn test_missing_session_id_is_error() {
        let err = HookPayload::from_json(r#"{"transcript_path":"/tmp/t.jsonl"}"#).unwrap_err();
        assert!(matches!(err, PayloadError::Parse { .. }));
    }

    #[test]
    fn test_empty_session_id_is_error() {
        let err = HookPayload::from_json(r#"{"session_id":""}"#).unwrap_err();
        assert!(matches!(err, PayloadError::EmptySessionId));
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(HookPayload::from_json("not json").is_err());
        assert!(HookPayload::from_json("").is_err());
        assert!(HookPayload::from_json("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_from_reader_reads_to_end() {
        let input = br#"{"session_id":"from-reader"}"#;
        let p = HookPayload::from_reader(&input[..]).unwrap();
        assert_eq!(p.session_id, "from-reader");
    }
}
