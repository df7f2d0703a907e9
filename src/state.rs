/// Per-session state shared by the hooks: the transcript-size `baseline`
/// and the `played` alert gate.
///
/// Each hook is a separate short-lived process, so state lives on disk under
/// the temp dir: `<root>/faaaahhh-<session_id>/{baseline,played}`. Writes are
/// last-writer-wins; a race only costs an extra or missed alert.
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Prefix of every session state directory name.
pub const STATE_DIR_PREFIX: &str = "faaaahhh-";

const BASELINE_FILE: &str = "baseline";
const PLAYED_FILE: &str = "played";

/// Errors that can occur while touching session state.
#[derive(Debug)]
pub enum StateError {
    /// A filesystem operation on a state path failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::Io { path, source } => {
                write!(f, "state I/O error at {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for StateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StateError::Io { source, .. } => Some(source),
        }
    }
}

/// Key/value session state used by the hooks.
///
/// `clear_played` and `ensure` are idempotent and must succeed when there is
/// nothing to do.
pub trait StateStore {
    /// Create the session's state location if absent.
    fn ensure(&self, session_id: &str) -> Result<(), StateError>;

    /// Baseline transcript size, or `None` if never written.
    fn read_baseline(&self, session_id: &str) -> Result<Option<u64>, StateError>;

    fn write_baseline(&self, session_id: &str, size: u64) -> Result<(), StateError>;

    /// Whether an alert already fired in the current cycle.
    fn has_played(&self, session_id: &str) -> bool;

    fn mark_played(&self, session_id: &str) -> Result<(), StateError>;

    fn clear_played(&self, session_id: &str) -> Result<(), StateError>;
}

/// Filesystem-backed state rooted in a temp-files directory.
#[derive(Debug, Clone)]
pub struct FsStateStore {
    root: PathBuf,
}

impl FsStateStore {
    /// Create a store rooted at `root` (normally `std::env::temp_dir()`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding one session's state files.
    pub fn session_dir(&self, session_id: &str) -> PathBuf {
        self.root
            .join(format!("{STATE_DIR_PREFIX}{}", sanitize_session_id(session_id)))
    }

    fn baseline_path(&self, session_id: &str) -> PathBuf {
        self.session_dir(session_id).join(BASELINE_FILE)
    }

    fn played_path(&self, session_id: &str) -> PathBuf {
        self.session_dir(session_id).join(PLAYED_FILE)
    }

    /// When the current cycle's alert fired, if it did and the stamp parses.
    pub fn played_at(&self, session_id: &str) -> Option<DateTime<Utc>> {
        let raw = std::fs::read_to_string(self.played_path(session_id)).ok()?;
        DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

impl StateStore for FsStateStore {
    fn ensure(&self, session_id: &str) -> Result<(), StateError> {
        let dir = self.session_dir(session_id);
        std::fs::create_dir_all(&dir).map_err(|e| StateError::Io {
            path: dir,
            source: e,
        })
    }

    fn read_baseline(&self, session_id: &str) -> Result<Option<u64>, StateError> {
        let path = self.baseline_path(session_id);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(parse_baseline(&contents))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StateError::Io { path, source: e }),
        }
    }

    fn write_baseline(&self, session_id: &str, size: u64) -> Result<(), StateError> {
        let path = self.baseline_path(session_id);
        std::fs::write(&path, size.to_string()).map_err(|e| StateError::Io { path, source: e })
    }

    fn has_played(&self, session_id: &str) -> bool {
        self.played_path(session_id).exists()
    }

    fn mark_played(&self, session_id: &str) -> Result<(), StateError> {
        let path = self.played_path(session_id);
        std::fs::write(&path, Utc::now().to_rfc3339())
            .map_err(|e| StateError::Io { path, source: e })
    }

    fn clear_played(&self, session_id: &str) -> Result<(), StateError> {
        let path = self.played_path(session_id);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateError::Io { path, source: e }),
        }
    }
}

/// Parse a stored baseline. Garbage reads as 0.
fn parse_baseline(contents: &str) -> u64 {
    contents.trim().parse().unwrap_or(0)
}

/// Map a host session id onto a single safe path component.
fn sanitize_session_id(session_id: &str) -> String {
    session_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
pub use memory::MemoryStateStore;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_dir_layout() {
        let store = FsStateStore::new("/tmp");
        assert_eq!(
            store.session_dir("abc-123"),
            PathBuf::from("/tmp/faaaahhh-abc-123")
        );
        assert_eq!(
            store.baseline_path("abc-123"),
            PathBuf::from("/tmp/faaaahhh-abc-123/baseline")
        );
        assert_eq!(
            store.played_path("abc-123"),
            PathBuf::from("/tmp/faaaahhh-abc-123/played")
        );
    }

    #[test]
    fn test_session_id_cannot_escape_root() {
        let store = FsStateStore::new("/tmp");
        assert_eq!(
            store.session_dir("../../etc/passwd"),
            PathBuf::from("/tmp/faaaahhh-______etc_passwd")
        );
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsStateStore::new(tmp.path());
        store.ensure("s1").unwrap();
        store.ensure("s1").unwrap();
        assert!(store.session_dir("s1").is_dir());
    }

    #[test]
    fn test_baseline_absent_until_written() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsStateStore::new(tmp.path());
        store.ensure("s1").unwrap();
        assert_eq!(store.read_baseline("s1").unwrap(), None);

        store.write_baseline("s1", 1_000_000).unwrap();
        assert_eq!(store.read_baseline("s1").unwrap(), Some(1_000_000));

        // Text-encoded integer on disk
        let raw = std::fs::read_to_string(store.baseline_path("s1")).unwrap();
        assert_eq!(raw, "1000000");
    }

    #[test]
    fn test_baseline_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsStateStore::new(tmp.path());
        store.ensure("s1").unwrap();
        store.write_baseline("s1", 10).unwrap();
        store.write_baseline("s1", 20).unwrap();
        assert_eq!(store.read_baseline("s1").unwrap(), Some(20));
    }

    #[test]
    fn test_baseline_without_ensure_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsStateStore::new(tmp.path());
        let err = store.write_baseline("never-ensured", 5).unwrap_err();
        assert!(err.to_string().contains("state I/O error"));
    }

    #[test]
    fn test_parse_baseline_tolerates_whitespace_and_garbage() {
        assert_eq!(parse_baseline("  42\n"), 42);
        assert_eq!(parse_baseline("not-a-number"), 0);
        assert_eq!(parse_baseline(""), 0);
        assert_eq!(parse_baseline("-5"), 0);
    }

    #[test]
    fn test_played_lifecycle() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsStateStore::new(tmp.path());
        store.ensure("s1").unwrap();

        assert!(!store.has_played("s1"));
        assert!(store.played_at("s1").is_none());

        store.mark_played("s1").unwrap();
        assert!(store.has_played("s1"));
        assert!(store.played_at("s1").is_some());

        store.clear_played("s1").unwrap();
        assert!(!store.has_played("s1"));
    }

    #[test]
    fn test_clear_played_when_already_clear() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsStateStore::new(tmp.path());
        store.ensure("s1").unwrap();
        store.clear_played("s1").unwrap();
        store.clear_played("s1").unwrap();
        assert!(!store.has_played("s1"));
    }

    #[test]
    fn test_played_content_is_irrelevant() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsStateStore::new(tmp.path());
        store.ensure("s1").unwrap();
        std::fs::write(store.played_path("s1"), "1700000000000").unwrap();
        assert!(store.has_played("s1"));
        assert!(store.played_at("s1").is_none());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsStateStore::new(tmp.path());
        store.ensure("a").unwrap();
        store.ensure("b").unwrap();
        store.write_baseline("a", 1).unwrap();
        store.mark_played("a").unwrap();

        assert_eq!(store.read_baseline("b").unwrap(), None);
        assert!(!store.has_played("b"));
    }

    #[test]
    fn test_memory_store_matches_fs_semantics() {
        let store = MemoryStateStore::new();
        assert!(!store.contains("s1"));
        store.ensure("s1").unwrap();
        assert!(store.contains("s1"));
        assert_eq!(store.read_baseline("s1").unwrap(), None);
        store.write_baseline("s1", 7).unwrap();
        assert_eq!(store.read_baseline("s1").unwrap(), Some(7));
        store.clear_played("s1").unwrap();
        store.mark_played("s1").unwrap();
        assert!(store.has_played("s1"));
        store.clear_played("s1").unwrap();
        assert!(!store.has_played("s1"));
    }
}
