use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Growth-alert threshold override, in transcript bytes.
pub const THRESHOLD_ENV: &str = "FAAAAHHH_THRESHOLD";
/// Plugin install root override; the sound asset lives here.
pub const PLUGIN_ROOT_ENV: &str = "CLAUDE_PLUGIN_ROOT";
/// Optional config file name, looked up in the plugin root.
pub const CONFIG_FILE: &str = "faaaahhh.toml";

/// Default growth threshold.
///
/// The host's context is ~200K tokens. At ~4 bytes/token plus 1.5–2x JSONL
/// overhead, a full window is roughly 1.2–1.6MB of transcript. 500KB of
/// growth is a conservative "nearly full" point. This is a heuristic, not
/// token accounting: it will sometimes fire early and sometimes late.
pub const DEFAULT_THRESHOLD: u64 = 500_000;
pub const DEFAULT_SOUND_FILE: &str = "faaaahhhhhhh.mp3";

/// Resolved settings shared by every hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookConfig {
    /// Alert when transcript growth since baseline exceeds this many bytes.
    pub threshold: u64,
    pub plugin_root: PathBuf,
    /// Parent of the per-session state directories.
    pub state_root: PathBuf,
    /// Sound asset file name, relative to `plugin_root`.
    pub sound_file: String,
}

impl HookConfig {
    /// Full path to the sound asset.
    pub fn sound_path(&self) -> PathBuf {
        self.plugin_root.join(&self.sound_file)
    }
}

/// Contents of `faaaahhh.toml`. Every key is optional.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub threshold: Option<u64>,
    pub sound_file: Option<String>,
    pub state_dir: Option<PathBuf>,
}

/// Errors that can occur while loading the config file.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

/// Read `faaaahhh.toml` from `plugin_root`. A missing file is an empty config.
pub fn load_file_config(plugin_root: &Path) -> Result<FileConfig, ConfigError> {
    let path = plugin_root.join(CONFIG_FILE);
    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(FileConfig::default()),
        Err(e) => return Err(ConfigError::Read { path, source: e }),
    };
    toml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// Resolve config from the process environment.
pub fn load() -> HookConfig {
    resolve(|key| std::env::var(key).ok(), default_plugin_root())
}

/// Layer defaults, the config file, then environment overrides.
///
/// `env` is injected so tests don't mutate the process environment.
pub fn resolve(env: impl Fn(&str) -> Option<String>, default_root: PathBuf) -> HookConfig {
    let plugin_root = env(PLUGIN_ROOT_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or(default_root);

    let file = match load_file_config(&plugin_root) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring config file");
            FileConfig::default()
        }
    };

    // Unparsable or zero falls through to the next layer.
    let threshold = env(THRESHOLD_ENV)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&t| t > 0)
        .or(file.threshold.filter(|&t| t > 0))
        .unwrap_or(DEFAULT_THRESHOLD);

    HookConfig {
        threshold,
        state_root: file.state_dir.unwrap_or_else(std::env::temp_dir),
        sound_file: file
            .sound_file
            .unwrap_or_else(|| DEFAULT_SOUND_FILE.to_string()),
        plugin_root,
    }
}

/// The binary is installed at `<root>/bin/faaaahhh`, so the root is two
/// levels above the executable.
fn default_plugin_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent()?.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
