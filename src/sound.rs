/// Fire-and-forget sound playback through an external player program.
///
/// Hooks exit right after requesting playback, so the player is spawned
/// detached (own process group, null stdio) and never waited on.
use std::path::Path;
use std::process::{Command, Stdio};

/// Plays a sound asset. Never blocks and never reports failure.
pub trait AudioPlayer {
    fn play(&self, asset: &Path);
}

/// One candidate player invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl PlayerCommand {
    fn new(program: &str, args: &[&str], asset: &Path) -> Self {
        let mut args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        args.push(asset.to_string_lossy().into_owned());
        Self {
            program: program.to_string(),
            args,
        }
    }
}

/// Platform families with distinct player strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            _ => Platform::Other,
        }
    }
}

/// Player commands for `platform`, in preference order.
pub fn candidates(platform: Platform, asset: &Path) -> Vec<PlayerCommand> {
    match platform {
        Platform::MacOs => vec![PlayerCommand::new("afplay", &[], asset)],
        Platform::Windows => vec![PlayerCommand {
            program: "powershell".to_string(),
            args: vec![
                "-NoProfile".to_string(),
                "-Command".to_string(),
                powershell_script(asset),
            ],
        }],
        Platform::Other => vec![
            PlayerCommand::new("mpv", &["--no-video", "--really-quiet"], asset),
            PlayerCommand::new(
                "ffplay",
                &["-nodisp", "-autoexit", "-loglevel", "quiet"],
                asset,
            ),
            PlayerCommand::new("cvlc", &["--play-and-exit", "--quiet"], asset),
            PlayerCommand::new("paplay", &[], asset),
        ],
    }
}

/// MediaPlayer plays asynchronously, so the script sleeps to keep the
/// process alive long enough to finish the clip.
fn powershell_script(asset: &Path) -> String {
    let quoted = asset.to_string_lossy().replace('\'', "''");
    [
        "Add-Type -AssemblyName presentationCore;",
        "$p = New-Object System.Windows.Media.MediaPlayer;",
        &format!("$p.Open([Uri]'{quoted}');"),
        "$p.Play();",
        "Start-Sleep -Seconds 10",
    ]
    .join(" ")
}

/// Starts a player process.
pub trait Launcher {
    /// Spawn `cmd` without waiting. `Err` means the program could not start.
    fn launch(&self, cmd: &PlayerCommand) -> std::io::Result<()>;
}

/// Spawns real, detached child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedLauncher;

impl Launcher for DetachedLauncher {
    fn launch(&self, cmd: &PlayerCommand) -> std::io::Result<()> {
        let mut command = Command::new(&cmd.program);
        command
            .args(&cmd.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        detach(&mut command);

        // The Child handle is dropped without waiting; playback outlives us.
        let child = command.spawn()?;
        tracing::debug!(program = %cmd.program, pid = child.id(), "player started");
        Ok(())
    }
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    // New process group so the host's group signals don't cut playback off.
    command.process_group(0);
}

#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(DETACHED_PROCESS | CREATE_NO_WINDOW);
}

#[cfg(not(any(unix, windows)))]
fn detach(_command: &mut Command) {}

/// Plays sounds by launching the first available platform player.
pub struct SystemPlayer<L: Launcher = DetachedLauncher> {
    platform: Platform,
    launcher: L,
}

impl SystemPlayer {
    pub fn new() -> Self {
        Self::with_launcher(Platform::current(), DetachedLauncher)
    }
}

impl Default for SystemPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Launcher> SystemPlayer<L> {
    pub fn with_launcher(platform: Platform, launcher: L) -> Self {
        Self { platform, launcher }
    }

    /// Try candidates in order; stop at the first one that spawns.
    ///
    /// Only spawn failures (missing binary, permissions) move on to the next
    /// candidate. A player that starts and then fails is not detected.
    fn launch_first(&self, asset: &Path) -> Option<PlayerCommand> {
        for cmd in candidates(self.platform, asset) {
            match self.launcher.launch(&cmd) {
                Ok(()) => return Some(cmd),
                Err(e) => {
                    tracing::debug!(
                        program = %cmd.program,
                        error = %e,
                        "player failed to launch, trying next"
                    );
                }
            }
        }
        None
    }
}

impl<L: Launcher> AudioPlayer for SystemPlayer<L> {
    fn play(&self, asset: &Path) {
        if !asset.exists() {
            tracing::debug!(asset = %asset.display(), "sound asset missing, skipping");
            return;
        }
        match self.launch_first(asset) {
            Some(cmd) => tracing::info!(program = %cmd.program, "playing alert"),
            None => tracing::debug!("no audio player could be launched"),
        }
    }
}

/// Records play requests instead of making noise.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingPlayer {
    pub played: std::cell::RefCell<Vec<std::path::PathBuf>>,
}

#[cfg(test)]
impl RecordingPlayer {
    pub fn count(&self) -> usize {
        self.played.borrow().len()
    }
}

#[cfg(test)]
impl AudioPlayer for RecordingPlayer {
    fn play(&self, asset: &Path) {
        self.played.borrow_mut().push(asset.to_path_buf());
    }
}
