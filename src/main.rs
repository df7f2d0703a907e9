mod baseline;
mod compaction;
mod config;
mod monitor;
mod payload;
mod sound;
mod state;
mod status;
mod transcript;

use clap::{Parser, Subcommand};
use config::HookConfig;
use payload::HookPayload;
use sound::SystemPlayer;
use state::FsStateStore;
use tracing_subscriber::EnvFilter;

/// Log filter env var. Logging is off unless set, since hook stderr can
/// surface in the host.
const LOG_ENV: &str = "FAAAAHHH_LOG";

/// Agent host hooks that play a sound when the context window is nearly
/// exhausted, and again when the host compacts it.
///
/// Each hook reads one JSON payload (`session_id`, `transcript_path`) from
/// stdin and always exits successfully.
#[derive(Parser, Debug)]
#[command(name = "faaaahhh", version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log at debug level to stderr (overrides FAAAAHHH_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Hook(Hook),
    /// Print a session's stored state as JSON
    Status {
        /// Session to inspect (default: read a hook payload from stdin)
        session_id: Option<String>,
    },
}

/// Host event hooks. Each reads a payload from stdin.
#[derive(Subcommand, Debug, Clone, Copy)]
enum Hook {
    /// Session start: record the transcript size as the baseline
    InitBaseline,
    /// After each tool use: alert once if the transcript grew past the threshold
    CheckContext,
    /// Before compaction: reset the cycle and always alert
    OnCompact,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout; usage errors stay silent.
            if !e.use_stderr() {
                let _ = e.print();
            }
            return;
        }
    };

    init_tracing(cli.verbose);
    tracing::debug!(?cli, "parsed CLI arguments");

    let config = config::load();
    let store = FsStateStore::new(&config.state_root);

    match cli.command {
        Command::Hook(hook) => {
            let Some(payload) = read_payload() else {
                return;
            };
            run_hook(hook, &store, &config, &payload);
        }
        Command::Status { session_id } => print_status(&store, &config, session_id),
    }
}

fn run_hook(hook: Hook, store: &FsStateStore, config: &HookConfig, payload: &HookPayload) {
    tracing::debug!(
        ?hook,
        session_id = %payload.session_id,
        event = payload.hook_event_name.as_deref().unwrap_or("-"),
        "hook invoked"
    );

    let player = SystemPlayer::new();
    match hook {
        Hook::InitBaseline => {
            if let Err(e) = baseline::init_baseline(store, payload) {
                tracing::debug!(error = %e, "baseline init failed");
            }
        }
        Hook::CheckContext => {
            let outcome = monitor::check_growth(store, &player, config, payload);
            tracing::debug!(?outcome, "context check done");
        }
        Hook::OnCompact => {
            let outcome = compaction::on_compact(store, &player, config, payload);
            tracing::debug!(?outcome, "compaction handled");
        }
    }
}

fn print_status(store: &FsStateStore, config: &HookConfig, session_id: Option<String>) {
    let report = match session_id {
        Some(id) => status::collect(store, config, &id, None),
        None => {
            let Some(payload) = read_payload() else {
                return;
            };
            status::collect(
                store,
                config,
                &payload.session_id,
                payload.transcript_path.as_deref(),
            )
        }
    };
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(error = %e, "failed to serialize status"),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("faaaahhh=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Read the hook payload from stdin. Malformed input ends the invocation.
fn read_payload() -> Option<HookPayload> {
    match HookPayload::from_reader(std::io::stdin().lock()) {
        Ok(p) => Some(p),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring hook invocation");
            None
        }
    }
}
