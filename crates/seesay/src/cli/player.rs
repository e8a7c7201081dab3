//! Audio playback through whatever player the host has installed.

use std::path::Path;

/// A player program plus the arguments that precede the file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

const fn player(program: &'static str, args: &'static [&'static str]) -> PlayerCommand {
    PlayerCommand { program, args }
}

/// Players to try, in order, for the given `std::env::consts::OS` value.
pub fn candidates(os: &str) -> Vec<PlayerCommand> {
    match os {
        "windows" => vec![player("cmd", &["/C", "start", ""])],
        "macos" => vec![player("afplay", &[])],
        _ => vec![
            player("mpv", &["--no-video", "--really-quiet"]),
            player("mplayer", &["-really-quiet"]),
            player("aplay", &["-q"]),
        ],
    }
}

/// Play `path` with the first candidate that exits successfully.
///
/// Returns the program that played the file, or `None` when every candidate
/// failed. Failures are never fatal.
pub async fn play(path: &Path) -> Option<&'static str> {
    for candidate in candidates(std::env::consts::OS) {
        let status = tokio::process::Command::new(candidate.program)
            .args(candidate.args)
            .arg(path)
            .status()
            .await;
        match status {
            Ok(status) if status.success() => {
                tracing::debug!("Played {} with {}", path.display(), candidate.program);
                return Some(candidate.program);
            }
            Ok(status) => tracing::debug!("{} exited with {status}", candidate.program),
            Err(e) => tracing::debug!("{} unavailable: {e}", candidate.program),
        }
    }
    eprintln!("No suitable audio player found. Please play the file manually.");
    None
}
