//! The `seesay describe` command: one image in, description and audio out.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use dialoguer::Confirm;
use seesay_core::{cleanup_old_files, CleanupReport, Config, Narrator, SpeechRate};

use super::player;

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Image file to describe
    pub image: PathBuf,

    /// Vision model to use (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Voice for speech synthesis
    #[arg(long)]
    pub voice: Option<String>,

    /// Speech rate as a signed percentage, e.g. +25% or -10%
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Option<SpeechRate>,

    /// Delete generated audio and uploads older than the retention window
    #[arg(long)]
    pub cleanup: bool,

    /// Never offer to play the audio
    #[arg(long)]
    pub no_play: bool,
}

impl DescribeArgs {
    /// Fold per-invocation overrides into the loaded config.
    fn apply(&self, config: &mut Config) {
        if let Some(voice) = &self.voice {
            config.speech.voice = voice.clone();
        }
        if let Some(rate) = self.rate {
            config.speech.rate = rate;
        }
    }
}

pub async fn execute(args: DescribeArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply(&mut config);
    config.ensure_dirs()?;

    let narrator = Narrator::from_config(&config, args.model.as_deref())?;
    if !narrator.describer().is_available().await {
        tracing::warn!(
            "Vision provider '{}' is not reachable; the request will likely fail",
            narrator.describer().provider_name()
        );
    }

    tracing::info!("Processing image: {}", args.image.display());
    let spinner = create_spinner("Describing image...");
    let result = narrator.narrate_file(&args.image).await;
    spinner.finish_and_clear();

    let narration = result.map_err(|e| {
        tracing::error!("Error processing image: {e}");
        e
    })?;

    println!("\nDescription: {}", narration.description);
    println!("Audio saved to: {}", narration.audio.path.display());
    if narration.audio.fallback {
        tracing::info!("Spoken with fallback voice {}", narration.audio.voice);
    }

    if !args.no_play && console::user_attended() {
        let play = Confirm::new()
            .with_prompt("Play audio now?")
            .default(false)
            .interact_opt()?;
        if play == Some(true) {
            player::play(&narration.audio.path).await;
        }
    }

    if args.cleanup {
        let report = cleanup(&config);
        tracing::info!(
            "Cleanup removed {} files ({} failed)",
            report.removed,
            report.failed
        );
    }

    Ok(())
}

/// Sweep both generated-file directories.
fn cleanup(config: &Config) -> CleanupReport {
    let max_age = config.retention();
    let mut report = cleanup_old_files(&config.audio_dir(), max_age);
    report += cleanup_old_files(&config.upload_dir(), max_age);
    report
}

fn create_spinner(message: &str) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::time::SystemTime;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: DescribeArgs,
    }

    fn parse(argv: &[&str]) -> DescribeArgs {
        Harness::try_parse_from(std::iter::once("seesay").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_parse_all_flags() {
        let args = parse(&[
            "mug.jpg", "--model", "llava:13b", "--voice", "en-US-JennyNeural", "--rate", "-10%",
            "--cleanup", "--no-play",
        ]);
        assert_eq!(args.image, PathBuf::from("mug.jpg"));
        assert_eq!(args.model.as_deref(), Some("llava:13b"));
        assert_eq!(args.rate.unwrap().percent(), -10);
        assert!(args.cleanup);
        assert!(args.no_play);
    }

    #[test]
    fn test_malformed_rate_is_rejected() {
        let result = Harness::try_parse_from(["seesay", "mug.jpg", "--rate", "fast"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let args = parse(&["mug.jpg", "--voice", "en-GB-RyanNeural", "--rate", "+15%"]);
        let mut config = Config::default();
        let fallback = config.speech.fallback_voice.clone();
        args.apply(&mut config);

        assert_eq!(config.speech.voice, "en-GB-RyanNeural");
        assert_eq!(config.speech.rate.to_string(), "+15%");
        assert_eq!(config.speech.fallback_voice, fallback);
    }

    #[test]
    fn test_cleanup_sweeps_both_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.upload_dir = dir.path().join("uploads");
        config.storage.audio_dir = dir.path().join("audio");
        config.ensure_dirs().unwrap();

        let old = SystemTime::now() - Duration::from_secs(48 * 3600);
        for path in [
            config.upload_dir().join("mug_20250101_000000.jpg"),
            config.audio_dir().join("description_20250101_000000.mp3"),
        ] {
            std::fs::write(&path, b"x").unwrap();
            std::fs::File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(old)
                .unwrap();
        }
        std::fs::write(config.audio_dir().join("fresh.mp3"), b"x").unwrap();

        let report = cleanup(&config);
        assert_eq!(report, CleanupReport { removed: 2, failed: 0 });
        assert!(config.audio_dir().join("fresh.mp3").exists());
    }
}
