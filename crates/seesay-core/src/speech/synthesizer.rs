//! Speech synthesis with a single fallback-voice retry.
//!
//! The first attempt uses the caller's voice and rate. Any failure (backend
//! error, deadline, or no audio written) triggers exactly one more attempt
//! with the configured fallback voice and the same rate, written to a
//! `_fallback` file so both attempts can be told apart on disk.
//!
//! Each attempt claims its output name before the backend runs, so
//! concurrent requests within one second get `_1`, `_2`, ... suffixes
//! instead of sharing a file. A failed attempt leaves nothing behind.

use super::backend::{SpeechBackend, SynthesisRequest};
use super::SpeechRate;
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::storage::{self, ReservedFile};
use crate::types::{file_timestamp, AudioArtifact};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Turns description text into an audio file on disk.
pub struct SpeechSynthesizer {
    backend: Arc<dyn SpeechBackend>,
    audio_dir: PathBuf,
    extension: String,
    voice: String,
    fallback_voice: String,
    rate: SpeechRate,
    timeout: Duration,
}

impl SpeechSynthesizer {
    pub fn new(backend: Box<dyn SpeechBackend>, config: &Config) -> Self {
        Self {
            backend: Arc::from(backend),
            audio_dir: config.audio_dir(),
            extension: config.speech.format.clone(),
            voice: config.speech.voice.clone(),
            fallback_voice: config.speech.fallback_voice.clone(),
            rate: config.speech.rate,
            timeout: Duration::from_millis(config.limits.speech_timeout_ms),
        }
    }

    /// Speak `text` with the configured default voice and rate.
    pub async fn speak(&self, text: &str) -> PipelineResult<AudioArtifact> {
        let request = SynthesisRequest::new(text, self.voice.as_str(), self.rate);
        self.synthesize(&request).await
    }

    /// Synthesize `request`, retrying once with the fallback voice.
    pub async fn synthesize(&self, request: &SynthesisRequest) -> PipelineResult<AudioArtifact> {
        let stamp = file_timestamp(chrono::Local::now());

        let primary_err = match self.attempt(request, &stamp, false).await {
            Ok(artifact) => return Ok(artifact),
            Err(e) => e,
        };
        tracing::warn!(
            backend = self.backend.name(),
            voice = request.voice(),
            "Speech synthesis failed, retrying with fallback voice {}: {primary_err}",
            self.fallback_voice
        );

        let fallback = request.with_voice(self.fallback_voice.as_str());
        self.attempt(&fallback, &stamp, true).await.map_err(|e| {
            tracing::error!("Fallback speech synthesis also failed: {e}");
            e
        })
    }

    async fn attempt(
        &self,
        request: &SynthesisRequest,
        stamp: &str,
        fallback: bool,
    ) -> PipelineResult<AudioArtifact> {
        let stem = if fallback {
            format!("description_{stamp}_fallback")
        } else {
            format!("description_{stamp}")
        };
        let ReservedFile {
            file,
            path,
            file_name,
        } = storage::reserve(&self.audio_dir, &stem, &self.extension)
            .await
            .map_err(|e| PipelineError::filesystem(self.audio_dir.join(&stem), e))?;
        // The backend reopens the path; only the name is held
        drop(file);

        if let Err(e) = self.run_backend(request, &path).await {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e);
        }

        tracing::info!("Audio saved to: {}", path.display());
        Ok(AudioArtifact {
            path,
            file_name,
            voice: request.voice().to_string(),
            fallback,
        })
    }

    /// One backend call under the deadline, then a check that audio landed.
    async fn run_backend(&self, request: &SynthesisRequest, path: &Path) -> PipelineResult<()> {
        match tokio::time::timeout(self.timeout, self.backend.synthesize(request, path)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(PipelineError::Timeout {
                    stage: "speech".to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        }

        let written = tokio::fs::metadata(path)
            .await
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        if !written {
            return Err(PipelineError::ArtifactMissing(path.to_path_buf()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// What the mock backend does on a given call.
    #[derive(Clone, Copy)]
    enum Outcome {
        /// Write the file and succeed
        Write,
        /// Return an upstream error
        Fail,
        /// Claim success without writing anything
        Phantom,
        /// Sleep past any reasonable deadline
        Hang,
    }

    /// Speech backend that follows a script and records every request.
    struct MockBackend {
        script: Vec<Outcome>,
        call_count: Arc<AtomicU32>,
        requests: Arc<Mutex<Vec<SynthesisRequest>>>,
    }

    impl MockBackend {
        fn scripted(script: &[Outcome]) -> Self {
            Self {
                script: script.to_vec(),
                call_count: Arc::new(AtomicU32::new(0)),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl SpeechBackend for MockBackend {
        fn name(&self) -> &str {
            "mock"
        }

        async fn synthesize(
            &self,
            request: &SynthesisRequest,
            output: &Path,
        ) -> Result<(), PipelineError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst) as usize;
            self.requests.lock().unwrap().push(request.clone());
            match self.script.get(idx).copied().unwrap_or(Outcome::Fail) {
                Outcome::Write => {
                    tokio::fs::write(output, b"ID3audio").await.unwrap();
                    Ok(())
                }
                Outcome::Fail => Err(PipelineError::Speech {
                    voice: request.voice().to_string(),
                    message: "service unavailable".to_string(),
                    status_code: Some(503),
                }),
                Outcome::Phantom => Ok(()),
                Outcome::Hang => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(())
                }
            }
        }
    }

    fn setup(script: &[Outcome]) -> (
        SpeechSynthesizer,
        Arc<AtomicU32>,
        Arc<Mutex<Vec<SynthesisRequest>>>,
        tempfile::TempDir,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.audio_dir = dir.path().to_path_buf();
        config.limits.speech_timeout_ms = 100;

        let backend = MockBackend::scripted(script);
        let calls = backend.call_count.clone();
        let requests = backend.requests.clone();
        (
            SpeechSynthesizer::new(Box::new(backend), &config),
            calls,
            requests,
            dir,
        )
    }

    #[tokio::test]
    async fn test_first_attempt_success_calls_once() {
        let (synth, calls, requests, _dir) = setup(&[Outcome::Write]);
        let artifact = synth.speak("A red mug.").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!artifact.fallback);
        assert!(artifact.path.exists());
        assert!(artifact.file_name.starts_with("description_"));
        assert!(artifact.file_name.ends_with(".mp3"));
        assert!(!artifact.file_name.contains("fallback"));
        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].voice(), "en-US-GuyNeural");
        assert_eq!(requests[0].rate().to_string(), "+25%");
    }

    #[tokio::test]
    async fn test_primary_failure_uses_fallback_voice_once() {
        let (synth, calls, requests, _dir) = setup(&[Outcome::Fail, Outcome::Write]);
        let request = SynthesisRequest::new("A red mug.", "en-GB-RyanNeural", SpeechRate::from_percent(10));
        let artifact = synth.synthesize(&request).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(artifact.fallback);
        assert_eq!(artifact.voice, "en-US-JennyNeural");
        assert!(artifact.file_name.ends_with("_fallback.mp3"));
        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].voice(), "en-GB-RyanNeural");
        assert_eq!(requests[1].voice(), "en-US-JennyNeural");
        // Same text and rate on the retry
        assert_eq!(requests[1].text(), "A red mug.");
        assert_eq!(requests[1].rate(), SpeechRate::from_percent(10));
    }

    #[tokio::test]
    async fn test_dual_failure_stops_after_two_attempts() {
        let (synth, calls, _requests, _dir) = setup(&[Outcome::Fail, Outcome::Fail, Outcome::Write]);
        let err = synth.speak("A red mug.").await.unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(matches!(err, PipelineError::Speech { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_triggers_fallback() {
        let (synth, calls, _requests, _dir) = setup(&[Outcome::Phantom, Outcome::Write]);
        let artifact = synth.speak("A red mug.").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(artifact.fallback);
    }

    #[tokio::test]
    async fn test_missing_file_on_both_attempts_is_artifact_missing() {
        let (synth, calls, _requests, _dir) = setup(&[Outcome::Phantom, Outcome::Phantom]);
        let err = synth.speak("A red mug.").await.unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        match err {
            PipelineError::ArtifactMissing(path) => {
                assert!(path.to_string_lossy().ends_with("_fallback.mp3"));
            }
            other => panic!("expected ArtifactMissing, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_deadline_counts_as_failure() {
        let (synth, calls, _requests, _dir) = setup(&[Outcome::Hang, Outcome::Write]);
        let artifact = synth.speak("A red mug.").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(artifact.fallback);
    }

    #[tokio::test]
    async fn test_failed_attempt_leaves_no_file() {
        let (synth, _calls, _requests, dir) = setup(&[Outcome::Fail, Outcome::Phantom]);
        synth.speak("A red mug.").await.unwrap_err();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_same_second_requests_get_distinct_files() {
        let (synth, calls, _requests, dir) = setup(&[Outcome::Write, Outcome::Write, Outcome::Write]);

        let (a, b, c) = tokio::join!(
            synth.speak("first"),
            synth.speak("second"),
            synth.speak("third"),
        );
        let mut names = vec![
            a.unwrap().file_name,
            b.unwrap().file_name,
            c.unwrap().file_name,
        ];
        names.sort();
        names.dedup();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(names.len(), 3);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }
}
