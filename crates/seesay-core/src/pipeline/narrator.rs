//! Pipeline orchestration - wires validation, description and speech.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio::io::AsyncWriteExt;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::speech::{HttpSpeechBackend, SpeechBackend, SpeechSynthesizer};
use crate::storage::{self, ReservedFile};
use crate::types::{Narration, StoredImage, UploadedImage};
use crate::vision::{Describer, VisionProvider, VisionProviderFactory};

use super::validate::{secure_filename_with_timestamp, Validator};

/// Runs images through validate -> describe -> speak.
pub struct Narrator {
    validator: Validator,
    describer: Describer,
    synthesizer: SpeechSynthesizer,
    upload_dir: PathBuf,
}

impl Narrator {
    /// Create a narrator from explicit vision and speech backends.
    pub fn new(
        config: &Config,
        vision: Box<dyn VisionProvider>,
        speech: Box<dyn SpeechBackend>,
    ) -> Self {
        Self {
            validator: Validator::new(config),
            describer: Describer::new(vision, config),
            synthesizer: SpeechSynthesizer::new(speech, config),
            upload_dir: config.upload_dir(),
        }
    }

    /// Create a narrator with the configured vision provider and the HTTP
    /// speech backend.
    pub fn from_config(config: &Config, model_override: Option<&str>) -> PipelineResult<Self> {
        let vision = VisionProviderFactory::create(config, model_override)?;
        let speech = HttpSpeechBackend::new(&config.speech);
        Ok(Self::new(config, vision, Box::new(speech)))
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn describer(&self) -> &Describer {
        &self.describer
    }

    pub fn synthesizer(&self) -> &SpeechSynthesizer {
        &self.synthesizer
    }

    /// Validate an upload and persist it under a sanitized, timestamped name.
    ///
    /// Nothing is written unless validation passes. Same-named uploads in
    /// the same second get `_1`, `_2`, ... suffixes.
    pub async fn store_upload(&self, upload: &UploadedImage) -> PipelineResult<StoredImage> {
        self.validator.validate_upload(upload)?;

        let secure = secure_filename_with_timestamp(&upload.filename, chrono::Local::now());
        let (stem, ext) = secure.rsplit_once('.').unwrap_or((secure.as_str(), ""));
        let ReservedFile {
            mut file,
            path,
            file_name,
        } = storage::reserve(&self.upload_dir, stem, ext)
            .await
            .map_err(|e| PipelineError::filesystem(self.upload_dir.join(&secure), e))?;

        let written = async {
            file.write_all(&upload.bytes).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(PipelineError::filesystem(&path, e));
        }

        tracing::info!("Image saved to: {}", path.display());
        Ok(StoredImage { path, file_name })
    }

    /// Store, describe and speak an uploaded image.
    pub async fn narrate_upload(&self, upload: &UploadedImage) -> PipelineResult<Narration> {
        let start = Instant::now();
        let stored = self.store_upload(upload).await?;
        let format = extension_of(&stored.file_name);

        let description = self.describer.describe(&upload.bytes, &format).await?;
        let audio = self.synthesizer.speak(&description).await?;

        tracing::debug!("Narrated {} in {:?}", stored.file_name, start.elapsed());
        Ok(Narration {
            description,
            image: Some(stored),
            audio,
        })
    }

    /// Describe and speak an image already on disk.
    pub async fn narrate_file(&self, path: &Path) -> PipelineResult<Narration> {
        let start = Instant::now();
        let format = self.validator.validate_path(path)?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::filesystem(path, e))?;
        tracing::info!("Processing image: {}", path.display());

        let description = self.describer.describe(&bytes, &format).await?;
        let audio = self.synthesizer.speak(&description).await?;

        tracing::debug!("Narrated {:?} in {:?}", path, start.elapsed());
        Ok(Narration {
            description,
            image: None,
            audio,
        })
    }
}

fn extension_of(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::speech::SynthesisRequest;
    use crate::vision::{VisionRequest, VisionResponse, FALLBACK_DESCRIPTION};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct StubVision {
        text: Option<String>,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl VisionProvider for StubVision {
        fn name(&self) -> &str {
            "stub"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn generate(&self, _request: &VisionRequest) -> Result<VisionResponse, PipelineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.text {
                Some(text) => Ok(VisionResponse {
                    text: text.clone(),
                    model: "stub".to_string(),
                    latency_ms: 1,
                }),
                None => Err(PipelineError::Vision {
                    message: "connection refused".to_string(),
                    status_code: None,
                }),
            }
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
    }

    /// Writes the spoken text as the audio payload and remembers it.
    struct StubSpeech {
        spoken: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl SpeechBackend for StubSpeech {
        fn name(&self) -> &str {
            "stub"
        }

        async fn synthesize(
            &self,
            request: &SynthesisRequest,
            output: &Path,
        ) -> Result<(), PipelineError> {
            self.spoken.lock().unwrap().push(request.text().to_string());
            tokio::fs::write(output, request.text().as_bytes())
                .await
                .map_err(|e| PipelineError::filesystem(output, e))
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        config: Config,
        narrator: Narrator,
        vision_calls: Arc<AtomicU32>,
        spoken: Arc<Mutex<Vec<String>>>,
    }

    fn fixture(text: Option<&str>) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.upload_dir = dir.path().join("uploads");
        config.storage.audio_dir = dir.path().join("audio");
        config.ensure_dirs().unwrap();

        let vision_calls = Arc::new(AtomicU32::new(0));
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let narrator = Narrator::new(
            &config,
            Box::new(StubVision {
                text: text.map(String::from),
                calls: vision_calls.clone(),
            }),
            Box::new(StubSpeech {
                spoken: spoken.clone(),
            }),
        );
        Fixture {
            _dir: dir,
            config,
            narrator,
            vision_calls,
            spoken,
        }
    }

    fn jpeg(len: usize) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.resize(len, 0);
        bytes
    }

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_narrate_upload_end_to_end() {
        let f = fixture(Some("A red mug on a wooden table."));
        let upload = UploadedImage::new(jpeg(10 * 1024), "mug.jpg");

        let narration = f.narrator.narrate_upload(&upload).await.unwrap();

        assert_eq!(narration.description, "A red mug on a wooden table.");
        let stored = narration.image.unwrap();
        assert!(stored.file_name.starts_with("mug_"));
        assert!(stored.file_name.ends_with(".jpg"));
        assert_eq!(std::fs::read(&stored.path).unwrap().len(), 10 * 1024);

        assert!(narration.audio.file_name.starts_with("description_"));
        assert!(!narration.audio.fallback);
        assert_eq!(
            std::fs::read_to_string(&narration.audio.path).unwrap(),
            "A red mug on a wooden table."
        );
        assert_eq!(f.spoken.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_upload_writes_nothing_and_calls_nothing() {
        let f = fixture(Some("unused"));
        let upload = UploadedImage::new(b"plain text".to_vec(), "notes.txt");

        let err = f.narrator.narrate_upload(&upload).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InputRejected);
        assert_eq!(entries(&f.config.upload_dir()), 0);
        assert_eq!(f.vision_calls.load(Ordering::SeqCst), 0);
        assert!(f.spoken.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_upload_is_not_stored() {
        let f = fixture(Some("unused"));
        let upload = UploadedImage::new(jpeg(16 * 1024 * 1024 + 1), "big.jpg");

        let err = f.narrator.narrate_upload(&upload).await.unwrap_err();

        assert!(matches!(err, PipelineError::FileTooLarge { .. }));
        assert_eq!(entries(&f.config.upload_dir()), 0);
    }

    #[tokio::test]
    async fn test_vision_failure_skips_speech() {
        let f = fixture(None);
        let upload = UploadedImage::new(jpeg(64), "mug.png");

        let err = f.narrator.narrate_upload(&upload).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
        assert!(f.spoken.lock().unwrap().is_empty());
        assert_eq!(entries(&f.config.audio_dir()), 0);
    }

    #[tokio::test]
    async fn test_empty_description_is_spoken_as_fallback_sentence() {
        let f = fixture(Some("   "));
        let upload = UploadedImage::new(jpeg(64), "blank.webp");

        let narration = f.narrator.narrate_upload(&upload).await.unwrap();

        assert_eq!(narration.description, FALLBACK_DESCRIPTION);
        assert_eq!(f.spoken.lock().unwrap()[0], FALLBACK_DESCRIPTION);
    }

    #[tokio::test]
    async fn test_narrate_file_leaves_uploads_untouched() {
        let f = fixture(Some("A cat asleep on a windowsill."));
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("cat.PNG");
        std::fs::write(&image, jpeg(128)).unwrap();

        let narration = f.narrator.narrate_file(&image).await.unwrap();

        assert_eq!(narration.description, "A cat asleep on a windowsill.");
        assert!(narration.image.is_none());
        assert!(narration.audio.path.exists());
        assert_eq!(entries(&f.config.upload_dir()), 0);
    }

    #[tokio::test]
    async fn test_narrate_missing_file() {
        let f = fixture(Some("unused"));
        let err = f
            .narrator
            .narrate_file(Path::new("/definitely/not/here.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
        assert_eq!(f.vision_calls.load(Ordering::SeqCst), 0);
    }

    /// Describes an image by the size of its encoded payload.
    struct EchoVision;

    #[async_trait]
    impl VisionProvider for EchoVision {
        fn name(&self) -> &str {
            "echo"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse, PipelineError> {
            Ok(VisionResponse {
                text: format!("An image of {} encoded bytes.", request.image.data.len()),
                model: "echo".to_string(),
                latency_ms: 1,
            })
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
    }

    /// Holds the request open for a moment before writing, so overlapping
    /// calls are in flight together.
    struct SlowSpeech;

    #[async_trait]
    impl SpeechBackend for SlowSpeech {
        fn name(&self) -> &str {
            "slow"
        }

        async fn synthesize(
            &self,
            request: &SynthesisRequest,
            output: &Path,
        ) -> Result<(), PipelineError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            tokio::fs::write(output, request.text().as_bytes())
                .await
                .map_err(|e| PipelineError::filesystem(output, e))
        }
    }

    #[tokio::test]
    async fn test_concurrent_uploads_keep_their_own_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.upload_dir = dir.path().join("uploads");
        config.storage.audio_dir = dir.path().join("audio");
        config.ensure_dirs().unwrap();
        let narrator = Narrator::new(&config, Box::new(EchoVision), Box::new(SlowSpeech));

        let small = UploadedImage::new(jpeg(64), "photo.jpg");
        let large = UploadedImage::new(jpeg(640), "photo.jpg");
        let (a, b) = tokio::join!(
            narrator.narrate_upload(&small),
            narrator.narrate_upload(&large)
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.description, b.description);
        assert_ne!(a.audio.file_name, b.audio.file_name);
        assert_eq!(std::fs::read_to_string(&a.audio.path).unwrap(), a.description);
        assert_eq!(std::fs::read_to_string(&b.audio.path).unwrap(), b.description);

        let (image_a, image_b) = (a.image.unwrap(), b.image.unwrap());
        assert_ne!(image_a.file_name, image_b.file_name);
        assert_eq!(std::fs::read(&image_a.path).unwrap().len(), 64);
        assert_eq!(std::fs::read(&image_b.path).unwrap().len(), 640);
        assert_eq!(entries(&config.audio_dir()), 2);
        assert_eq!(entries(&config.upload_dir()), 2);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("mug_20250601_120000.jpg"), "jpg");
        assert_eq!(extension_of("noext"), "");
    }
}
