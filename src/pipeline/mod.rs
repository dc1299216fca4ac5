//! Generation and rate-change orchestration.
//!
//! [`GenerationPipeline`] turns a script into a [`Rendition`]: assets that
//! exist only as bytes. A [`Session`] decides whether a finished rendition is
//! still wanted, publishes it into the [`AssetStore`] and tells the playback
//! sink about it.

pub mod assets;
pub mod session;

use std::sync::Arc;

use crate::audio::lossy::{encode_lossy, LossyEncoder};
use crate::audio::rate::{render_at_rate, validate_rate};
use crate::audio::trim::{trim_trailing_silence, TRIM_PADDING_BYTES};
use crate::audio::{wav, PcmAsset, SAMPLE_RATE};
use crate::error::PipelineError;
use crate::script::{estimate_timings, normalize_script, ScriptTiming};
use crate::settings::{compose_request, VoiceSettings};
use crate::SpeechSynthesizer;

pub use assets::{mime_for_extension, Asset, AssetHandle, AssetStore};
pub use session::{GenerationResult, PlaybackCommand, Session, Ticket};

/// Where a pipeline run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Normalizing,
    AwaitingSynthesis,
    Trimming,
    Encoding,
    Decoding,
    Timing,
    EncodingLossy,
    /// Rate-change entry point.
    Rendering,
    Complete,
    Failed,
}

/// Parameters for a [`GenerationPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineParams {
    /// Sample rate assumed when a synthesizer reports zero.
    pub sample_rate: u32,
    /// Silence kept after the last audible sample, in bytes.
    pub trim_padding: usize,
    /// Download file name without rate suffix or extension.
    pub download_stem: String,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            trim_padding: TRIM_PADDING_BYTES,
            download_stem: "dialogue".to_string(),
        }
    }
}

/// Audio and sync data produced once per generation; every rate change is
/// rendered from it.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSource {
    pub normalized_script: String,
    /// Playback container at 1x, exactly as built from the trimmed PCM.
    pub container: Vec<u8>,
    /// `container` decoded; its duration drives the timing estimate.
    pub audio: PcmAsset,
    pub timings: Vec<ScriptTiming>,
}

/// Compressed download bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedAudio {
    pub bytes: Vec<u8>,
    pub extension: String,
}

/// Output of a successful run, not yet published.
#[derive(Debug, Clone)]
pub struct Rendition {
    pub source: Arc<AudioSource>,
    pub rate: f32,
    pub playback_wav: Vec<u8>,
    /// `None` when the playback WAV doubles as the download.
    pub compressed: Option<CompressedAudio>,
    pub download_filename: String,
}

/// Runs synthesis and post-processing for one script at a time.
pub struct GenerationPipeline<S> {
    synthesizer: S,
    lossy: Option<Box<dyn LossyEncoder>>,
    params: PipelineParams,
    stage: PipelineStage,
}

impl<S: SpeechSynthesizer> GenerationPipeline<S> {
    /// Pipeline with default [`PipelineParams`] and no lossy encoder.
    pub fn new(synthesizer: S) -> Self {
        Self::with_params(synthesizer, PipelineParams::default())
    }

    /// Pipeline with custom parameters and no lossy encoder.
    pub fn with_params(synthesizer: S, params: PipelineParams) -> Self {
        Self {
            synthesizer,
            lossy: None,
            params,
            stage: PipelineStage::Idle,
        }
    }

    /// Produce compressed downloads with `encoder` instead of plain WAV.
    pub fn with_lossy_encoder(mut self, encoder: impl LossyEncoder + 'static) -> Self {
        self.lossy = Some(Box::new(encoder));
        self
    }

    /// Stage the last run reached.
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Parameters in use.
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// The wrapped synthesizer.
    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    /// Mutable access to the wrapped synthesizer.
    pub fn synthesizer_mut(&mut self) -> &mut S {
        &mut self.synthesizer
    }

    fn enter(&mut self, stage: PipelineStage) {
        log::debug!("Pipeline {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    fn finish(&mut self, result: &Result<Rendition, PipelineError>) {
        match result {
            Ok(rendition) => {
                log::info!(
                    "Pipeline complete: {:.2}s at {}x, download {}",
                    rendition.source.audio.duration_secs() / rendition.rate as f64,
                    rendition.rate,
                    rendition.download_filename
                );
                self.enter(PipelineStage::Complete);
            }
            Err(e) => {
                log::error!("Pipeline failed during {:?}: {e}", self.stage);
                self.enter(PipelineStage::Failed);
            }
        }
    }

    /// Synthesize `script` and build its 1x playback and download assets.
    pub fn generate(
        &mut self,
        script: &str,
        settings: &VoiceSettings,
    ) -> Result<Rendition, PipelineError> {
        self.enter(PipelineStage::Idle);
        let result = self.run_generation(script, settings);
        self.finish(&result);
        result
    }

    fn run_generation(
        &mut self,
        script: &str,
        settings: &VoiceSettings,
    ) -> Result<Rendition, PipelineError> {
        self.enter(PipelineStage::Normalizing);
        if script.trim().is_empty() {
            return Err(PipelineError::EmptyScript);
        }
        let normalized_script = normalize_script(script);

        self.enter(PipelineStage::AwaitingSynthesis);
        let request = compose_request(settings, &normalized_script);
        let speech = self
            .synthesizer
            .synthesize(&request)
            .map_err(PipelineError::NetworkFailure)?;
        let sample_rate = if speech.sample_rate == 0 {
            self.params.sample_rate
        } else {
            speech.sample_rate
        };
        let mut pcm = speech.pcm;
        if pcm.len() % 2 != 0 {
            log::warn!("Synthesizer returned {} bytes; dropping the odd trailing byte", pcm.len());
            pcm.pop();
        }
        if pcm.is_empty() {
            return Err(PipelineError::SynthesisUnavailable);
        }
        log::info!(
            "Synthesized {:.2}s of audio",
            pcm.len() as f64 / (2.0 * sample_rate as f64)
        );

        self.enter(PipelineStage::Trimming);
        let trimmed = trim_trailing_silence(&pcm, self.params.trim_padding);

        self.enter(PipelineStage::Encoding);
        let container =
            wav::encode_pcm16(trimmed, sample_rate).map_err(PipelineError::EncodeFailure)?;

        self.enter(PipelineStage::Decoding);
        let audio = wav::decode(&container).map_err(PipelineError::DecodeFailure)?;

        self.enter(PipelineStage::Timing);
        let timings = estimate_timings(&normalized_script, audio.duration_secs());
        if timings.is_empty() {
            log::warn!("No speaker-tagged lines; karaoke sync is unavailable");
        }

        let source = Arc::new(AudioSource {
            normalized_script,
            container,
            audio,
            timings,
        });
        let playback_wav = source.container.clone();
        Ok(self.package(source, 1.0, playback_wav, None))
    }

    /// Re-render `source` at `rate` and rebuild the playback and download
    /// assets. Timing windows are carried over unchanged.
    pub fn render_rate(
        &mut self,
        source: &Arc<AudioSource>,
        rate: f32,
    ) -> Result<Rendition, PipelineError> {
        self.enter(PipelineStage::Idle);
        let result = self.run_rate_change(source, rate);
        self.finish(&result);
        result
    }

    fn run_rate_change(
        &mut self,
        source: &Arc<AudioSource>,
        rate: f32,
    ) -> Result<Rendition, PipelineError> {
        self.enter(PipelineStage::Rendering);
        let rate = validate_rate(rate)?;
        if rate == 1.0 {
            // The 1x container is re-used verbatim; re-quantizing decoded
            // floats would not reproduce it bit for bit.
            let playback_wav = source.container.clone();
            return Ok(self.package(Arc::clone(source), rate, playback_wav, None));
        }

        let rendered = render_at_rate(&source.audio, rate)?;

        self.enter(PipelineStage::Encoding);
        let playback_wav = rendered.to_wav().map_err(PipelineError::EncodeFailure)?;
        Ok(self.package(Arc::clone(source), rate, playback_wav, Some(rendered)))
    }

    /// Attach the download asset: compressed when an encoder is configured
    /// and succeeds, otherwise the playback WAV itself.
    fn package(
        &mut self,
        source: Arc<AudioSource>,
        rate: f32,
        playback_wav: Vec<u8>,
        rendered: Option<PcmAsset>,
    ) -> Rendition {
        let audio = rendered.as_ref().unwrap_or(&source.audio);
        let compressed = self.encode_download(audio);
        let extension = compressed
            .as_ref()
            .map(|c| c.extension.as_str())
            .unwrap_or("wav");
        let download_filename = self.download_filename(rate, extension);

        Rendition {
            source,
            rate,
            playback_wav,
            compressed,
            download_filename,
        }
    }

    fn encode_download(&mut self, audio: &PcmAsset) -> Option<CompressedAudio> {
        let encoder = self.lossy.as_deref()?;
        self.stage = PipelineStage::EncodingLossy;
        log::debug!("Pipeline -> {:?}", self.stage);

        match encode_lossy(encoder, &audio.samples, audio.sample_rate) {
            Ok(bytes) => Some(CompressedAudio {
                bytes,
                extension: encoder.extension().to_string(),
            }),
            Err(e) => {
                log::warn!("Lossy encoding unavailable, offering WAV download: {e}");
                None
            }
        }
    }

    fn download_filename(&self, rate: f32, extension: &str) -> String {
        let stem = &self.params.download_stem;
        if rate == 1.0 {
            format!("{stem}.{extension}")
        } else {
            format!("{stem}_{rate}x.{extension}")
        }
    }
}
