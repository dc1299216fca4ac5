use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::assets::{mime_for_extension, AssetHandle, AssetStore};
use super::{AudioSource, GenerationPipeline, Rendition};
use crate::audio::rate::validate_rate;
use crate::audio::PcmAsset;
use crate::error::PipelineError;
use crate::script::{active_line, ScriptTiming};
use crate::settings::VoiceSettings;
use crate::SpeechSynthesizer;

/// Instructions for whatever is playing the audio.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackCommand {
    /// Switch to a new playback asset, starting it if `autoplay` is set.
    Load { asset: AssetHandle, autoplay: bool },
    /// The loaded asset is gone; stop and show nothing.
    Unload,
    Play,
    Pause,
    Toggle,
    /// Jump to a position in seconds.
    Seek(f64),
}

/// Identifies the request a rendition answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    rate_request: Option<u64>,
}

impl Ticket {
    /// Generation this ticket belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `None` for a fresh generation.
    pub fn rate_request(&self) -> Option<u64> {
        self.rate_request
    }
}

/// A published rendition: the handles it owns plus the data it was built from.
#[derive(Debug)]
pub struct GenerationResult {
    generation: u64,
    rate: f32,
    playback: AssetHandle,
    download: AssetHandle,
    download_filename: String,
    source: Arc<AudioSource>,
}

impl GenerationResult {
    fn publish(generation: u64, rendition: Rendition, store: &AssetStore) -> Self {
        let playback = store.publish(rendition.playback_wav, mime_for_extension("wav"));
        let download = match rendition.compressed {
            Some(compressed) => {
                store.publish(compressed.bytes, mime_for_extension(&compressed.extension))
            }
            None => playback,
        };
        log::info!(
            "Published generation {generation} at {}x: playback {playback}, download {download} ({})",
            rendition.rate,
            rendition.download_filename
        );

        Self {
            generation,
            rate: rendition.rate,
            playback,
            download,
            download_filename: rendition.download_filename,
            source: rendition.source,
        }
    }

    /// Give back every handle this result owns.
    pub fn release(self, store: &AssetStore) {
        store.release(self.playback);
        if self.download != self.playback {
            store.release(self.download);
        }
    }

    /// Sequence number of the generation shown.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Playback rate of the published assets.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Handle of the playback WAV.
    pub fn playback(&self) -> AssetHandle {
        self.playback
    }

    /// Handle of the download asset.
    pub fn download(&self) -> AssetHandle {
        self.download
    }

    /// Suggested file name for the download.
    pub fn download_filename(&self) -> &str {
        &self.download_filename
    }

    /// True when no compressed download exists and the WAV is offered instead.
    pub fn download_is_playback(&self) -> bool {
        self.download == self.playback
    }

    /// Decoded audio at 1x.
    pub fn audio(&self) -> &PcmAsset {
        &self.source.audio
    }

    /// Estimated line windows, in 1x seconds.
    pub fn timings(&self) -> &[ScriptTiming] {
        &self.source.timings
    }

    /// Data every rate change is rendered from.
    pub fn source(&self) -> &Arc<AudioSource> {
        &self.source
    }
}

/// Holds the displayed result and arbitrates between overlapping requests.
///
/// Every generation and every rate change takes a [`Ticket`]. Only the
/// newest generation may replace the displayed result, and a rate change is
/// applied only if it is the newest rate request for the generation still on
/// display. Stale renditions are dropped before anything is published.
pub struct Session {
    assets: Arc<AssetStore>,
    generations: AtomicU64,
    rate_requests: AtomicU64,
    current: Mutex<Option<GenerationResult>>,
    playback: Sender<PlaybackCommand>,
}

impl Session {
    /// Create a session publishing into `assets`; playback commands arrive on
    /// the returned receiver.
    pub fn new(assets: Arc<AssetStore>) -> (Self, Receiver<PlaybackCommand>) {
        let (tx, rx) = mpsc::channel();
        let session = Self {
            assets,
            generations: AtomicU64::new(0),
            rate_requests: AtomicU64::new(0),
            current: Mutex::new(None),
            playback: tx,
        };
        (session, rx)
    }

    /// Store this session publishes into.
    pub fn assets(&self) -> &Arc<AssetStore> {
        &self.assets
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<GenerationResult>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn send(&self, command: PlaybackCommand) {
        if self.playback.send(command).is_err() {
            log::debug!("Playback sink disconnected; command dropped");
        }
    }

    /// Take a ticket for a new generation, superseding all earlier ones.
    pub fn begin_generation(&self) -> Ticket {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("Starting generation {generation}");
        Ticket {
            generation,
            rate_request: None,
        }
    }

    /// Start a rate change against the displayed result, if there is one.
    pub fn begin_rate_change(&self) -> Option<(Ticket, Arc<AudioSource>)> {
        let current = self.lock_current();
        let result = current.as_ref()?;
        let request = self.rate_requests.fetch_add(1, Ordering::SeqCst) + 1;
        Some((
            Ticket {
                generation: result.generation,
                rate_request: Some(request),
            },
            Arc::clone(&result.source),
        ))
    }

    fn is_latest(&self, ticket: Ticket, current: Option<&GenerationResult>) -> bool {
        match ticket.rate_request {
            None => ticket.generation == self.generations.load(Ordering::SeqCst),
            // Valid while its generation is still on display.
            Some(request) => {
                request == self.rate_requests.load(Ordering::SeqCst)
                    && current.map(|c| c.generation) == Some(ticket.generation)
            }
        }
    }

    /// Offer a finished rendition. Returns `false` if a newer request has
    /// superseded it, in which case nothing is published.
    pub fn complete(&self, ticket: Ticket, rendition: Rendition) -> bool {
        let mut current = self.lock_current();
        if !self.is_latest(ticket, current.as_ref()) {
            log::warn!(
                "Discarding stale rendition (generation {}, rate request {:?})",
                ticket.generation,
                ticket.rate_request
            );
            return false;
        }

        let result = GenerationResult::publish(ticket.generation, rendition, &self.assets);
        let command = PlaybackCommand::Load {
            asset: result.playback,
            autoplay: ticket.rate_request.is_none(),
        };
        let previous = current.replace(result);
        self.send(command);
        if let Some(previous) = previous {
            previous.release(&self.assets);
        }
        true
    }

    /// Run a full generation and display it unless a newer one overtook it.
    pub fn generate<S: SpeechSynthesizer>(
        &self,
        pipeline: &mut GenerationPipeline<S>,
        script: &str,
        settings: &VoiceSettings,
    ) -> Result<bool, PipelineError> {
        let ticket = self.begin_generation();
        let rendition = pipeline.generate(script, settings)?;
        Ok(self.complete(ticket, rendition))
    }

    /// Re-render the displayed result at `rate`.
    ///
    /// Returns `Ok(false)` when nothing is displayed or a newer request won.
    pub fn change_rate<S: SpeechSynthesizer>(
        &self,
        pipeline: &mut GenerationPipeline<S>,
        rate: f32,
    ) -> Result<bool, PipelineError> {
        validate_rate(rate)?;
        let Some((ticket, source)) = self.begin_rate_change() else {
            log::debug!("Rate change to {rate}x requested with nothing loaded");
            return Ok(false);
        };
        let rendition = pipeline.render_rate(&source, rate)?;
        Ok(self.complete(ticket, rendition))
    }

    /// Inspect the displayed result.
    pub fn with_current<R>(&self, f: impl FnOnce(Option<&GenerationResult>) -> R) -> R {
        f(self.lock_current().as_ref())
    }

    /// Index of the script line being spoken at `time` seconds.
    pub fn active_line(&self, time: f64) -> Option<usize> {
        self.with_current(|current| current.and_then(|c| active_line(c.timings(), time)))
    }

    /// Resume playback.
    pub fn play(&self) {
        self.send(PlaybackCommand::Play);
    }

    /// Pause playback.
    pub fn pause(&self) {
        self.send(PlaybackCommand::Pause);
    }

    /// Flip between playing and paused.
    pub fn toggle(&self) {
        self.send(PlaybackCommand::Toggle);
    }

    /// Jump to `seconds`, clamped at zero.
    pub fn seek(&self, seconds: f64) {
        self.send(PlaybackCommand::Seek(seconds.max(0.0)));
    }

    /// Restart from the beginning.
    pub fn replay(&self) {
        self.send(PlaybackCommand::Seek(0.0));
        self.send(PlaybackCommand::Play);
    }

    /// Jump to the start of script line `index`. Returns `false` if there is
    /// no such line.
    pub fn seek_to_line(&self, index: usize) -> bool {
        let start = self.with_current(|current| {
            current.and_then(|c| c.timings().get(index).map(|t| t.start_time))
        });
        match start {
            Some(start) => {
                self.seek(start);
                true
            }
            None => false,
        }
    }

    /// Drop the displayed result and release its assets.
    pub fn clear(&self) {
        if let Some(previous) = self.lock_current().take() {
            self.send(PlaybackCommand::Unload);
            previous.release(&self.assets);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.clear();
    }
}
