use std::sync::{Arc, Mutex};

use approx::assert_relative_eq;
use dialogue_voice::audio::lossy::{EncoderError, FrameSink, LossyEncoder};
use dialogue_voice::audio::wav;
use dialogue_voice::engines::PrerecordedSpeech;
use dialogue_voice::{
    AssetStore, CapabilityError, GenerationPipeline, PipelineError, PipelineStage,
    PlaybackCommand, Session, SpeechRequest, SpeechSynthesizer, SynthesizedSpeech, VoiceSettings,
};

const RATE: u32 = 24000;

/// `seconds` of a steady non-zero tone.
fn tone(seconds: usize) -> Vec<u8> {
    std::iter::repeat(1000i16.to_le_bytes())
        .take(seconds * RATE as usize)
        .flatten()
        .collect()
}

fn pipeline(pcm: Vec<u8>) -> GenerationPipeline<PrerecordedSpeech> {
    GenerationPipeline::new(PrerecordedSpeech::from_pcm(pcm, RATE))
}

struct Offline;

impl SpeechSynthesizer for Offline {
    fn synthesize(&mut self, _request: &SpeechRequest) -> Result<SynthesizedSpeech, CapabilityError> {
        Err("connection refused".into())
    }
}

/// Counts frames and emits one marker byte per frame.
#[derive(Default, Clone)]
struct MarkerEncoder {
    frames: Arc<Mutex<usize>>,
}

struct MarkerSink {
    frames: Arc<Mutex<usize>>,
}

impl LossyEncoder for MarkerEncoder {
    fn extension(&self) -> &str {
        "mp3"
    }

    fn open(&self, _sample_rate: u32) -> Result<Box<dyn FrameSink>, EncoderError> {
        Ok(Box::new(MarkerSink {
            frames: self.frames.clone(),
        }))
    }
}

impl FrameSink for MarkerSink {
    fn encode_frame(&mut self, _frame: &[i16]) -> Result<Vec<u8>, EncoderError> {
        *self.frames.lock().unwrap() += 1;
        Ok(vec![0xaa])
    }

    fn flush(self: Box<Self>) -> Result<Vec<u8>, EncoderError> {
        Ok(Vec::new())
    }
}

/// Encoder whose codec cannot be opened.
struct UnavailableEncoder;

impl LossyEncoder for UnavailableEncoder {
    fn extension(&self) -> &str {
        "mp3"
    }

    fn open(&self, _sample_rate: u32) -> Result<Box<dyn FrameSink>, EncoderError> {
        Err("codec not installed".into())
    }
}

#[test]
fn generates_playback_timings_and_wav_download() {
    let mut pipeline = pipeline(tone(2));
    let rendition = pipeline
        .generate("Male: Hi\nFemale: Hi", &VoiceSettings::default())
        .unwrap();

    assert_eq!(pipeline.stage(), PipelineStage::Complete);
    assert_eq!(rendition.rate, 1.0);
    assert_eq!(&rendition.playback_wav[..4], b"RIFF");
    assert_eq!(rendition.playback_wav.len(), 44 + 2 * 2 * RATE as usize);
    assert!(rendition.compressed.is_none());
    assert_eq!(rendition.download_filename, "dialogue.wav");

    let timings = &rendition.source.timings;
    assert_eq!(timings.len(), 2);
    assert_relative_eq!(timings[0].start_time, 0.0);
    assert_relative_eq!(timings[0].end_time, 1.0, epsilon = 1e-9);
    assert_relative_eq!(timings[1].start_time, 1.0, epsilon = 1e-9);
    assert_relative_eq!(timings[1].end_time, 2.0, epsilon = 1e-9);

    let request = &pipeline.synthesizer().requests()[0];
    assert!(request.text.starts_with("[System Note: Read the following dialogue "));
    assert!(request.text.ends_with("\nMale: Hi\nFemale: Hi"));
    assert_eq!(request.voice_for(dialogue_voice::Speaker::Male), Some("Fenrir"));
}

#[test]
fn normalizes_before_synthesis() {
    let mut pipeline = pipeline(tone(1));
    let rendition = pipeline
        .generate("1: Hello\nnữ: Xin chào\n\nstage direction", &VoiceSettings::default())
        .unwrap();

    assert_eq!(
        rendition.source.normalized_script,
        "Male: Hello\nFemale: Xin chào\n\nMale: stage direction"
    );
    assert_eq!(rendition.source.timings.len(), 3);
}

#[test]
fn trailing_silence_is_trimmed_to_padding() {
    let mut pcm = tone(1);
    pcm.extend(std::iter::repeat(0u8).take(2 * RATE as usize));

    let rendition = pipeline(pcm)
        .generate("Male: Hi", &VoiceSettings::default())
        .unwrap();
    assert_eq!(rendition.source.audio.len(), RATE as usize + 500);
}

#[test]
fn empty_audio_is_synthesis_unavailable() {
    let mut pipeline = pipeline(Vec::new());
    let err = pipeline
        .generate("Male: Hi", &VoiceSettings::default())
        .unwrap_err();
    assert!(matches!(err, PipelineError::SynthesisUnavailable));
    assert_eq!(err.stage(), PipelineStage::AwaitingSynthesis);
    assert_eq!(pipeline.stage(), PipelineStage::Failed);
}

#[test]
fn blank_script_is_rejected_before_synthesis() {
    let mut pipeline = pipeline(tone(1));
    let err = pipeline.generate(" \n\t", &VoiceSettings::default()).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyScript));
    assert!(pipeline.synthesizer().requests().is_empty());
}

#[test]
fn synthesizer_errors_are_network_failures() {
    let mut pipeline = GenerationPipeline::new(Offline);
    let err = pipeline
        .generate("Male: Hi", &VoiceSettings::default())
        .unwrap_err();
    assert!(matches!(err, PipelineError::NetworkFailure(_)));
    assert!(err.to_string().contains("connection refused"));
}

#[test]
fn rate_change_follows_duration_law() {
    let mut pipeline = pipeline(tone(2));
    let base = pipeline
        .generate("Male: Hi\nFemale: Hi", &VoiceSettings::default())
        .unwrap();

    let faster = pipeline.render_rate(&base.source, 1.5).unwrap();
    let decoded = wav::decode(&faster.playback_wav).unwrap();
    assert_eq!(decoded.len(), 32000);
    assert_relative_eq!(decoded.duration_secs(), 2.0 / 1.5, epsilon = 1e-9);
    assert_eq!(faster.download_filename, "dialogue_1.5x.wav");
    assert_eq!(faster.source.timings, base.source.timings);

    let restored = pipeline.render_rate(&base.source, 1.0).unwrap();
    assert_eq!(restored.playback_wav, base.playback_wav);
    assert_eq!(restored.download_filename, "dialogue.wav");
}

#[test]
fn out_of_range_rate_is_rejected() {
    let mut pipeline = pipeline(tone(1));
    let base = pipeline.generate("Male: Hi", &VoiceSettings::default()).unwrap();
    for rate in [0.25, 2.5, f32::NAN] {
        let err = pipeline.render_rate(&base.source, rate).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRate(_)));
    }
}

#[test]
fn lossy_encoder_produces_compressed_download() {
    let encoder = MarkerEncoder::default();
    let mut pipeline = pipeline(tone(1)).with_lossy_encoder(encoder.clone());

    let rendition = pipeline.generate("Male: Hi", &VoiceSettings::default()).unwrap();
    let compressed = rendition.compressed.unwrap();
    assert_eq!(compressed.extension, "mp3");
    // 24000 samples in 1152-sample frames.
    assert_eq!(compressed.bytes.len(), 21);
    assert_eq!(*encoder.frames.lock().unwrap(), 21);
    assert_eq!(rendition.download_filename, "dialogue.mp3");
}

#[test]
fn session_publishes_and_replaces_results() {
    let store = Arc::new(AssetStore::new());
    let (session, playback) = Session::new(store.clone());
    let mut pipeline = pipeline(tone(2));
    let settings = VoiceSettings::default();

    assert!(session.generate(&mut pipeline, "Male: Hi\nFemale: Hi", &settings).unwrap());
    let (playback_handle, filename) = session.with_current(|c| {
        let c = c.unwrap();
        assert!(c.download_is_playback());
        (c.playback(), c.download_filename().to_string())
    });
    assert_eq!(filename, "dialogue.wav");
    assert_eq!(store.get(playback_handle).unwrap().mime, "audio/wav");
    assert_eq!(session.active_line(1.5), Some(1));

    assert!(session.change_rate(&mut pipeline, 0.5).unwrap());
    assert!(store.get(playback_handle).is_none());
    assert_eq!(store.live_count(), 1);
    session.with_current(|c| {
        let c = c.unwrap();
        assert_eq!(c.download_filename(), "dialogue_0.5x.wav");
        assert_relative_eq!(c.audio().duration_secs(), 2.0, epsilon = 1e-9);
    });

    let commands: Vec<_> = playback.try_iter().collect();
    assert!(matches!(commands[0], PlaybackCommand::Load { autoplay: true, .. }));
    assert!(matches!(commands[1], PlaybackCommand::Load { autoplay: false, .. }));

    session.clear();
    assert_eq!(store.live_count(), 0);
    assert!(!session.change_rate(&mut pipeline, 1.5).unwrap());
}

#[test]
fn failed_generation_keeps_previous_result() {
    let store = Arc::new(AssetStore::new());
    let (session, _playback) = Session::new(store.clone());
    let mut pipeline = pipeline(tone(1));
    session
        .generate(&mut pipeline, "Male: Hi", &VoiceSettings::default())
        .unwrap();

    assert!(session
        .generate(&mut pipeline, "   ", &VoiceSettings::default())
        .is_err());
    assert!(session.with_current(|c| c.is_some()));
    assert_eq!(store.live_count(), 1);
    assert!(session.change_rate(&mut pipeline, 2.0).unwrap());
}

#[test]
fn unavailable_lossy_encoder_falls_back_to_wav() {
    let mut pipeline = pipeline(tone(2)).with_lossy_encoder(UnavailableEncoder);

    let base = pipeline
        .generate("Male: Hi\nFemale: Hi", &VoiceSettings::default())
        .unwrap();
    assert_eq!(pipeline.stage(), PipelineStage::Complete);
    assert!(base.compressed.is_none());
    assert_eq!(base.download_filename, "dialogue.wav");

    let faster = pipeline.render_rate(&base.source, 1.5).unwrap();
    assert!(faster.compressed.is_none());
    assert_eq!(faster.download_filename, "dialogue_1.5x.wav");

    let store = Arc::new(AssetStore::new());
    let (session, _playback) = Session::new(store.clone());
    assert!(session
        .generate(&mut pipeline, "Male: Hi\nFemale: Hi", &VoiceSettings::default())
        .unwrap());
    session.with_current(|c| {
        let c = c.unwrap();
        assert!(c.download_is_playback());
        assert_eq!(c.download_filename(), "dialogue.wav");
        assert_eq!(store.get(c.download()).unwrap().mime, "audio/wav");
    });

    assert!(session.change_rate(&mut pipeline, 1.5).unwrap());
    session.with_current(|c| {
        let c = c.unwrap();
        assert!(c.download_is_playback());
        assert!(c.download_filename().ends_with(".wav"));
    });
    assert_eq!(store.live_count(), 1);
}
