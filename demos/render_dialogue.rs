use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use dialogue_voice::engines::PrerecordedSpeech;
use dialogue_voice::script::format_clock;
use dialogue_voice::{AssetStore, GenerationPipeline, PlaybackCommand, Session, VoiceSettings};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let script_path = PathBuf::from(args.next().unwrap_or_else(|| "script.txt".to_string()));
    let clip_path = PathBuf::from(args.next().unwrap_or_else(|| "clip.wav".to_string()));
    let rate: f32 = match args.next() {
        Some(r) => r.parse()?,
        None => 1.5,
    };

    let script = std::fs::read_to_string(&script_path)?;
    let synthesizer = PrerecordedSpeech::from_wav(&clip_path)?;

    let pipeline = GenerationPipeline::new(synthesizer);
    #[cfg(feature = "mp3")]
    let pipeline = pipeline.with_lossy_encoder(dialogue_voice::engines::lame::LameEncoder::default());
    let mut pipeline = pipeline;

    let store = Arc::new(AssetStore::new());
    let (session, playback) = Session::new(store.clone());
    let settings = VoiceSettings::from_json(r#"{"speed": "Slightly Fast", "maleVoice": "Puck"}"#)?;

    let start = Instant::now();
    session.generate(&mut pipeline, &script, &settings)?;
    println!("Generated in {:.2?}", start.elapsed());

    session.with_current(|current| {
        if let Some(result) = current {
            println!("Duration: {}", format_clock(result.audio().duration_secs()));
            for timing in result.timings() {
                println!(
                    "  [{} - {}] {}",
                    format_clock(timing.start_time),
                    format_clock(timing.end_time),
                    timing.line
                );
            }
        }
    });

    session.change_rate(&mut pipeline, rate)?;

    for command in playback.try_iter() {
        if let PlaybackCommand::Load { asset, autoplay } = command {
            println!("Player loaded {asset} (autoplay: {autoplay})");
        }
    }

    session.with_current(|current| -> std::io::Result<()> {
        let Some(result) = current else {
            return Ok(());
        };
        if let Some(download) = store.get(result.download()) {
            std::fs::write(result.download_filename(), &download.bytes)?;
            println!("Saved {} ({})", result.download_filename(), download.mime);
        }
        Ok(())
    })?;

    Ok(())
}
