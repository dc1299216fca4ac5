//! Speech synthesis engines and download encoders.
//!
//! # Available Engines
//!
//! - [`prerecorded`] - replays a fixed PCM clip; always available
//!
//! Enable encoders via Cargo features:
//! - `mp3` - LAME MP3 downloads (`lame::LameEncoder`)

#[cfg(feature = "mp3")]
pub mod lame;
pub mod prerecorded;

pub use prerecorded::{PrerecordedError, PrerecordedSpeech};
