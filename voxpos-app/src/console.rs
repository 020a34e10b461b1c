//! Console-backed speech capabilities.
//!
//! The terminal stands in for the microphone: typed lines become final
//! transcripts (see `commands`). Spoken feedback is printed.

use tracing::info;
use voxpos_core::error::Result;
use voxpos_core::{RecognizerConfig, SpeechRecognizer, SpeechSynthesizer, VoiceSettings};

#[derive(Debug, Default)]
pub struct ConsoleRecognizer;

impl SpeechRecognizer for ConsoleRecognizer {
    fn start(&mut self, config: &RecognizerConfig) -> Result<()> {
        info!(language = %config.language, "console recognizer listening");
        println!("[mic] listening ({}), type a command", config.language);
        Ok(())
    }

    fn stop(&mut self) {
        println!("[mic] stopped");
    }
}

#[derive(Debug, Default)]
pub struct ConsoleSynthesizer;

impl SpeechSynthesizer for ConsoleSynthesizer {
    fn speak(&mut self, text: &str, voice: &VoiceSettings) -> Result<()> {
        println!("[{} x{:.1}] {text}", voice.language, voice.rate);
        Ok(())
    }
}
