//! Audio-sink boundary
//!
//! The simulation only emits [`AudioCue`]s. A sink turns them into sound (or
//! a log line); failures come back as [`AudioError`] and the driver drops
//! them. On wasm32 the cues are synthesized procedurally, no sample files.

use crate::error::AudioError;
use crate::settings::Settings;
use crate::sim::events::AudioCue;

/// Something that plays cues. Fire-and-forget from the game's view.
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue) -> Result<(), AudioError>;

    /// Pick up new volume/mute preferences
    fn configure(&mut self, _settings: &Settings) {}
}

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// One oscillator blip with an exponential decay envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub freq: f32,
    /// Pitch glide target (same as `freq` for a steady tone)
    pub end_freq: f32,
    pub wave: Wave,
    /// Seconds after the cue fires
    pub delay: f64,
    pub duration: f64,
    /// Peak gain before volume scaling
    pub gain: f32,
}

const fn note(freq: f32, end_freq: f32, wave: Wave, delay: f64, duration: f64, gain: f32) -> Note {
    Note {
        freq,
        end_freq,
        wave,
        delay,
        duration,
        gain,
    }
}

use Wave::{Sawtooth, Sine, Square, Triangle};

// Solid thump
const PADDLE_HIT: &[Note] = &[note(150.0, 60.0, Sine, 0.0, 0.12, 0.6)];
// Short square click
const BRICK_HIT: &[Note] = &[note(520.0, 520.0, Square, 0.0, 0.06, 0.2)];
// Higher ping
const WALL_HIT: &[Note] = &[note(400.0, 400.0, Sine, 0.0, 0.08, 0.3)];
// Rising arpeggio
const POWER_UP: &[Note] = &[
    note(600.0, 600.0, Sine, 0.0, 0.15, 0.25),
    note(800.0, 800.0, Sine, 0.08, 0.15, 0.25),
    note(1000.0, 1000.0, Sine, 0.16, 0.15, 0.25),
];
// Fanfare
const LEVEL_UP: &[Note] = &[
    note(400.0, 400.0, Triangle, 0.0, 0.4, 0.3),
    note(500.0, 500.0, Triangle, 0.1, 0.4, 0.3),
    note(600.0, 600.0, Triangle, 0.2, 0.4, 0.3),
    note(800.0, 800.0, Triangle, 0.3, 0.4, 0.3),
];
// Falling buzz
const LIFE_LOST: &[Note] = &[note(300.0, 40.0, Sawtooth, 0.0, 0.6, 0.35)];
// Sad descent
const GAME_OVER: &[Note] = &[
    note(400.0, 400.0, Sine, 0.0, 0.3, 0.3),
    note(350.0, 350.0, Sine, 0.2, 0.3, 0.3),
    note(300.0, 300.0, Sine, 0.4, 0.3, 0.3),
    note(200.0, 200.0, Sine, 0.6, 0.3, 0.3),
];

/// Notes that make up each cue
pub fn voice(cue: AudioCue) -> &'static [Note] {
    match cue {
        AudioCue::PaddleHit => PADDLE_HIT,
        AudioCue::BrickHit => BRICK_HIT,
        AudioCue::WallHit => WALL_HIT,
        AudioCue::PowerUpCollected => POWER_UP,
        AudioCue::LevelUp => LEVEL_UP,
        AudioCue::LifeLost => LIFE_LOST,
        AudioCue::GameOver => GAME_OVER,
    }
}

/// Sink that logs cues instead of playing them (headless and native runs)
#[derive(Debug, Default)]
pub struct LogAudioSink {
    played: u64,
    volume: f32,
}

impl LogAudioSink {
    pub fn new(settings: &Settings) -> Self {
        Self {
            played: 0,
            volume: settings.effective_volume(),
        }
    }

    /// Cues accepted so far
    pub fn played(&self) -> u64 {
        self.played
    }
}

impl AudioSink for LogAudioSink {
    fn play(&mut self, cue: AudioCue) -> Result<(), AudioError> {
        if self.volume <= 0.0 {
            return Ok(());
        }
        self.played += 1;
        log::trace!("cue {:?} ({} notes)", cue, voice(cue).len());
        Ok(())
    }

    fn configure(&mut self, settings: &Settings) {
        self.volume = settings.effective_volume();
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioSink;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, Note, Wave, voice};
    use crate::error::AudioError;
    use crate::settings::Settings;
    use crate::sim::events::AudioCue;

    /// Procedural sound through the Web Audio API
    pub struct WebAudioSink {
        ctx: AudioContext,
        volume: f32,
    }

    impl WebAudioSink {
        /// May fail outside a secure context
        pub fn new(settings: &Settings) -> Result<Self, AudioError> {
            let ctx = AudioContext::new()
                .map_err(|e| AudioError::Unavailable(format!("{:?}", e)))?;
            Ok(Self {
                ctx,
                volume: settings.effective_volume(),
            })
        }

        /// Resume the context (browsers require a user gesture)
        pub fn resume(&self) {
            if self.ctx.state() == web_sys::AudioContextState::Suspended
                && self.ctx.resume().is_err()
            {
                log::warn!("AudioContext refused to resume");
            }
        }

        fn oscillator(&self, n: &Note) -> Result<(OscillatorNode, GainNode), AudioError> {
            let reject = |e: wasm_bindgen::JsValue| AudioError::Rejected(format!("{:?}", e));
            let osc = self.ctx.create_oscillator().map_err(reject)?;
            let gain = self.ctx.create_gain().map_err(reject)?;

            osc.set_type(match n.wave {
                Wave::Sine => OscillatorType::Sine,
                Wave::Square => OscillatorType::Square,
                Wave::Triangle => OscillatorType::Triangle,
                Wave::Sawtooth => OscillatorType::Sawtooth,
            });
            osc.frequency().set_value(n.freq);
            osc.connect_with_audio_node(&gain).map_err(reject)?;
            gain.connect_with_audio_node(&self.ctx.destination())
                .map_err(reject)?;
            Ok((osc, gain))
        }

        fn schedule(&self, n: &Note) -> Result<(), AudioError> {
            let reject = |e: wasm_bindgen::JsValue| AudioError::Rejected(format!("{:?}", e));
            let (osc, gain) = self.oscillator(n)?;
            let t = self.ctx.current_time() + n.delay;

            gain.gain()
                .set_value_at_time(self.volume * n.gain, t)
                .map_err(reject)?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + n.duration)
                .map_err(reject)?;
            if n.end_freq != n.freq {
                osc.frequency().set_value_at_time(n.freq, t).map_err(reject)?;
                osc.frequency()
                    .exponential_ramp_to_value_at_time(n.end_freq, t + n.duration)
                    .map_err(reject)?;
            }
            osc.start_with_when(t).map_err(reject)?;
            osc.stop_with_when(t + n.duration + 0.05).map_err(reject)?;
            Ok(())
        }
    }

    impl AudioSink for WebAudioSink {
        fn play(&mut self, cue: AudioCue) -> Result<(), AudioError> {
            if self.volume <= 0.0 {
                return Ok(());
            }
            self.resume();
            for n in voice(cue) {
                self.schedule(n)?;
            }
            Ok(())
        }

        fn configure(&mut self, settings: &Settings) {
            self.volume = settings.effective_volume();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AudioCue; 7] = [
        AudioCue::PaddleHit,
        AudioCue::BrickHit,
        AudioCue::WallHit,
        AudioCue::PowerUpCollected,
        AudioCue::LevelUp,
        AudioCue::LifeLost,
        AudioCue::GameOver,
    ];

    #[test]
    fn test_every_cue_has_a_voice() {
        for cue in ALL {
            let notes = voice(cue);
            assert!(!notes.is_empty(), "{:?}", cue);
            for n in notes {
                assert!(n.freq > 0.0 && n.end_freq > 0.0);
                assert!(n.duration > 0.0);
                assert!(n.gain > 0.0 && n.gain <= 1.0);
            }
        }
    }

    #[test]
    fn test_log_sink_counts_and_mutes() {
        let mut sink = LogAudioSink::new(&Settings::default());
        sink.play(AudioCue::BrickHit).unwrap();
        sink.play(AudioCue::WallHit).unwrap();
        assert_eq!(sink.played(), 2);

        let muted = Settings {
            muted: true,
            ..Default::default()
        };
        sink.configure(&muted);
        sink.play(AudioCue::GameOver).unwrap();
        assert_eq!(sink.played(), 2);
    }
}
