/// Sound engine: effects and looping background music via rodio.
///
/// Effect files (`collect`, `jump`, `hurt`) are read once at init into
/// in-memory buffers. A file that is missing or cannot be decoded is
/// replaced by a procedurally generated tone, so the game always has
/// feedback. Missing music just means silence.
///
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::fs::File;
    use std::io::{BufReader, Cursor};
    use std::path::Path;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

    use crate::config::AudioConfig;

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        /// Kept alive so the loop keeps playing.
        _music: Option<Sink>,
        volume: f32,
        sfx_collect: Arc<Vec<u8>>,
        sfx_jump: Arc<Vec<u8>>,
        sfx_hurt: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new(cfg: &AudioConfig) -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output device, sound disabled: {e}");
                    return None;
                }
            };

            let volume = cfg.volume.clamp(0.0, 1.0);
            let music = start_music(&handle, &cfg.music, volume);

            Some(SoundEngine {
                _stream: stream,
                handle,
                _music: music,
                volume,
                sfx_collect: Arc::new(load_effect(&cfg.collect, gen_collect)),
                sfx_jump: Arc::new(load_effect(&cfg.jump, gen_jump)),
                sfx_hurt: Arc::new(load_effect(&cfg.hurt, gen_hurt)),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = Decoder::new(cursor) {
                    sink.set_volume(self.volume);
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_collect(&self) { self.play(&self.sfx_collect); }
        pub fn play_jump(&self) { self.play(&self.sfx_jump); }
        pub fn play_hurt(&self) { self.play(&self.sfx_hurt); }
    }

    fn start_music(handle: &OutputStreamHandle, path: &Path, volume: f32) -> Option<Sink> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("music {} unavailable: {e}", path.display());
                return None;
            }
        };
        let source = match Decoder::new(BufReader::new(file)) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("cannot decode music {}: {e}", path.display());
                return None;
            }
        };
        let sink = Sink::try_new(handle).ok()?;
        sink.set_volume(volume);
        sink.append(source.repeat_infinite());
        log::info!("playing music {}", path.display());
        Some(sink)
    }

    /// Bytes of an effect file, or a generated tone if the file is missing
    /// or not decodable.
    pub(super) fn load_effect(path: &Path, fallback: fn() -> Vec<f32>) -> Vec<u8> {
        match std::fs::read(path) {
            Ok(bytes) if Decoder::new(Cursor::new(bytes.clone())).is_ok() => bytes,
            Ok(_) => {
                log::warn!("cannot decode {}, using a generated tone", path.display());
                make_wav(&fallback())
            }
            Err(e) => {
                log::warn!("{} unavailable ({e}), using a generated tone", path.display());
                make_wav(&fallback())
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Fallback tones: mono f32 samples
    // ════════════════════════════════════════════════════════════

    fn tone(freq: f32, t: f32) -> f32 {
        (t * freq * 2.0 * std::f32::consts::PI).sin()
    }

    /// Flake pickup: quick ascending arpeggio C6→E6→G6
    pub(super) fn gen_collect() -> Vec<f32> {
        let notes = [1047.0_f32, 1319.0, 1568.0];
        let n = (SAMPLE_RATE as f32 * 0.045) as usize;
        let mut samples = Vec::with_capacity(n * notes.len());
        for &freq in &notes {
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = tone(freq, t) * 0.7 + tone(freq * 3.0, t) * 0.3;
                samples.push(wave * env * 0.25);
            }
        }
        samples
    }

    /// Jump: short rising sweep
    pub(super) fn gen_jump() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.12) as usize;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                tone(300.0 + p * 500.0, t) * (1.0 - p) * 0.25
            })
            .collect()
    }

    /// Hurt: descending buzz
    pub(super) fn gen_hurt() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.25) as usize;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                let freq = 440.0 - p * 260.0;
                let square = if tone(freq, t) >= 0.0 { 1.0 } else { -1.0 };
                square * (1.0 - p).powf(0.6) * 0.2
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a 16-bit PCM buffer
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * num_channels as u32 * bits_per_sample as u32 / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new(_cfg: &crate::config::AudioConfig) -> Option<Self> { Some(SoundEngine) }
    pub fn play_collect(&self) {}
    pub fn play_jump(&self) {}
    pub fn play_hurt(&self) {}
}
