use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use lewton::inside_ogg::OggStreamReader;
use log::{debug, error, info, warn};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// --- Public API ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sound {
    Click,
    Hit,
    Miss,
}

impl Sound {
    pub const ALL: [Sound; 3] = [Sound::Click, Sound::Hit, Sound::Miss];

    pub fn file_name(self) -> &'static str {
        match self {
            Sound::Click => "click.ogg",
            Sound::Hit => "hit.ogg",
            Sound::Miss => "miss.ogg",
        }
    }
}

/// Playback capability the game drives. One music track at a time plus fire-and-forget effects.
pub trait AudioPlayer {
    /// Makes `track` the current music; does not start it.
    fn load(&mut self, track: &Path) -> Result<(), String>;
    /// Starts the current track from the beginning.
    fn play(&mut self, looped: bool);
    /// Fades the current track to silence over `duration_ms`, then stops it.
    fn fade_out(&mut self, duration_ms: u32);
    fn play_sfx(&mut self, sound: Sound);
}

/// Silent player for machines without an output device.
#[derive(Debug, Default)]
pub struct NullAudio {
    loaded: Option<PathBuf>,
}

impl AudioPlayer for NullAudio {
    fn load(&mut self, track: &Path) -> Result<(), String> {
        self.loaded = Some(track.to_path_buf());
        Ok(())
    }

    fn play(&mut self, looped: bool) {
        debug!("(silent) play {:?} looped={}", self.loaded, looped);
    }

    fn fade_out(&mut self, duration_ms: u32) {
        debug!("(silent) fade out over {} ms", duration_ms);
    }

    fn play_sfx(&mut self, _sound: Sound) {}
}

// --- Engine Commands ---
enum AudioCommand {
    PlayMusic { path: PathBuf, looped: bool },
    FadeOut(u32),
    PlaySfx(Arc<Vec<i16>>),
}

enum MixerMessage {
    Restart,
    FadeOut { frames: u32 },
    Sfx(Arc<Vec<i16>>),
}

const CHUNK_QUEUE: usize = 32;

/// cpal output with a streaming music decoder thread.
pub struct AudioEngine {
    command_sender: Sender<AudioCommand>,
    sfx_cache: HashMap<Sound, Arc<Vec<i16>>>,
    loaded: Option<PathBuf>,
}

/// A handle to a streaming music track.
struct MusicStream {
    stop_signal: Arc<AtomicBool>,
}

impl MusicStream {
    fn stop(self) {
        self.stop_signal.store(true, Ordering::Relaxed);
    }
}

#[derive(Clone, Copy)]
struct DeviceFormat {
    sample_rate: u32,
    channels: usize,
}

impl AudioEngine {
    /// Opens the default output device and preloads the effects found in `sound_dir`.
    pub fn new(sound_dir: &Path, music_volume: f32) -> Result<Self, String> {
        let (command_sender, command_receiver) = mpsc::channel();
        let (ready_sender, ready_receiver) = mpsc::channel();

        thread::Builder::new()
            .name("audio-manager".into())
            .spawn(move || audio_manager_thread(command_receiver, ready_sender, music_volume))
            .map_err(|e| format!("Failed to spawn audio thread: {}", e))?;

        let format = ready_receiver
            .recv()
            .map_err(|_| "Audio thread exited during startup".to_string())??;
        info!("Audio engine initialized ({} Hz, {} ch).", format.sample_rate, format.channels);

        let mut sfx_cache = HashMap::new();
        for sound in Sound::ALL {
            let path = sound_dir.join(sound.file_name());
            match decode_resampled(&path, format) {
                Ok(data) => {
                    sfx_cache.insert(sound, Arc::new(data));
                }
                Err(e) => warn!("Failed to load SFX '{}': {}", path.display(), e),
            }
        }

        Ok(Self { command_sender, sfx_cache, loaded: None })
    }
}

impl AudioPlayer for AudioEngine {
    fn load(&mut self, track: &Path) -> Result<(), String> {
        if !track.is_file() {
            return Err(format!("Music file '{}' does not exist", track.display()));
        }
        SoundReader::open(track).map_err(|e| format!("Music file '{}' cannot be decoded: {}", track.display(), e))?;
        self.loaded = Some(track.to_path_buf());
        Ok(())
    }

    fn play(&mut self, looped: bool) {
        let Some(path) = self.loaded.clone() else {
            warn!("play() called with no music loaded");
            return;
        };
        let _ = self.command_sender.send(AudioCommand::PlayMusic { path, looped });
    }

    fn fade_out(&mut self, duration_ms: u32) {
        let _ = self.command_sender.send(AudioCommand::FadeOut(duration_ms));
    }

    fn play_sfx(&mut self, sound: Sound) {
        if let Some(data) = self.sfx_cache.get(&sound) {
            let _ = self.command_sender.send(AudioCommand::PlaySfx(data.clone()));
        }
    }
}

// --- Engine Implementation ---

fn open_output(
    mixer_receiver: Receiver<MixerMessage>,
    chunk_receiver: Receiver<(u32, Vec<i16>)>,
    generation: Arc<AtomicU32>,
    music_volume: f32,
) -> Result<(cpal::Stream, DeviceFormat), String> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or("no audio output device")?;
    let supported = device
        .default_output_config()
        .map_err(|e| format!("no default audio config: {}", e))?;
    let stream_config: StreamConfig = supported.config();
    let format = DeviceFormat {
        sample_rate: stream_config.sample_rate.0,
        channels: stream_config.channels as usize,
    };

    let mut mixer = Mixer::new(format.channels, music_volume);
    let stream = device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _| {
                // Real-time audio callback.
                mixer.apply_messages(&mixer_receiver);
                mixer.pull_music(&chunk_receiver, generation.load(Ordering::Acquire), data.len());
                mixer.render(data);
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| format!("Failed to build audio stream: {}", e))?;
    stream.play().map_err(|e| format!("Failed to play audio stream: {}", e))?;
    Ok((stream, format))
}

/// Owns the cpal stream (not `Send` on every platform) and reacts to commands.
fn audio_manager_thread(
    command_receiver: Receiver<AudioCommand>,
    ready: Sender<Result<DeviceFormat, String>>,
    music_volume: f32,
) {
    let (mixer_sender, mixer_receiver) = mpsc::channel();
    let (chunk_sender, chunk_receiver) = mpsc::sync_channel(CHUNK_QUEUE);
    let generation = Arc::new(AtomicU32::new(0));

    let (_stream, format) = match open_output(mixer_receiver, chunk_receiver, generation.clone(), music_volume) {
        Ok(opened) => opened,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    let _ = ready.send(Ok(format));

    let mut music: Option<MusicStream> = None;
    let mut stop_at: Option<Instant> = None;

    loop {
        let command = match stop_at {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                match command_receiver.recv_timeout(wait) {
                    Ok(cmd) => Some(cmd),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match command_receiver.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => break,
            },
        };

        match command {
            None => {
                // Fade finished.
                if let Some(old) = music.take() {
                    old.stop();
                }
                generation.fetch_add(1, Ordering::AcqRel);
                stop_at = None;
                debug!("Music stopped after fade-out.");
            }
            Some(AudioCommand::PlaySfx(data)) => {
                let _ = mixer_sender.send(MixerMessage::Sfx(data));
            }
            Some(AudioCommand::PlayMusic { path, looped }) => {
                if let Some(old) = music.take() {
                    old.stop();
                }
                stop_at = None;
                let current = generation.fetch_add(1, Ordering::AcqRel) + 1;
                let _ = mixer_sender.send(MixerMessage::Restart);
                music = Some(spawn_music_decoder_thread(path, looped, format, current, chunk_sender.clone()));
            }
            Some(AudioCommand::FadeOut(ms)) => {
                if music.is_none() {
                    continue;
                }
                let frames = (ms as u64 * format.sample_rate as u64 / 1000).max(1) as u32;
                let _ = mixer_sender.send(MixerMessage::FadeOut { frames });
                stop_at = Some(Instant::now() + Duration::from_millis(ms as u64));
            }
        }
    }
    if let Some(old) = music.take() {
        old.stop();
    }
}

/// Callback-side state: queued music samples, the music gain ramp and live effects.
struct Mixer {
    channels: usize,
    volume: f32,
    gain: f32,
    fade_step: f32,
    music: VecDeque<i16>,
    active_sfx: Vec<(Arc<Vec<i16>>, usize)>,
}

impl Mixer {
    fn new(channels: usize, volume: f32) -> Self {
        Self {
            channels: channels.max(1),
            volume: volume.clamp(0.0, 1.0),
            gain: 1.0,
            fade_step: 0.0,
            music: VecDeque::with_capacity(1 << 16),
            active_sfx: Vec::new(),
        }
    }

    fn apply_messages(&mut self, receiver: &Receiver<MixerMessage>) {
        for message in receiver.try_iter() {
            match message {
                MixerMessage::Restart => {
                    self.music.clear();
                    self.gain = 1.0;
                    self.fade_step = 0.0;
                }
                MixerMessage::FadeOut { frames } => {
                    self.fade_step = self.gain / frames.max(1) as f32;
                }
                MixerMessage::Sfx(data) => self.active_sfx.push((data, 0)),
            }
        }
    }

    /// Drains chunks until `wanted` samples are queued; stale generations are dropped.
    fn pull_music(&mut self, receiver: &Receiver<(u32, Vec<i16>)>, generation: u32, wanted: usize) {
        while self.music.len() < wanted {
            match receiver.try_recv() {
                Ok((chunk_generation, chunk)) => {
                    if chunk_generation == generation {
                        self.music.extend(chunk);
                    }
                }
                Err(_) => break,
            }
        }
    }

    fn render(&mut self, out: &mut [f32]) {
        for frame in out.chunks_mut(self.channels) {
            for sample in frame.iter_mut() {
                let m = self.music.pop_front().unwrap_or(0) as f32 / 32768.0;
                *sample = m * self.gain * self.volume;
            }
            if self.fade_step > 0.0 {
                self.gain = (self.gain - self.fade_step).max(0.0);
                if self.gain == 0.0 {
                    self.fade_step = 0.0;
                }
            }
        }

        self.active_sfx.retain_mut(|(data, cursor)| {
            let n = (data.len() - *cursor).min(out.len());
            for (o, s) in out[..n].iter_mut().zip(&data[*cursor..*cursor + n]) {
                *o = (*o + *s as f32 / 32768.0).clamp(-1.0, 1.0);
            }
            *cursor += n;
            *cursor < data.len()
        });
    }
}

/// Spawns a thread to decode and resample a single music file.
fn spawn_music_decoder_thread(
    path: PathBuf,
    looped: bool,
    format: DeviceFormat,
    generation: u32,
    sender: SyncSender<(u32, Vec<i16>)>,
) -> MusicStream {
    let stop_signal = Arc::new(AtomicBool::new(false));
    let stop = stop_signal.clone();

    thread::spawn(move || {
        loop {
            match decode_music_pass(&path, format, generation, &sender, &stop) {
                Ok(()) => {}
                Err(e) => {
                    error!("Music decoder failed for '{}': {}", path.display(), e);
                    break;
                }
            }
            if !looped || stop.load(Ordering::Relaxed) {
                break;
            }
        }
    });

    MusicStream { stop_signal }
}

type DecodeError = Box<dyn std::error::Error + Send + Sync>;

/// Interleaved i16 packet source. Ogg Vorbis goes through lewton, mp3 and wav through symphonia.
enum SoundReader {
    Ogg(OggStreamReader<BufReader<File>>),
    Probed {
        format: Box<dyn FormatReader>,
        decoder: Box<dyn Decoder>,
        track_id: u32,
        sample_rate: u32,
        channels: usize,
    },
}

impl SoundReader {
    fn open(path: &Path) -> Result<Self, DecodeError> {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        if extension.eq_ignore_ascii_case("ogg") {
            return Ok(SoundReader::Ogg(OggStreamReader::new(BufReader::new(File::open(path)?))?));
        }

        let source = MediaSourceStream::new(Box::new(File::open(path)?), Default::default());
        let mut hint = Hint::new();
        hint.with_extension(extension);
        let probed = symphonia::default::get_probe().format(
            &hint,
            source,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let format = probed.format;
        let track = format.default_track().ok_or("no audio track")?;
        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.ok_or("unknown sample rate")?;
        let channels = track.codec_params.channels.map_or(0, |layout| layout.count());
        if channels == 0 {
            return Err("unknown channel layout".into());
        }
        let decoder = symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;
        Ok(SoundReader::Probed { format, decoder, track_id, sample_rate, channels })
    }

    fn sample_rate(&self) -> u32 {
        match self {
            SoundReader::Ogg(ogg) => ogg.ident_hdr.audio_sample_rate,
            SoundReader::Probed { sample_rate, .. } => *sample_rate,
        }
    }

    fn channels(&self) -> usize {
        match self {
            SoundReader::Ogg(ogg) => ogg.ident_hdr.audio_channels as usize,
            SoundReader::Probed { channels, .. } => *channels,
        }
    }

    /// Next decoded packet; `None` at end of stream.
    fn next_samples(&mut self) -> Result<Option<Vec<i16>>, DecodeError> {
        match self {
            SoundReader::Ogg(ogg) => Ok(ogg.read_dec_packet_itl()?),
            SoundReader::Probed { format, decoder, track_id, .. } => loop {
                let packet = match format.next_packet() {
                    Ok(packet) => packet,
                    Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
                    Err(e) => return Err(e.into()),
                };
                if packet.track_id() != *track_id {
                    continue;
                }
                match decoder.decode(&packet) {
                    Ok(decoded) => {
                        let mut buffer = SampleBuffer::<i16>::new(decoded.capacity() as u64, *decoded.spec());
                        buffer.copy_interleaved_ref(decoded);
                        return Ok(Some(buffer.samples().to_vec()));
                    }
                    Err(SymphoniaError::DecodeError(e)) => warn!("Skipping undecodable packet: {}", e),
                    Err(e) => return Err(e.into()),
                }
            },
        }
    }

    fn resampler_for(&self, format: DeviceFormat) -> LinearResampler {
        LinearResampler::new(self.sample_rate(), format.sample_rate, self.channels(), format.channels)
    }
}

fn decode_music_pass(
    path: &Path,
    format: DeviceFormat,
    generation: u32,
    sender: &SyncSender<(u32, Vec<i16>)>,
    stop: &AtomicBool,
) -> Result<(), DecodeError> {
    let mut reader = SoundReader::open(path)?;
    let mut resampler = reader.resampler_for(format);

    while let Some(packet) = reader.next_samples()? {
        if stop.load(Ordering::Relaxed) {
            return Ok(());
        }
        let mut chunk = Vec::with_capacity(packet.len() * 2);
        resampler.process(&packet, &mut chunk);
        if !chunk.is_empty() && sender.send((generation, chunk)).is_err() {
            return Ok(());
        }
    }
    Ok(())
}

/// Loads a sound file fully into memory at the device's rate and channel count.
fn decode_resampled(path: &Path, format: DeviceFormat) -> Result<Vec<i16>, DecodeError> {
    let mut reader = SoundReader::open(path)?;
    let mut resampler = reader.resampler_for(format);
    let mut data = Vec::new();
    while let Some(packet) = reader.next_samples()? {
        resampler.process(&packet, &mut data);
    }
    Ok(data)
}

/// Linear-interpolating rate and channel converter for interleaved i16.
struct LinearResampler {
    in_ch: usize,
    out_ch: usize,
    step: f64,
    pos: f64,
    last: Vec<i16>,
}

impl LinearResampler {
    fn new(in_hz: u32, out_hz: u32, in_ch: usize, out_ch: usize) -> Self {
        let in_ch = in_ch.max(1);
        Self {
            in_ch,
            out_ch: out_ch.max(1),
            step: in_hz.max(1) as f64 / out_hz.max(1) as f64,
            pos: 1.0,
            last: vec![0; in_ch],
        }
    }

    fn process(&mut self, input: &[i16], out: &mut Vec<i16>) {
        let frames_in = input.len() / self.in_ch;
        if frames_in == 0 {
            return;
        }
        let in_ch = self.in_ch;
        let last = &self.last;
        // Index 0 is the carried frame from the previous packet.
        let sample = |frame: usize, ch: usize| -> f32 {
            if frame == 0 { last[ch] as f32 } else { input[(frame - 1) * in_ch + ch] as f32 }
        };

        let mut pos = self.pos;
        while pos + 1.0 <= frames_in as f64 {
            let i = pos.floor() as usize;
            let t = (pos - i as f64) as f32;
            for oc in 0..self.out_ch {
                let ch = oc % in_ch;
                let a = sample(i, ch);
                let b = sample(i + 1, ch);
                out.push((a + (b - a) * t).clamp(-32768.0, 32767.0) as i16);
            }
            pos += self.step;
        }

        self.pos = pos - frames_in as f64;
        self.last = input[(frames_in - 1) * in_ch..frames_in * in_ch].to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resampler_identity_rate_passes_samples_through() {
        let mut rs = LinearResampler::new(44_100, 44_100, 1, 1);
        let mut out = Vec::new();
        rs.process(&[10, 20, 30], &mut out);
        assert_eq!(out, vec![10, 20]);
        // The newest frame is held until the next packet arrives.
        rs.process(&[40, 50], &mut out);
        assert_eq!(out, vec![10, 20, 30, 40]);
    }

    #[test]
    fn resampler_upmixes_mono_to_stereo() {
        let mut rs = LinearResampler::new(48_000, 48_000, 1, 2);
        let mut out = Vec::new();
        rs.process(&[7, -7, 0], &mut out);
        assert_eq!(out, vec![7, 7, -7, -7]);
    }

    #[test]
    fn resampler_doubles_rate() {
        let mut rs = LinearResampler::new(22_050, 44_100, 1, 1);
        let mut out = Vec::new();
        rs.process(&[0, 100, 200], &mut out);
        assert_eq!(out, vec![0, 50, 100, 150]);
    }

    fn pcm16_wav(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&channels.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * channels as u32 * 2).to_le_bytes());
        bytes.extend_from_slice(&(channels * 2).to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn wav_tracks_decode_like_ogg_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples = [0i16, 1000, -1000, 32767, -32768, 12];
        std::fs::write(&path, pcm16_wav(22_050, 2, &samples)).unwrap();

        let mut reader = SoundReader::open(&path).unwrap();
        assert_eq!(reader.sample_rate(), 22_050);
        assert_eq!(reader.channels(), 2);
        let mut decoded = Vec::new();
        while let Some(packet) = reader.next_samples().unwrap() {
            decoded.extend(packet);
        }
        assert_eq!(decoded, samples);
    }

    #[test]
    fn unreadable_tracks_fail_to_open() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["noise.mp3", "noise.wav", "noise.ogg"] {
            let path = dir.path().join(name);
            std::fs::write(&path, b"definitely not audio").unwrap();
            assert!(SoundReader::open(&path).is_err(), "{name} opened");
        }
        assert!(SoundReader::open(&dir.path().join("missing.wav")).is_err());
    }

    #[test]
    fn mixer_fade_reaches_silence() {
        let mut mixer = Mixer::new(1, 1.0);
        mixer.music.extend(std::iter::repeat(16_384).take(8));
        mixer.fade_step = 0.25;
        let mut out = [0.0f32; 8];
        mixer.render(&mut out);
        assert!(out[0] > 0.0);
        assert_eq!(out[4], 0.0);
        assert_eq!(mixer.gain, 0.0);
    }
}
