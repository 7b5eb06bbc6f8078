//! Audio capture adapter
//!
//! Wraps microphone access and chunked recording into start/stop semantics
//! producing a single WAV-encoded clip. The cpal stream lives on a
//! dedicated thread (cpal streams are not `Send`); samples are pushed into
//! the session buffer from the stream callback and simultaneously fanned
//! out to the live feed consumed by the spectrum analyser.
//!
//! Stopping is sequential: `stop` returns only after the final chunk is in
//! the assembled clip and the device handle has been dropped. Consuming the
//! session by value makes double-release impossible.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

/// Sample chunks buffered on the live feed before lagging receivers drop
const FEED_CHUNK_CAPACITY: usize = 64;

/// Capture errors
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No usable input device; surfaces to the user as permission denied
    #[error("No input device available (microphone access denied or missing)")]
    DeviceUnavailable,

    #[error("Unsupported input sample format: {0}")]
    UnsupportedFormat(String),

    #[error("Audio stream error: {0}")]
    Stream(String),

    #[error("WAV encoding error: {0}")]
    Encode(String),
}

/// Handle to the live sample feed of one recording session.
///
/// Present only while recording; a new session gets a new `id`, which is
/// what downstream consumers key their bindings on.
#[derive(Clone)]
pub struct LiveStream {
    id: Uuid,
    sample_rate: u32,
    feed: broadcast::Sender<Vec<f32>>,
}

impl LiveStream {
    /// Wrap an existing feed. Each session gets a fresh id.
    pub fn new(sample_rate: u32, feed: broadcast::Sender<Vec<f32>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sample_rate,
            feed,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Subscribe to mono sample chunks as they arrive
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<f32>> {
        self.feed.subscribe()
    }
}

/// One assembled clip, ready for the analysis client
#[derive(Debug, Clone)]
pub struct RecordedClip {
    /// Complete WAV file bytes (16-bit PCM mono)
    pub wav_bytes: Vec<u8>,
    pub sample_rate: u32,
    pub sample_count: usize,
}

/// Microphone access behind start semantics
pub trait Recorder: Send + Sync {
    /// Acquire the microphone and begin recording.
    ///
    /// Permission or device failure returns an error and recording never
    /// starts.
    fn start(&self) -> Result<Box<dyn ActiveRecording>, CaptureError>;
}

/// A running recording session. Exactly one per microphone handle.
pub trait ActiveRecording: Send {
    /// Live feed handle for the visualizer pipeline
    fn live_stream(&self) -> LiveStream;

    /// Flush the final chunk, release the device, and assemble the clip.
    ///
    /// Consumes the session; the device is released exactly once.
    fn stop(self: Box<Self>) -> Result<RecordedClip, CaptureError>;
}

/// cpal-backed recorder using the default input device
pub struct CpalRecorder;

impl Recorder for CpalRecorder {
    fn start(&self) -> Result<Box<dyn ActiveRecording>, CaptureError> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (feed_tx, _) = broadcast::channel(FEED_CHUNK_CAPACITY);
        let feed = feed_tx.clone();

        let thread = std::thread::Builder::new()
            .name("vibesync-capture".to_string())
            .spawn(move || capture_thread(ready_tx, stop_rx, feed_tx))
            .map_err(|e| CaptureError::Stream(e.to_string()))?;

        // The thread reports once the stream is built and playing
        let sample_rate = match ready_rx.recv() {
            Ok(Ok(rate)) => rate,
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(_) => {
                let _ = thread.join();
                return Err(CaptureError::Stream("capture thread died during setup".to_string()));
            }
        };

        debug!(sample_rate, "Microphone capture started");

        Ok(Box::new(CpalSession {
            stream: LiveStream::new(sample_rate, feed),
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        }))
    }
}

struct CpalSession {
    stream: LiveStream,
    stop_tx: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<Result<Vec<f32>, CaptureError>>>,
}

impl ActiveRecording for CpalSession {
    fn live_stream(&self) -> LiveStream {
        self.stream.clone()
    }

    fn stop(mut self: Box<Self>) -> Result<RecordedClip, CaptureError> {
        // Dropping the sender also unblocks the thread; the explicit send
        // keeps the intent visible
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }

        let samples = match self.thread.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| CaptureError::Stream("capture thread panicked".to_string()))??,
            None => Vec::new(),
        };

        let wav_bytes = encode_wav(&samples, self.stream.sample_rate)?;
        Ok(RecordedClip {
            wav_bytes,
            sample_rate: self.stream.sample_rate,
            sample_count: samples.len(),
        })
    }
}

/// Owns the cpal stream for the lifetime of one session. Returns the
/// accumulated mono samples once the stop signal arrives; dropping the
/// stream on exit is what releases the hardware handle.
fn capture_thread(
    ready_tx: mpsc::Sender<Result<u32, CaptureError>>,
    stop_rx: mpsc::Receiver<()>,
    feed_tx: broadcast::Sender<Vec<f32>>,
) -> Result<Vec<f32>, CaptureError> {
    let host = cpal::default_host();
    let device = match host.default_input_device() {
        Some(device) => device,
        None => {
            let _ = ready_tx.send(Err(CaptureError::DeviceUnavailable));
            return Err(CaptureError::DeviceUnavailable);
        }
    };

    let config = match device.default_input_config() {
        Ok(config) => config,
        Err(e) => {
            let err = CaptureError::Stream(e.to_string());
            let _ = ready_tx.send(Err(CaptureError::Stream(e.to_string())));
            return Err(err);
        }
    };

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    let sample_format = config.sample_format();

    let samples: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(Vec::new()));
    let samples_cb = Arc::clone(&samples);
    let err_fn = |e| warn!("Capture stream error: {e}");

    let stream_config: cpal::StreamConfig = config.into();
    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_input_stream(
            &stream_config,
            move |data: &[f32], _| {
                let mono = downmix(data, channels);
                if let Ok(mut buf) = samples_cb.lock() {
                    buf.extend_from_slice(&mono);
                }
                let _ = feed_tx.send(mono);
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_input_stream(
            &stream_config,
            move |data: &[i16], _| {
                let floats: Vec<f32> =
                    data.iter().map(|&s| f32::from(s) / f32::from(i16::MAX)).collect();
                let mono = downmix(&floats, channels);
                if let Ok(mut buf) = samples_cb.lock() {
                    buf.extend_from_slice(&mono);
                }
                let _ = feed_tx.send(mono);
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::U16 => device.build_input_stream(
            &stream_config,
            move |data: &[u16], _| {
                let floats: Vec<f32> = data
                    .iter()
                    .map(|&s| (f32::from(s) / f32::from(u16::MAX)) * 2.0 - 1.0)
                    .collect();
                let mono = downmix(&floats, channels);
                if let Ok(mut buf) = samples_cb.lock() {
                    buf.extend_from_slice(&mono);
                }
                let _ = feed_tx.send(mono);
            },
            err_fn,
            None,
        ),
        other => {
            let err = CaptureError::UnsupportedFormat(format!("{other:?}"));
            let _ = ready_tx.send(Err(CaptureError::UnsupportedFormat(format!("{other:?}"))));
            return Err(err);
        }
    }
    .map_err(|e| {
        let _ = ready_tx.send(Err(CaptureError::Stream(e.to_string())));
        CaptureError::Stream(e.to_string())
    })?;

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(CaptureError::Stream(e.to_string())));
        return Err(CaptureError::Stream(e.to_string()));
    }

    let _ = ready_tx.send(Ok(sample_rate));

    // Block until stop (or the session is dropped)
    let _ = stop_rx.recv();

    // Final chunks have already been flushed by the callback; dropping the
    // stream releases the device
    drop(stream);

    let samples = samples.lock().map_err(|_| {
        CaptureError::Stream("sample buffer poisoned".to_string())
    })?;
    Ok(samples.clone())
}

/// Average interleaved frames down to mono
fn downmix(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }
    data.chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Encode mono f32 samples as a 16-bit PCM WAV file in memory
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, CaptureError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| CaptureError::Encode(e.to_string()))?;
        for &sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
            writer
                .write_sample(value)
                .map_err(|e| CaptureError::Encode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| CaptureError::Encode(e.to_string()))?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_stereo_frames() {
        let stereo = [1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        let mono = downmix(&stereo, 2);
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn downmix_passes_mono_through() {
        let mono = [0.1, 0.2, 0.3];
        assert_eq!(downmix(&mono, 1), mono.to_vec());
    }

    #[test]
    fn encode_wav_produces_a_valid_file() {
        let samples: Vec<f32> = (0..480)
            .map(|i| (i as f32 / 480.0 * std::f32::consts::TAU).sin() * 0.5)
            .collect();
        let bytes = encode_wav(&samples, 48_000).unwrap();

        let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 48_000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 480);
    }

    #[test]
    fn encode_wav_clamps_out_of_range_samples() {
        let bytes = encode_wav(&[2.0, -2.0], 44_100).unwrap();
        let mut reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![i16::MAX, -i16::MAX]);
    }
}
