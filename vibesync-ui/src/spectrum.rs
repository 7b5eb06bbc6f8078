//! Spectrum analyser
//!
//! Frequency-analysis node bound to one live stream. Fixed 256-sample
//! analysis window yielding 128 magnitude bins, sampled as bytes the way
//! the visualizer consumes them. Created at most once per stream lifetime
//! and reused across animation frames.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::capture::LiveStream;

/// Analysis window size (power of two)
pub const FFT_SIZE: usize = 256;

/// Frequency bins per snapshot
pub const BIN_COUNT: usize = FFT_SIZE / 2;

// Byte conversion range and inter-frame smoothing
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;
const SMOOTHING: f32 = 0.8;

/// Frequency analyser for one recording session
pub struct SpectrumAnalyser {
    stream_id: Uuid,
    feed: broadcast::Receiver<Vec<f32>>,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    /// Most recent FFT_SIZE samples; a short feed keeps the previous tail
    ring: Vec<f32>,
    /// Smoothed linear magnitudes carried between frames
    smoothed: [f32; BIN_COUNT],
    scratch: Vec<Complex<f32>>,
}

impl SpectrumAnalyser {
    /// Bind an analyser to a live stream
    pub fn bind(stream: &LiveStream) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        // Hann window
        let window: Vec<f32> = (0..FFT_SIZE)
            .map(|i| {
                0.5 * (1.0
                    - (2.0 * std::f32::consts::PI * i as f32 / (FFT_SIZE - 1) as f32).cos())
            })
            .collect();

        Self {
            stream_id: stream.id(),
            feed: stream.subscribe(),
            fft,
            window,
            ring: vec![0.0; FFT_SIZE],
            smoothed: [0.0; BIN_COUNT],
            scratch: vec![Complex::default(); FFT_SIZE],
        }
    }

    /// Identity of the stream this analyser is bound to
    pub fn stream_id(&self) -> Uuid {
        self.stream_id
    }

    /// Append samples to the analysis window, keeping the last FFT_SIZE
    pub fn push_samples(&mut self, samples: &[f32]) {
        if samples.len() >= FFT_SIZE {
            self.ring.copy_from_slice(&samples[samples.len() - FFT_SIZE..]);
            return;
        }
        self.ring.rotate_left(samples.len());
        let start = FFT_SIZE - samples.len();
        self.ring[start..].copy_from_slice(samples);
    }

    /// Current byte-valued magnitude per bin, values in [0, 255].
    ///
    /// Drains any pending feed chunks first, then windows, transforms, and
    /// converts smoothed magnitudes through the fixed dB range.
    pub fn byte_frequency_data(&mut self, out: &mut [u8; BIN_COUNT]) {
        self.drain_feed();

        for (i, slot) in self.scratch.iter_mut().enumerate() {
            *slot = Complex::new(self.ring[i] * self.window[i], 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (i, byte) in out.iter_mut().enumerate() {
            let magnitude = self.scratch[i].norm() / FFT_SIZE as f32;
            self.smoothed[i] = SMOOTHING * self.smoothed[i] + (1.0 - SMOOTHING) * magnitude;

            let db = if self.smoothed[i] > 0.0 {
                20.0 * self.smoothed[i].log10()
            } else {
                MIN_DB
            };
            let scaled = (db - MIN_DB) / (MAX_DB - MIN_DB);
            *byte = (scaled.clamp(0.0, 1.0) * 255.0) as u8;
        }
    }

    fn drain_feed(&mut self) {
        loop {
            match self.feed.try_recv() {
                Ok(chunk) => self.push_samples(&chunk),
                // Lagging just skips stale chunks
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast;

    fn analyser() -> (SpectrumAnalyser, broadcast::Sender<Vec<f32>>) {
        let (tx, _) = broadcast::channel(8);
        let stream = LiveStream::new(48_000, tx.clone());
        (SpectrumAnalyser::bind(&stream), tx)
    }

    #[test]
    fn yields_128_bins() {
        assert_eq!(BIN_COUNT, 128);
        assert_eq!(FFT_SIZE, 256);
    }

    #[test]
    fn silence_maps_to_zero_bytes() {
        let (mut analyser, _tx) = analyser();
        let mut bins = [0u8; BIN_COUNT];
        analyser.byte_frequency_data(&mut bins);
        assert!(bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn a_tone_raises_its_bin_above_the_rest() {
        let (mut analyser, _tx) = analyser();

        // Bin 8, quiet enough that no bin clamps at the top of the dB range
        let samples: Vec<f32> = (0..FFT_SIZE)
            .map(|i| 0.02 * (std::f32::consts::TAU * 8.0 * i as f32 / FFT_SIZE as f32).sin())
            .collect();

        let mut bins = [0u8; BIN_COUNT];
        // Repeated frames let the smoothing converge
        for _ in 0..20 {
            analyser.push_samples(&samples);
            analyser.byte_frequency_data(&mut bins);
        }

        let peak = bins
            .iter()
            .enumerate()
            .max_by_key(|(_, &v)| v)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 8);
        assert!(bins[8] > bins[40]);
    }

    #[test]
    fn short_pushes_keep_the_previous_tail() {
        let (mut analyser, _tx) = analyser();
        analyser.push_samples(&vec![1.0; FFT_SIZE]);
        analyser.push_samples(&[0.5; 16]);
        assert_eq!(analyser.ring[FFT_SIZE - 1], 0.5);
        assert_eq!(analyser.ring[0], 1.0);
    }

    #[test]
    fn feed_chunks_are_drained_on_snapshot() {
        let (mut analyser, tx) = analyser();
        let loud: Vec<f32> = (0..FFT_SIZE)
            .map(|i| (std::f32::consts::TAU * 4.0 * i as f32 / FFT_SIZE as f32).sin())
            .collect();
        tx.send(loud).unwrap();

        let mut bins = [0u8; BIN_COUNT];
        analyser.byte_frequency_data(&mut bins);
        assert!(bins.iter().any(|&b| b > 0));
    }
}
