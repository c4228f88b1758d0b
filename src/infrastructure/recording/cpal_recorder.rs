//! Cross-platform clip recorder using cpal
//!
//! Captures from the default input device, mixes to mono, resamples to
//! 44.1kHz when the device rate differs, and finalizes each clip as a
//! FLAC file in the system temp directory.
//!
//! The stream is managed on a dedicated thread because cpal::Stream is
//! not Send.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use rubato::{FftFixedIn, Resampler};
use tokio::time::Duration as TokioDuration;
use uuid::Uuid;

use super::flac::{encode_to_flac, CLIP_SAMPLE_RATE};
use crate::application::ports::{CaptureError, ClipRecorder};

/// Clip recorder backed by the default cpal input device
pub struct CpalClipRecorder {
    /// Captured samples (mono, i16, at device sample rate)
    audio_buffer: Arc<StdMutex<Vec<i16>>>,
    /// Device sample rate (may differ from the 44.1kHz target)
    device_sample_rate: Arc<AtomicU32>,
    /// Capture state
    is_recording: Arc<AtomicBool>,
    /// Cached permission answer (input device availability on desktop)
    has_permission: AtomicBool,
}

impl CpalClipRecorder {
    /// Create a new recorder, probing the host for an input device
    pub fn new() -> Self {
        Self {
            audio_buffer: Arc::new(StdMutex::new(Vec::new())),
            device_sample_rate: Arc::new(AtomicU32::new(0)),
            is_recording: Arc::new(AtomicBool::new(false)),
            has_permission: AtomicBool::new(Self::probe_input_device()),
        }
    }

    /// Desktop hosts have no permission prompt; an available input device
    /// is the grant.
    fn probe_input_device() -> bool {
        cpal::default_host().default_input_device().is_some()
    }

    /// Get the default input device
    fn get_input_device() -> Result<cpal::Device, CaptureError> {
        cpal::default_host()
            .default_input_device()
            .ok_or(CaptureError::NoAudioDevice)
    }

    /// Get a suitable input configuration
    fn get_input_config(
        device: &cpal::Device,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| CaptureError::StartFailed(format!("Failed to get configs: {}", e)))?;

        // Prefer mono and configs that include the target rate; accept
        // stereo (mixed down) and other rates (resampled)
        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let includes_target = config.min_sample_rate().0 <= CLIP_SAMPLE_RATE
                && config.max_sample_rate().0 >= CLIP_SAMPLE_RATE;

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    let fewer_channels = config.channels() < current.channels();
                    let better_rate =
                        includes_target && current.min_sample_rate().0 > CLIP_SAMPLE_RATE;
                    fewer_channels || better_rate
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config.ok_or(CaptureError::StartFailed(
            "No suitable config found".into(),
        ))?;

        let sample_rate = if config_range.min_sample_rate().0 <= CLIP_SAMPLE_RATE
            && config_range.max_sample_rate().0 >= CLIP_SAMPLE_RATE
        {
            SampleRate(CLIP_SAMPLE_RATE)
        } else {
            config_range.min_sample_rate()
        };

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Resample audio from device rate to 44.1kHz if needed
    fn resample_to_target(samples: &[i16], source_rate: u32) -> Result<Vec<i16>, CaptureError> {
        if source_rate == CLIP_SAMPLE_RATE {
            return Ok(samples.to_vec());
        }

        let samples_f32: Vec<f32> = samples.iter().map(|&s| s as f32 / 32768.0).collect();

        let ratio = CLIP_SAMPLE_RATE as f64 / source_rate as f64;
        let output_len = (samples_f32.len() as f64 * ratio).ceil() as usize;

        let mut resampler = FftFixedIn::<f32>::new(
            source_rate as usize,
            CLIP_SAMPLE_RATE as usize,
            1024, // Chunk size
            2,    // Sub-chunks
            1,    // Mono
        )
        .map_err(|e| CaptureError::CaptureFailed(format!("Resampler init failed: {}", e)))?;

        let mut output = Vec::with_capacity(output_len);
        let mut input_pos = 0;

        while input_pos < samples_f32.len() {
            let frames_needed = resampler.input_frames_next();
            let end_pos = (input_pos + frames_needed).min(samples_f32.len());
            let chunk: Vec<Vec<f32>> = vec![samples_f32[input_pos..end_pos].to_vec()];

            // Pad if we don't have enough samples
            let chunk = if chunk[0].len() < frames_needed {
                let mut padded = chunk[0].clone();
                padded.resize(frames_needed, 0.0);
                vec![padded]
            } else {
                chunk
            };

            let resampled = resampler
                .process(&chunk, None)
                .map_err(|e| CaptureError::CaptureFailed(format!("Resampling failed: {}", e)))?;

            output.extend(resampled[0].iter().map(|&s| (s * 32767.0) as i16));
            input_pos = end_pos;
        }

        output.truncate(output_len);

        Ok(output)
    }

    /// Mix stereo to mono
    fn stereo_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
        if channels == 1 {
            return samples.to_vec();
        }

        samples
            .chunks(channels as usize)
            .map(|chunk| {
                let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    }

    /// Resample and encode captured PCM, then write it as a temp FLAC file
    fn finalize_clip(samples: &[i16], sample_rate: u32) -> Result<PathBuf, CaptureError> {
        let resampled = Self::resample_to_target(samples, sample_rate)?;

        let flac_data =
            encode_to_flac(&resampled).map_err(|e| CaptureError::EncodeFailed(e.to_string()))?;

        let path = std::env::temp_dir().join(format!("geodrop-{}.flac", Uuid::new_v4()));
        std::fs::write(&path, flac_data)
            .map_err(|e| CaptureError::EncodeFailed(format!("Failed to write clip: {}", e)))?;

        Ok(path)
    }
}

impl Default for CpalClipRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClipRecorder for CpalClipRecorder {
    fn has_permission(&self) -> bool {
        self.has_permission.load(Ordering::SeqCst)
    }

    async fn request_permission(&self) -> bool {
        let granted = Self::probe_input_device();
        self.has_permission.store(granted, Ordering::SeqCst);
        granted
    }

    async fn start(&self) -> Result<(), CaptureError> {
        if !self.has_permission() {
            return Err(CaptureError::PermissionDenied);
        }
        if self.is_recording.load(Ordering::SeqCst) {
            return Err(CaptureError::AlreadyRecording);
        }

        // Fail fast on a missing device before spawning the capture thread
        Self::get_input_device()?;

        {
            let mut buffer = self.audio_buffer.lock().unwrap();
            buffer.clear();
        }

        self.is_recording.store(true, Ordering::SeqCst);

        let audio_buffer = Arc::clone(&self.audio_buffer);
        let device_sample_rate = Arc::clone(&self.device_sample_rate);
        let is_recording = Arc::clone(&self.is_recording);

        // Capture runs on its own thread; the stream must live there
        std::thread::spawn(move || {
            let device = match CpalClipRecorder::get_input_device() {
                Ok(d) => d,
                Err(_) => {
                    is_recording.store(false, Ordering::SeqCst);
                    return;
                }
            };

            let (config, sample_format) = match CpalClipRecorder::get_input_config(&device) {
                Ok(c) => c,
                Err(_) => {
                    is_recording.store(false, Ordering::SeqCst);
                    return;
                }
            };

            let sample_rate = config.sample_rate.0;
            let channels = config.channels;
            device_sample_rate.store(sample_rate, Ordering::SeqCst);

            let audio_buffer_clone = Arc::clone(&audio_buffer);
            let is_recording_clone = Arc::clone(&is_recording);

            let stream_result = match sample_format {
                SampleFormat::I16 => device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        if is_recording_clone.load(Ordering::SeqCst) {
                            let mono = CpalClipRecorder::stereo_to_mono(data, channels);
                            if let Ok(mut buffer) = audio_buffer_clone.lock() {
                                buffer.extend_from_slice(&mono);
                            }
                        }
                    },
                    |err| tracing::error!("audio stream error: {}", err),
                    None,
                ),

                SampleFormat::F32 => {
                    let audio_buffer_clone = Arc::clone(&audio_buffer);
                    let is_recording_clone = Arc::clone(&is_recording);

                    device.build_input_stream(
                        &config,
                        move |data: &[f32], _: &cpal::InputCallbackInfo| {
                            if is_recording_clone.load(Ordering::SeqCst) {
                                let i16_data: Vec<i16> =
                                    data.iter().map(|&s| (s * 32767.0) as i16).collect();
                                let mono = CpalClipRecorder::stereo_to_mono(&i16_data, channels);
                                if let Ok(mut buffer) = audio_buffer_clone.lock() {
                                    buffer.extend_from_slice(&mono);
                                }
                            }
                        },
                        |err| tracing::error!("audio stream error: {}", err),
                        None,
                    )
                }

                _ => {
                    is_recording.store(false, Ordering::SeqCst);
                    return;
                }
            };

            let stream = match stream_result {
                Ok(s) => s,
                Err(_) => {
                    is_recording.store(false, Ordering::SeqCst);
                    return;
                }
            };

            if stream.play().is_err() {
                is_recording.store(false, Ordering::SeqCst);
                return;
            }

            while is_recording.load(Ordering::SeqCst) {
                std::thread::sleep(std::time::Duration::from_millis(100));
            }

            drop(stream);
        });

        // Give the thread a moment to start
        tokio::time::sleep(TokioDuration::from_millis(50)).await;

        if !self.is_recording.load(Ordering::SeqCst) {
            return Err(CaptureError::StartFailed(
                "Failed to start audio capture".into(),
            ));
        }

        Ok(())
    }

    async fn stop(&self) -> Result<Option<PathBuf>, CaptureError> {
        if !self.is_recording.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }

        // Give the capture thread a moment to wind down
        tokio::time::sleep(TokioDuration::from_millis(100)).await;

        let sample_rate = self.device_sample_rate.load(Ordering::SeqCst);
        if sample_rate == 0 {
            return Err(CaptureError::CaptureFailed("Sample rate not set".into()));
        }

        let samples = {
            let mut buffer = self.audio_buffer.lock().unwrap();
            std::mem::take(&mut *buffer)
        };

        if samples.is_empty() {
            return Err(CaptureError::CaptureFailed(
                "No audio data captured".to_string(),
            ));
        }

        // Resampling and FLAC encoding are CPU-bound
        let path =
            tokio::task::spawn_blocking(move || Self::finalize_clip(&samples, sample_rate))
                .await
                .map_err(|e| CaptureError::CaptureFailed(format!("Encode task error: {}", e)))??;

        Ok(Some(path))
    }

    async fn cancel(&self) {
        if !self.is_recording.swap(false, Ordering::SeqCst) {
            return;
        }

        tokio::time::sleep(TokioDuration::from_millis(100)).await;

        let mut buffer = self.audio_buffer.lock().unwrap();
        buffer.clear();
    }

    fn is_recording(&self) -> bool {
        self.is_recording.load(Ordering::SeqCst)
    }
}
