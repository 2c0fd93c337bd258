//! Audio loading: decode, mono downmix and resampling to the model rate.
//!
//! WAV files go through `hound`; every other container (mp3, ogg, webm,
//! flac, ...) is detected and decoded with `symphonia`.

use std::fs::File;
use std::path::Path;

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::PipelineError;

/// Sample rate every model input is converted to.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Clips shorter than this after resampling are rejected.
pub const MIN_DURATION_SECS: f64 = 0.1;

/// Raw interleaved PCM as read from an audio file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Read a WAV file into interleaved `f32` samples in `[-1, 1]`.
pub fn read_wav(path: &Path) -> Result<DecodedAudio, PipelineError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };
    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Decode the first audio track of any container symphonia recognises.
///
/// Corrupt packets are skipped. A file with no recognisable container or
/// codec is reported as [`PipelineError::UnsupportedFormat`].
pub fn decode_compressed(path: &Path) -> Result<DecodedAudio, PipelineError> {
    let unsupported = |e: SymphoniaError| match e {
        SymphoniaError::Unsupported(_) => PipelineError::UnsupportedFormat(path.to_path_buf()),
        other => PipelineError::Decode(other),
    };

    let file = File::open(path)?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let detected = symphonia::default::get_probe()
        .format(&hint, stream, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(unsupported)?;
    let mut format = detected.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PipelineError::UnsupportedFormat(path.to_path_buf()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track.codec_params.channels.map_or(0, |c| c.count() as u16);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(unsupported)?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count() as u16;
                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                tracing::debug!(path = %path.display(), error = msg, "Skipping corrupt packet");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Average interleaved channels into one.
pub fn downmix(interleaved: &[f32], channels: u16) -> Vec<f32> {
    let channels = usize::from(channels.max(1));
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample a mono signal in a single pass.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, PipelineError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if from_rate == 0 {
        return Err(PipelineError::InvalidInput("sample rate of 0".to_string()));
    }

    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let mut resampler =
        FastFixedIn::<f32>::new(ratio, 1.0, PolynomialDegree::Septic, samples.len(), 1)
            .map_err(|e| PipelineError::Resample(e.to_string()))?;

    let output = resampler
        .process(&[samples], None)
        .map_err(|e| PipelineError::Resample(e.to_string()))?;

    output
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::Resample("resampler returned no channels".to_string()))
}

/// Load any supported clip as mono 16 kHz samples.
///
/// Undecodable files fail with an error so dataset scans can skip them.
pub fn load_audio(path: &Path) -> Result<Vec<f32>, PipelineError> {
    let is_wav = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
    let decoded = if is_wav {
        read_wav(path)?
    } else {
        decode_compressed(path)?
    };

    let mono = downmix(&decoded.samples, decoded.channels);
    let samples = resample(&mono, decoded.sample_rate, TARGET_SAMPLE_RATE)?;

    let min = (f64::from(TARGET_SAMPLE_RATE) * MIN_DURATION_SECS) as usize;
    if samples.len() < min {
        return Err(PipelineError::TooShort {
            samples: samples.len(),
            min,
        });
    }
    Ok(samples)
}
