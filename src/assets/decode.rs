use bytes::Bytes;

use crate::foundation::error::{ScenereelError, ScenereelResult};

/// A fetched and decoded source image.
///
/// Dimensions come from decoding the bytes, never from upstream metadata.
/// The original bytes are kept alongside the pixels: the transcode strategy
/// stages them into the engine workspace untouched, while the frame-stream
/// strategy rasters from `rgba8`.
#[derive(Clone, Debug)]
pub struct ImageAsset {
    /// Position in the run's ordered image list.
    pub index: usize,
    /// Original encoded bytes as fetched.
    pub bytes: Bytes,
    /// Decoded width in pixels.
    pub width: u32,
    /// Decoded height in pixels.
    pub height: u32,
    /// Decoded pixels, tightly packed row-major RGBA8 (straight alpha).
    pub rgba8: Vec<u8>,
}

/// The narration track: raw bytes plus the decoded sample summary.
#[derive(Clone, Debug)]
pub struct AudioAsset {
    /// Original encoded bytes as fetched.
    pub bytes: Bytes,
    /// Sample rate of the decoded buffer in Hz.
    pub sample_rate: u32,
    /// Channel count of the decoded buffer.
    pub channels: u16,
    /// Decoded length in sample frames (per channel).
    pub sample_frames: u64,
}

impl AudioAsset {
    /// Decoded duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.sample_frames as f64 / f64::from(self.sample_rate.max(1))
    }
}

/// Decode image bytes, producing pixels and trusted dimensions.
///
/// Corrupt bytes are fatal for the run: skipping the scene would
/// desynchronize timing.
pub fn decode_image(index: usize, bytes: Bytes) -> ScenereelResult<ImageAsset> {
    let dyn_img = image::load_from_memory(&bytes)
        .map_err(|e| ScenereelError::decode(format!("image {index} is unreadable: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(ScenereelError::decode(format!(
            "image {index} decoded to zero dimensions"
        )));
    }

    Ok(ImageAsset {
        index,
        bytes,
        width,
        height,
        rgba8: rgba.into_raw(),
    })
}

/// File-name extension for staging the image into the engine workspace,
/// sniffed from content so the engine's demuxer guess stays accurate.
pub(crate) fn staging_extension(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png) => "png",
        Ok(image::ImageFormat::WebP) => "webp",
        _ => "jpg",
    }
}

/// Parse interleaved little-endian `f32` PCM into an [`AudioAsset`] summary.
pub(crate) fn audio_from_f32le(
    original: Bytes,
    pcm: &[u8],
    sample_rate: u32,
    channels: u16,
) -> ScenereelResult<AudioAsset> {
    if !pcm.len().is_multiple_of(4) {
        return Err(ScenereelError::decode(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let samples = (pcm.len() / 4) as u64;
    if channels == 0 || sample_rate == 0 {
        return Err(ScenereelError::decode(
            "decoded audio must have non-zero sample rate and channels",
        ));
    }
    if samples == 0 {
        return Err(ScenereelError::decode(
            "audio track decoded to zero samples",
        ));
    }

    Ok(AudioAsset {
        bytes: original,
        sample_rate,
        channels,
        sample_frames: samples / u64::from(channels),
    })
}
