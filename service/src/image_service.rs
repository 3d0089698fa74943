//! Photo normalization.
//!
//! Photos arrive as base64 text, are stored as raw bytes bounded to a
//! 300x300 box, and leave again as base64. Every public function here is
//! total: undecodable text becomes "no photo" and bytes that cannot be
//! resized are passed through as they are.

use crate::domain::dimension::{Dimension, Dimensions, BOUNDING_BOX};
use crate::domain::error::ImageError;
use base64::alphabet;
use base64::engine::general_purpose::STANDARD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use fast_image_resize::{FilterType, ResizeAlg, ResizeOptions, Resizer, SrcCropping};
use image::{ColorType, DynamicImage, ImageFormat, ImageReader, Limits};
use std::borrow::Cow;
use std::io::Cursor;
use tracing::{debug, error, instrument, warn};

/// Every resized photo is written in this format, whatever it came in as.
pub const OUTPUT_FORMAT: ImageFormat = ImageFormat::Jpeg;

const RESIZE_OPTS: ResizeOptions = ResizeOptions {
    algorithm: ResizeAlg::Convolution(FilterType::Bilinear),
    cropping: SrcCropping::None,
    mul_div_alpha: false,
};

/// Clients may send the padding or strip it.
const LENIENT_DECODER: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

const MAX_SIDE: u32 = 16_384;
const MAX_DECODE_ALLOC: u64 = 128 * 1024 * 1024;

/// Base64 text to raw bytes. `None` for absent, empty or malformed text.
#[instrument(skip_all, fields(len = text.map(str::len)))]
pub fn decode_photo(text: Option<&str>) -> Option<Vec<u8>> {
    let text = text.filter(|text| !text.is_empty())?;
    match decode_base64(text) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("Dropping photo: {e}");
            None
        }
    }
}

/// Raw bytes to base64 text, resizing first when the photo is oversized.
///
/// Falls back to the original bytes if resizing fails, so any non-empty
/// input yields `Some`.
#[instrument(skip_all, fields(len = raw.map(<[u8]>::len)))]
pub fn encode_photo(raw: Option<&[u8]>) -> Option<String> {
    let raw = raw.filter(|raw| !raw.is_empty())?;
    Some(STANDARD.encode(or_original(raw, resize_photo(raw))))
}

/// Decode client text and bound it for storage.
pub fn photo_from_text(text: Option<&str>) -> Option<Vec<u8>> {
    decode_photo(text).map(normalize_photo)
}

/// Bound owned bytes for storage, keeping them as-is when they cannot be resized.
pub fn normalize_photo(raw: Vec<u8>) -> Vec<u8> {
    let resized = match or_original(&raw, resize_photo(&raw)) {
        Cow::Owned(bytes) => Some(bytes),
        Cow::Borrowed(_) => None,
    };
    resized.unwrap_or(raw)
}

fn or_original<'a>(raw: &'a [u8], resized: Result<Cow<'a, [u8]>, ImageError>) -> Cow<'a, [u8]> {
    resized.unwrap_or_else(|e| {
        error!("Could not resize photo, keeping original bytes: {e}");
        Cow::Borrowed(raw)
    })
}

/// Shrink `raw` into the bounding box and re-encode it as JPEG.
///
/// Borrows the input back unchanged when it is not a readable image or
/// already fits. Only faults while resampling or writing are returned.
pub fn resize_photo(raw: &[u8]) -> Result<Cow<'_, [u8]>, ImageError> {
    let header = match read_dimensions(raw) {
        Ok(dimensions) => dimensions,
        Err(ImageError::Io(e)) => return Err(ImageError::Io(e)),
        Err(e) => {
            debug!("Passing photo through: {e}");
            return Ok(Cow::Borrowed(raw));
        }
    };

    if header.fits_within(BOUNDING_BOX) {
        debug!("Photo is {}x{}, no resize needed", header.width, header.height);
        return Ok(Cow::Borrowed(raw));
    }

    let (source, dimensions) = match load_image(raw) {
        Ok(loaded) => loaded,
        Err(e) => {
            warn!("Passing photo through: {e}");
            return Ok(Cow::Borrowed(raw));
        }
    };
    if dimensions.fits_within(BOUNDING_BOX) {
        return Ok(Cow::Borrowed(raw));
    }

    let target = Dimension::bounding(dimensions, BOUNDING_BOX).scale(dimensions);
    let resized = resize_image(&source, target)?;
    let bytes = encode_image(&resized)?;
    debug!(
        "Photo resized {}x{} -> {}x{}",
        dimensions.width, dimensions.height, target.width, target.height
    );
    Ok(Cow::Owned(bytes))
}

fn decode_base64(text: &str) -> Result<Vec<u8>, ImageError> {
    Ok(LENIENT_DECODER.decode(text)?)
}

/// Sniff the format and read only the header.
fn read_dimensions(raw: &[u8]) -> Result<Dimensions, ImageError> {
    let reader = ImageReader::new(Cursor::new(raw)).with_guessed_format()?;
    if reader.format().is_none() {
        return Err(ImageError::UnsupportedFormat);
    }
    let (width, height) = reader.into_dimensions().map_err(ImageError::Corrupt)?;
    Dimensions::new(width, height).ok_or(ImageError::EmptyDimension { width, height })
}

fn decode_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_SIDE);
    limits.max_image_height = Some(MAX_SIDE);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    limits
}

fn load_image(raw: &[u8]) -> Result<(DynamicImage, Dimensions), ImageError> {
    load_image_within(raw, decode_limits())
}

fn load_image_within(raw: &[u8], limits: Limits) -> Result<(DynamicImage, Dimensions), ImageError> {
    let mut reader = ImageReader::new(Cursor::new(raw)).with_guessed_format()?;
    reader.limits(limits);
    let image = reader.decode().map_err(ImageError::Corrupt)?;
    let (width, height) = (image.width(), image.height());
    let dimensions =
        Dimensions::new(width, height).ok_or(ImageError::EmptyDimension { width, height })?;
    Ok((image, dimensions))
}

/// Resample into an opaque RGB buffer of `target` size.
fn resize_image(source: &DynamicImage, target: Dimensions) -> Result<DynamicImage, ImageError> {
    let opaque = match source {
        DynamicImage::ImageRgb8(_) => Cow::Borrowed(source),
        other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
    };
    let mut dst_image = DynamicImage::new(target.width, target.height, ColorType::Rgb8);
    let mut resizer: Resizer = Resizer::new();
    resizer.resize(&*opaque, &mut dst_image, &RESIZE_OPTS)?;
    Ok(dst_image)
}

fn encode_image(image: &DynamicImage) -> Result<Vec<u8>, ImageError> {
    let mut bytes: Vec<u8> = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), OUTPUT_FORMAT)
        .map_err(ImageError::Encode)?;
    Ok(bytes)
}
