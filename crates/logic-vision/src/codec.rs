//! Image decode/encode between files and normalized color fields.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use ndarray::Array3;

use crate::types::{ColorField, Real, VisionError, VisionResult, CHANNELS};

/// Largest byte value, used as the normalization divisor.
const BYTE_MAX: Real = 255.0;

/// A decoded image as a normalized color field.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub field: ColorField,
    pub shape: (usize, usize, usize),
    pub original_format: Option<ImageFormat>,
}

/// Load an image file into a 3-channel field normalized to [0, 1].
///
/// Grayscale, alpha and other layouts are converted to RGB first.
pub fn decode(path: impl AsRef<Path>) -> VisionResult<DecodedImage> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(VisionError::InputNotFound(path.to_path_buf()));
    }

    let decode_err = |source: image::ImageError| VisionError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| decode_err(image::ImageError::IoError(e)))?;
    let original_format = reader.format();
    let img = reader.decode().map_err(decode_err)?;

    let field = field_from_image(&img);
    let shape = field.dim();
    tracing::info!(
        "Decoded {} ({}x{}, format {:?})",
        path.display(),
        shape.1,
        shape.0,
        original_format
    );

    Ok(DecodedImage {
        field,
        shape,
        original_format,
    })
}

/// Clip a field to [0, 1], quantize it to bytes and write it to `path`.
///
/// The output format follows the file extension. The image is written to a
/// temporary file next to the destination and renamed into place, so the
/// destination is untouched when encoding fails.
pub fn encode(field: &ColorField, path: impl AsRef<Path>) -> VisionResult<()> {
    let path = path.as_ref();
    let encode_err = |reason: String| VisionError::Encode {
        path: path.to_path_buf(),
        reason,
    };

    let format = ImageFormat::from_path(path).map_err(|e| encode_err(e.to_string()))?;
    let rgb = image_from_field(field).map_err(|e| encode_err(e.to_string()))?;

    let dir = destination_dir(path);
    let mut tmp = tempfile::NamedTempFile::new_in(&dir)
        .map_err(|e| encode_err(format!("cannot create temporary file: {e}")))?;
    rgb.write_to(tmp.as_file_mut(), format)
        .map_err(|e| encode_err(e.to_string()))?;
    output_permissions(path, tmp.as_file())
        .and_then(|perms| tmp.as_file().set_permissions(perms))
        .map_err(|e| encode_err(format!("cannot set permissions: {e}")))?;
    tmp.persist(path)
        .map_err(|e| encode_err(format!("cannot move into place: {}", e.error)))?;

    tracing::info!(
        "Encoded {}x{} field to {}",
        rgb.width(),
        rgb.height(),
        path.display()
    );
    Ok(())
}

/// Normalize an in-memory image to a color field.
pub fn field_from_image(img: &DynamicImage) -> ColorField {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    Array3::from_shape_fn((h as usize, w as usize, CHANNELS), |(y, x, c)| {
        Real::from(rgb.get_pixel(x as u32, y as u32)[c]) / BYTE_MAX
    })
}

/// Clip and quantize a color field into an RGB image.
///
/// Quantization truncates toward zero after scaling by 255.
pub fn image_from_field(field: &ColorField) -> VisionResult<RgbImage> {
    let (h, w, c) = field.dim();
    if c != CHANNELS {
        return Err(VisionError::ShapeMismatch {
            field: "color",
            expected: (h, w, CHANNELS),
            found: (h, w, c),
        });
    }

    let width = u32::try_from(w)
        .map_err(|_| VisionError::MalformedData(format!("width {w} too large")))?;
    let height = u32::try_from(h)
        .map_err(|_| VisionError::MalformedData(format!("height {h} too large")))?;

    Ok(RgbImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as usize, y as usize);
        image::Rgb([
            quantize(field[[y, x, 0]]),
            quantize(field[[y, x, 1]]),
            quantize(field[[y, x, 2]]),
        ])
    }))
}

fn quantize(value: Real) -> u8 {
    // NaN clamps to NaN and casts to 0.
    (value.clamp(0.0, 1.0) * BYTE_MAX) as u8
}

/// Permissions for the written file: those of the file being replaced, otherwise
/// 0644 on Unix.
fn output_permissions(path: &Path, tmp: &std::fs::File) -> std::io::Result<std::fs::Permissions> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.permissions()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Ok(new_file_permissions(tmp.metadata()?.permissions()))
        }
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn new_file_permissions(_tmp: std::fs::Permissions) -> std::fs::Permissions {
    use std::os::unix::fs::PermissionsExt;
    std::fs::Permissions::from_mode(0o644)
}

#[cfg(not(unix))]
fn new_file_permissions(tmp: std::fs::Permissions) -> std::fs::Permissions {
    tmp
}

fn destination_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
