//! Client-side input validation.
//!
//! These checks run before any write reaches the inventory API. A failure
//! blocks the submission and is shown inline next to the form rather than
//! in the list's error banner.

use chrono::NaiveDate;
use image::ImageFormat;
use validator::ValidationError;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Description
// ---------------------------------------------------------------------------

/// Minimum number of words in a product description (inclusive).
pub const DESCRIPTION_MIN_WORDS: usize = 5;

/// Maximum number of words in a product description (inclusive).
pub const DESCRIPTION_MAX_WORDS: usize = 200;

/// Count whitespace-separated words. Leading, trailing and repeated
/// whitespace never produce empty words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Check that a description has between 5 and 200 words, both ends inclusive.
pub fn validate_description(description: &str) -> Result<(), CoreError> {
    let words = word_count(description);
    if !(DESCRIPTION_MIN_WORDS..=DESCRIPTION_MAX_WORDS).contains(&words) {
        return Err(CoreError::Validation(format!(
            "Description must be between {DESCRIPTION_MIN_WORDS} and \
             {DESCRIPTION_MAX_WORDS} words, got {words}"
        )));
    }
    Ok(())
}

/// Adapter for `#[validate(custom(function = ...))]` on draft structs.
pub(crate) fn description_rule(description: &str) -> Result<(), ValidationError> {
    validate_description(description).map_err(|_| {
        ValidationError::new("word_count").with_message(
            format!(
                "must be between {DESCRIPTION_MIN_WORDS} and {DESCRIPTION_MAX_WORDS} words"
            )
            .into(),
        )
    })
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Maximum size of a single uploaded image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Content types accepted for product images.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// An image file selected for upload alongside a product.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    /// Content type sent in the multipart part header.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Build an upload, detecting the content type from the file header.
    ///
    /// Falls back to the file extension when the header is not a
    /// recognised image format, and to `application/octet-stream` when
    /// neither gives an answer.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = sniff_content_type(&bytes)
            .or_else(|| content_type_for_extension(&file_name))
            .unwrap_or("application/octet-stream")
            .to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }
}

fn sniff_content_type(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// Map a file extension to its image content type.
pub fn content_type_for_extension(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Check a single image's type and size.
pub fn validate_image(image: &ImageUpload) -> Result<(), CoreError> {
    if !ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
        return Err(CoreError::Validation(format!(
            "{} is not a supported image (JPEG, PNG, GIF, WebP)",
            image.file_name
        )));
    }
    if image.bytes.len() > MAX_IMAGE_BYTES {
        return Err(CoreError::Validation(format!(
            "{} is larger than {}MB",
            image.file_name,
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Check every new image and require at least one image overall.
pub fn validate_images(existing: &[String], new: &[ImageUpload]) -> Result<(), CoreError> {
    if existing.is_empty() && new.is_empty() {
        return Err(CoreError::Validation(
            "Please select at least one image".to_string(),
        ));
    }
    new.iter().try_for_each(validate_image)
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Reject dates after `today`.
pub fn validate_not_future(date: NaiveDate, today: NaiveDate, field: &str) -> Result<(), CoreError> {
    if date > today {
        return Err(CoreError::Validation(format!(
            "{field} cannot be in the future ({date} is after {today})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
