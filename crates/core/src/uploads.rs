//! Validation for user identifiers and uploaded file names.
//!
//! User ids double as directory names in the offline cache and as prefixes
//! of stored uploads, so they are restricted to a conservative alphabet.

use crate::error::CoreError;

/// Extensions accepted by the image search upload.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Extensions accepted by the audio transcription upload.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "ogg"];

/// Longest accepted user id.
pub const MAX_USER_ID_LEN: usize = 128;

/// Ensure a user id is non-empty and safe to use as a single path segment.
pub fn validate_user_id(user_id: &str) -> Result<(), CoreError> {
    if user_id.is_empty() || user_id.len() > MAX_USER_ID_LEN {
        return Err(CoreError::Validation(format!(
            "user_id must be 1-{MAX_USER_ID_LEN} characters"
        )));
    }
    if user_id == "." || user_id == ".." {
        return Err(CoreError::Validation("user_id must not be '.' or '..'".into()));
    }
    let valid = user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid {
        return Err(CoreError::Validation(format!(
            "user_id '{user_id}' may only contain letters, digits, '-', '_' and '.'"
        )));
    }
    Ok(())
}

/// Lower-cased extension of `filename`, if any.
pub fn extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Check that `filename` ends in one of `allowed` (case-insensitive).
pub fn ensure_extension(filename: &str, allowed: &[&str], kind: &str) -> Result<(), CoreError> {
    match extension(filename) {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(()),
        _ => Err(CoreError::Validation(format!("Unsupported {kind} format"))),
    }
}

/// Reduce a client-supplied file name to its final path component.
pub fn base_name(filename: &str) -> Result<&str, CoreError> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(CoreError::Validation("Missing file name".into()));
    }
    Ok(name)
}

/// Storage name for a user's upload: `<user_id>_<base name>`.
pub fn stored_upload_name(user_id: &str, filename: &str) -> Result<String, CoreError> {
    validate_user_id(user_id)?;
    Ok(format!("{user_id}_{}", base_name(filename)?))
}
