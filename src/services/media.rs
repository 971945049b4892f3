// Media policy
// Application-enforced upload limits; the storage layer itself imposes none.
// Photos: ≤10MB, any image/* type. Video: ≤350MB, mp4/webm/ogg only.

use thiserror::Error;

pub const MAX_PHOTO_BYTES: u64 = 10 * 1024 * 1024;
pub const MAX_VIDEO_BYTES: u64 = 350 * 1024 * 1024;

const ALLOWED_VIDEO_TYPES: [&str; 3] = ["video/mp4", "video/webm", "video/ogg"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaPolicyError {
    #[error("File too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    #[error("Unsupported media type: {0}")]
    UnsupportedType(String),
}

/// Kind of media being uploaded, selecting the policy row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    pub fn max_bytes(&self) -> u64 {
        match self {
            MediaKind::Photo => MAX_PHOTO_BYTES,
            MediaKind::Video => MAX_VIDEO_BYTES,
        }
    }

    fn accepts(&self, content_type: &str) -> bool {
        match self {
            MediaKind::Photo => content_type.starts_with("image/"),
            MediaKind::Video => ALLOWED_VIDEO_TYPES.contains(&content_type),
        }
    }
}

/// Classify an incoming content type as photo or video, rejecting anything
/// outside both allow-lists
pub fn classify(content_type: &str) -> Result<MediaKind, MediaPolicyError> {
    if content_type.starts_with("image/") {
        Ok(MediaKind::Photo)
    } else if ALLOWED_VIDEO_TYPES.contains(&content_type) {
        Ok(MediaKind::Video)
    } else {
        Err(MediaPolicyError::UnsupportedType(content_type.to_string()))
    }
}

/// Validate an upload against the policy for its kind
pub fn validate(
    kind: MediaKind,
    content_type: &str,
    size: u64,
) -> Result<(), MediaPolicyError> {
    if !kind.accepts(content_type) {
        return Err(MediaPolicyError::UnsupportedType(content_type.to_string()));
    }

    let limit = kind.max_bytes();
    if size > limit {
        return Err(MediaPolicyError::TooLarge { size, limit });
    }

    Ok(())
}

/// File extension for a stored object, derived from its content type
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/ogg" => "ogv",
        _ => "bin",
    }
}
