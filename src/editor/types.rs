use serde::{Deserialize, Serialize};

/// Sentinel prompt recorded on the base revision created by an upload.
pub const UPLOAD_PROMPT: &str = "uploaded";

/// One version of the edited image. `timestamp` (unix ms) doubles as a
/// stable identity key for the history strip and is unique per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRevision {
    pub image_ref: String,
    pub prompt: String,
    pub timestamp: i64,
}

/// Frontend-facing view of the whole session. Always reflects the last
/// fully-committed state; `is_submitting` is the only mid-flight signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub current_image: Option<ImageRevision>,
    pub history: Vec<ImageRevision>,
    pub response_text: Option<String>,
    pub submit_message: String,
    pub instructions: String,
    pub is_submitting: bool,
    pub debug_mode: bool,
    pub submit_button_label: String,
}

/// Wire shape of the edit service response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessImageResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub original_image_size: u64,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub response_text: Option<String>,
    #[serde(default)]
    pub generated_image: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Tagged outcome of a successful round-trip to the edit service. Transport
/// and service failures are errors, not a variant here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The service produced a new image, possibly with advisory text.
    ImageProduced {
        image_ref: String,
        text: Option<String>,
        original_size: u64,
    },
    /// The service answered without a usable image. Not an error: the
    /// session is left untouched and any text is surfaced.
    TextOnly {
        text: Option<String>,
        original_size: u64,
    },
}

impl From<ProcessImageResponse> for EditOutcome {
    fn from(resp: ProcessImageResponse) -> Self {
        match resp.generated_image {
            Some(image_ref) if !image_ref.trim().is_empty() => EditOutcome::ImageProduced {
                image_ref,
                text: resp.response_text,
                original_size: resp.original_image_size,
            },
            _ => EditOutcome::TextOnly {
                text: resp.response_text,
                original_size: resp.original_image_size,
            },
        }
    }
}
