use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::WorkflowError;

/// MIME types compare case-insensitively.
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// Sequences asynchronous file reads so only the newest pick gets staged.
#[derive(Debug, Default)]
pub struct FileReads {
    latest: u64,
}

impl FileReads {
    pub fn begin(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest
    }
}

/// A file as picked by the user, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// A validated image ready to be sent to `/upload`.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageSubmission {
    file_name: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSubmission")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageSubmission {
    pub fn stage(file: SelectedFile) -> Result<Self, WorkflowError> {
        if !is_image_media_type(&file.media_type) {
            return Err(WorkflowError::InvalidFileType {
                media_type: file.media_type,
            });
        }
        Ok(Self {
            file_name: file.name,
            media_type: file.media_type,
            bytes: file.bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Inline `data:` URL used as the preview source.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }
}

/// Placeholder vs. preview, derived from whether a file is staged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadDisplay {
    #[default]
    Placeholder,
    Preview(String),
}
