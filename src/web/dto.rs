//! Response DTOs for the dropkey Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::store::FileKeys;

/// One file accepted by an upload request, after it was written to the
/// store.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original client-supplied filename.
    pub filename: String,
    /// Capability keys minted for the file.
    pub keys: FileKeys,
}

/// Per-file upload result on the wire.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileInfo {
    /// Original filename.
    pub filename: String,
    /// Download capability.
    pub public_key: String,
    /// Deletion capability.
    pub private_key: String,
}

/// Response for an upload of exactly one file.
#[derive(Debug, Serialize, ToSchema)]
pub struct SingleUploadResponse {
    /// Status message.
    pub message: String,
    /// The uploaded file.
    pub file: UploadedFileInfo,
}

/// Response for an upload of several files.
#[derive(Debug, Serialize, ToSchema)]
pub struct MultiUploadResponse {
    /// Status message.
    pub message: String,
    /// The uploaded files, in upload order.
    pub files: Vec<UploadedFileInfo>,
}

/// Plain message response.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Status message.
    pub message: String,
}

impl MessageResponse {
    /// Create a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Map uploaded files to their wire representation.
///
/// Pure shaping: empty in, empty out. The handler picks the singular or
/// plural response shape from the resulting length.
pub fn file_info_response(files: &[UploadedFile]) -> Vec<UploadedFileInfo> {
    files
        .iter()
        .map(|file| UploadedFileInfo {
            filename: file.filename.clone(),
            public_key: file.keys.public_key.clone(),
            private_key: file.keys.private_key.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_info_response_empty() {
        assert!(file_info_response(&[]).is_empty());
    }

    #[test]
    fn test_file_info_response_maps_fields() {
        let files = vec![
            UploadedFile {
                filename: "a.txt".to_string(),
                keys: FileKeys::new("0123456789abcdef", "fedcba9876543210"),
            },
            UploadedFile {
                filename: "b.pdf".to_string(),
                keys: FileKeys::new("aaaaaaaaaaaaaaaa", "bbbbbbbbbbbbbbbb"),
            },
        ];

        let infos = file_info_response(&files);

        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].filename, "a.txt");
        assert_eq!(infos[0].public_key, "0123456789abcdef");
        assert_eq!(infos[0].private_key, "fedcba9876543210");
        assert_eq!(infos[1].filename, "b.pdf");
        assert_eq!(infos[1].public_key, "aaaaaaaaaaaaaaaa");
    }

    #[test]
    fn test_uploaded_file_info_serializes_camel_case() {
        let info = UploadedFileInfo {
            filename: "a.txt".to_string(),
            public_key: "0123456789abcdef".to_string(),
            private_key: "fedcba9876543210".to_string(),
        };

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["filename"], "a.txt");
        assert_eq!(json["publicKey"], "0123456789abcdef");
        assert_eq!(json["privateKey"], "fedcba9876543210");
    }
}
