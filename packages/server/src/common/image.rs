//! Uploaded cover images and their inline transport form.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("{0} is empty")]
    Empty(String),

    #[error("{0} is not a PNG or JPEG image")]
    UnsupportedFormat(String),

    #[error("Invalid base64 image payload: {0}")]
    InvalidBase64(String),
}

/// Raster formats accepted by the upload form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Detect from the file signature.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF];

        if bytes.starts_with(PNG) {
            Some(Self::Png)
        } else if bytes.starts_with(JPEG) {
            Some(Self::Jpeg)
        } else {
            None
        }
    }

    /// Detect from a declared MIME type such as `image/jpeg`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.split(';').next().unwrap_or_default().trim() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Detect from a file name extension (`png`, `jpg`, `jpeg`).
    pub fn from_file_name(name: &str) -> Option<Self> {
        mime_guess::from_path(name)
            .iter()
            .find_map(|mime| Self::from_mime(mime.essence_str()))
    }
}

/// One uploaded cover image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl UploadedImage {
    /// Validate an upload. The signature wins over the declared type; the
    /// declared content type and file name are only consulted when the bytes
    /// are not recognised.
    pub fn from_upload(
        label: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
        file_name: Option<&str>,
    ) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty(label.to_string()));
        }

        let format = ImageFormat::sniff(&bytes)
            .or_else(|| content_type.and_then(ImageFormat::from_mime))
            .or_else(|| file_name.and_then(ImageFormat::from_file_name))
            .ok_or_else(|| ImageError::UnsupportedFormat(label.to_string()))?;

        Ok(Self { bytes, format })
    }

    pub fn encode(&self) -> EncodedImage {
        EncodedImage {
            base64: encode_image_to_base64(&self.bytes),
            mime_type: self.format.mime_type(),
        }
    }
}

/// Base64 payload plus MIME type, ready for inline transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub base64: String,
    pub mime_type: &'static str,
}

impl EncodedImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// Encode binary image data to a base64 string.
pub fn encode_image_to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_image_from_base64(encoded: &str) -> Result<Vec<u8>, ImageError> {
    STANDARD
        .decode(encoded)
        .map_err(|e| ImageError::InvalidBase64(e.to_string()))
}
