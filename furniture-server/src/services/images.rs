//! Product image storage
//!
//! Uploads are checked (size, extension, declared type, content sniffing)
//! before anything touches the disk, then written under `<upload dir>/products` with a
//! timestamp + random prefix. Files are served back under `/uploads`.

use image::ImageFormat;
use rand::Rng;
use shared::error::{AppError, ErrorCode};
use shared::models::ProductImage;
use std::path::{Path, PathBuf};

use crate::error::ServiceResult;
use crate::util::sanitize_filename;

/// Maximum file size (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Maximum number of images per product
pub const MAX_FILES: usize = 5;

/// Accepted extensions, the format their content must sniff as and the
/// only content type a client may declare for them
const SUPPORTED_FORMATS: &[(&str, ImageFormat, &str)] = &[
    ("jpg", ImageFormat::Jpeg, "image/jpeg"),
    ("jpeg", ImageFormat::Jpeg, "image/jpeg"),
    ("png", ImageFormat::Png, "image/png"),
    ("webp", ImageFormat::WebP, "image/webp"),
];

/// Public path prefix of stored product images
const PUBLIC_PREFIX: &str = "uploads/products";

/// One file received from a multipart form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// An upload that passed validation
#[derive(Debug)]
struct CheckedImage<'a> {
    stem: String,
    ext: String,
    mimetype: String,
    data: &'a [u8],
}

/// Directory-backed image store
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate and store a batch of 1..=5 images.
    ///
    /// Nothing is written unless every file passes validation. If a write
    /// fails, files already written for this batch are removed.
    pub async fn save_all(&self, uploads: &[ImageUpload]) -> ServiceResult<Vec<ProductImage>> {
        if uploads.is_empty() {
            return Err(AppError::new(ErrorCode::NoFileProvided).into());
        }
        if uploads.len() > MAX_FILES {
            return Err(AppError::new(ErrorCode::TooManyFiles)
                .with_detail("max", MAX_FILES)
                .into());
        }

        let checked = uploads
            .iter()
            .map(check_image)
            .collect::<Result<Vec<_>, AppError>>()?;

        tokio::fs::create_dir_all(&self.dir).await?;

        let mut stored = Vec::with_capacity(checked.len());
        for image in checked {
            let filename = unique_filename(&image.stem, &image.ext);
            if let Err(e) = tokio::fs::write(self.dir.join(&filename), image.data).await {
                tracing::error!(error = %e, filename = %filename, "Failed to write image");
                self.remove_all(&stored).await;
                return Err(AppError::new(ErrorCode::FileStorageFailed).into());
            }
            stored.push(ProductImage {
                path: format!("{PUBLIC_PREFIX}/{filename}"),
                filename,
                mimetype: image.mimetype,
            });
        }

        Ok(stored)
    }

    /// Best-effort removal; failures are logged and skipped
    pub async fn remove_all(&self, images: &[ProductImage]) {
        for image in images {
            // Stored names never contain separators, but don't trust the row
            let Some(name) = Path::new(&image.filename).file_name() else {
                continue;
            };
            match tokio::fs::remove_file(self.dir.join(name)).await {
                Ok(()) => tracing::debug!(filename = %image.filename, "Image file removed"),
                Err(e) => tracing::warn!(
                    filename = %image.filename,
                    error = %e,
                    "Failed to remove image file"
                ),
            }
        }
    }
}

fn check_image(upload: &ImageUpload) -> Result<CheckedImage<'_>, AppError> {
    let original = upload
        .filename
        .as_deref()
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::NoFilename))?;

    if upload.data.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile).with_detail("filename", original));
    }
    if upload.data.len() > MAX_FILE_SIZE {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!("File too large. Maximum size is {}MB", MAX_FILE_SIZE / 1024 / 1024),
        )
        .with_detail("filename", original));
    }

    let path = Path::new(original);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| AppError::new(ErrorCode::InvalidFileExtension).with_detail("filename", original))?;

    let Some(&(_, expected, mimetype)) = SUPPORTED_FORMATS.iter().find(|(e, _, _)| *e == ext)
    else {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!("Unsupported file format '{ext}'. Supported: jpg, jpeg, png, webp"),
        ));
    };

    if let Some(declared) = upload.content_type.as_deref() {
        let matches = declared
            .parse::<mime_guess::mime::Mime>()
            .is_ok_and(|m| m.essence_str() == mimetype);
        if !matches {
            return Err(AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                format!("Content type '{declared}' does not match '.{ext}'"),
            )
            .with_detail("filename", original));
        }
    }

    match image::guess_format(&upload.data) {
        Ok(actual) if actual == expected => {}
        _ => {
            return Err(
                AppError::new(ErrorCode::InvalidImageFile).with_detail("filename", original)
            );
        }
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(sanitize_filename)
        .unwrap_or_else(|| "image".to_string());

    Ok(CheckedImage {
        stem,
        ext,
        mimetype: mimetype.to_string(),
        data: &upload.data,
    })
}

fn unique_filename(stem: &str, ext: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{suffix}_{stem}.{ext}", shared::util::now_millis())
}
