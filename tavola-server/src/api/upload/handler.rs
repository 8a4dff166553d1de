//! Image Upload Handler
//!
//! Accepts PNG, JPEG and WebP, re-encodes to JPEG and stores the result under
//! `{uploads_dir}/{store_id}/{sha256}.jpg`. Identical content maps to the same
//! file, so a repeated upload returns the existing URL.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;
use sha2::{Digest, Sha256};
use shared::error::{AppError, ErrorCode};

use crate::api::ApiResult;
use crate::auth::CurrentUser;
use crate::state::AppState;
use crate::tenant::StoreScope;

/// Maximum file size (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub original_name: String,
    pub size: usize,
    pub format: &'static str,
    pub url: String,
    /// False when identical content was already stored
    pub created: bool,
}

/// Result of writing an image to disk
#[derive(Debug)]
struct StoredImage {
    filename: String,
    size: usize,
    created: bool,
}

fn calculate_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Lowercased extension, checked against the supported formats
fn checked_extension(filename: &str) -> Result<String, AppError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!(
                "Unsupported file format '{ext}'. Supported: {}",
                SUPPORTED_FORMATS.join(", ")
            ),
        ));
    }
    Ok(ext)
}

fn check_size(len: usize) -> Result<(), AppError> {
    if len == 0 {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }
    if len > MAX_FILE_SIZE {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!("File too large. Maximum size is {}MB", MAX_FILE_SIZE / 1024 / 1024),
        )
        .with_detail("max_bytes", MAX_FILE_SIZE));
    }
    Ok(())
}

/// Decode and re-encode as JPEG
fn compress_image(data: &[u8]) -> Result<Vec<u8>, AppError> {
    let img = image::load_from_memory(data).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidImageFile, format!("Invalid image: {e}"))
    })?;

    let mut buffer = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buffer), JPEG_QUALITY);
    img.to_rgb8().write_with_encoder(encoder).map_err(|e| {
        AppError::with_message(
            ErrorCode::ImageProcessingFailed,
            format!("Failed to compress image: {e}"),
        )
    })?;
    Ok(buffer)
}

/// Write `jpeg` into `dir` under its content hash
fn store_image(dir: &Path, jpeg: &[u8]) -> Result<StoredImage, AppError> {
    let storage_error = |e: std::io::Error| {
        AppError::with_message(ErrorCode::FileStorageFailed, format!("Failed to save file: {e}"))
    };

    std::fs::create_dir_all(dir).map_err(storage_error)?;
    let filename = format!("{}.jpg", calculate_hash(jpeg));
    let path: PathBuf = dir.join(&filename);
    if path.exists() {
        return Ok(StoredImage {
            filename,
            size: jpeg.len(),
            created: false,
        });
    }

    // Write then rename so readers never see a partial file
    let tmp = dir.join(format!(".{filename}.tmp"));
    std::fs::write(&tmp, jpeg).map_err(storage_error)?;
    std::fs::rename(&tmp, &path).map_err(storage_error)?;
    Ok(StoredImage {
        filename,
        size: jpeg.len(),
        created: true,
    })
}

/// POST /api/store/upload
pub async fn upload(
    State(state): State<AppState>,
    scope: StoreScope,
    user: CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let store_id = scope.require_store()?;

    let mut file: Option<(Option<String>, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::validation(format!("Invalid multipart request: {e}"))
    })? {
        if field.name() == Some("file") {
            let name = field.file_name().map(str::to_string);
            let bytes = field.bytes().await.map_err(|e| {
                AppError::validation(format!("Multipart error: {e}"))
            })?;
            file = Some((name, bytes.to_vec()));
            break;
        }
    }

    let (filename, data) = file.ok_or_else(|| {
        AppError::with_message(ErrorCode::NoFileProvided, "Field name must be 'file'")
    })?;
    let original_name = filename
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::NoFilename))?;
    check_size(data.len())?;
    checked_extension(&original_name)?;

    let dir = state.config.uploads_dir.join(store_id.to_string());
    let stored = tokio::task::spawn_blocking(move || {
        let jpeg = compress_image(&data)?;
        store_image(&dir, &jpeg)
    })
    .await
    .map_err(|e| {
        AppError::with_message(ErrorCode::ImageProcessingFailed, format!("Worker failed: {e}"))
    })??;

    tracing::info!(
        store_id,
        user_id = user.id,
        original_name = %original_name,
        file = %stored.filename,
        size = stored.size,
        created = stored.created,
        "Image uploaded"
    );

    Ok(Json(UploadResponse {
        url: format!("/uploads/{store_id}/{}", stored.filename),
        filename: stored.filename,
        original_name,
        size: stored.size,
        format: "jpg",
        created: stored.created,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 40, 40]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_extension_check() {
        assert_eq!(checked_extension("pizza.PNG").unwrap(), "png");
        assert_eq!(checked_extension("a.b.jpeg").unwrap(), "jpeg");
        assert_eq!(
            checked_extension("menu.pdf").unwrap_err().code,
            ErrorCode::UnsupportedFileFormat
        );
        assert!(checked_extension("noext").is_err());
    }

    #[test]
    fn test_size_check() {
        assert_eq!(check_size(0).unwrap_err().code, ErrorCode::EmptyFile);
        assert!(check_size(MAX_FILE_SIZE).is_ok());
        assert_eq!(
            check_size(MAX_FILE_SIZE + 1).unwrap_err().code,
            ErrorCode::FileTooLarge
        );
    }

    #[test]
    fn test_rejects_non_image() {
        let err = compress_image(b"definitely not an image").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidImageFile);
    }

    #[test]
    fn test_store_deduplicates_by_content() {
        let dir = tempfile::tempdir().unwrap();
        let jpeg = compress_image(&sample_png()).unwrap();

        let first = store_image(dir.path(), &jpeg).unwrap();
        assert!(first.created);
        assert_eq!(first.filename, format!("{}.jpg", calculate_hash(&jpeg)));
        assert!(dir.path().join(&first.filename).exists());

        let second = store_image(dir.path(), &jpeg).unwrap();
        assert!(!second.created);
        assert_eq!(second.filename, first.filename);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
