use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Write image bytes to `<out_dir>/image_<opaque-id>.png`, creating the
/// directory if absent, and return the path.
///
/// The 8-hex-char UUID prefix makes concurrent saves collision-free without
/// coordination.
pub async fn save_png(data: Vec<u8>, out_dir: &Path) -> Result<PathBuf> {
    let out_dir = out_dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        fs::create_dir_all(&out_dir)?;

        let id = Uuid::new_v4().simple().to_string();
        let file_name = format!("image_{}.png", &id[..8]);
        let path = out_dir.join(file_name);

        fs::write(&path, &data)?;
        Ok(path)
    })
    .await
    .map_err(|e| Error::Generic(format!("Image save task join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_png_creates_directory_and_file() {
        let temp = TempDir::new().unwrap();
        let out_dir = temp.path().join("nested").join("outputs");

        let path = save_png(vec![1, 2, 3], &out_dir).await.unwrap();

        assert!(path.exists());
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("image_"));
        assert!(name.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_save_png_generates_unique_filenames() {
        let temp = TempDir::new().unwrap();

        let first = save_png(vec![0], temp.path()).await.unwrap();
        let second = save_png(vec![0], temp.path()).await.unwrap();

        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
    }
}
