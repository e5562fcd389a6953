//! Archiving directory artifacts.
//!
//! Hosts accept files only, so the macOS `.app` directory is packed into a
//! gzipped tarball next to it before upload.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tauri_release_schema::COMPRESS_SUFFIX;
use tracing::info;

use crate::error::ReleaseError;

/// File name prefix of generated archives.
pub const ARCHIVE_PREFIX: &str = "__zipped__";

/// `<parent>/__zipped__<name>.tar.gz` for the directory at `dir`.
///
/// # Errors
///
/// Fails when `dir` has no file name or parent.
pub fn archive_path(dir: &Path) -> Result<PathBuf, ReleaseError> {
    let (Some(parent), Some(name)) = (dir.parent(), dir.file_name()) else {
        return Err(ReleaseError::Validation(format!(
            "cannot archive {}: no parent directory",
            dir.display()
        )));
    };
    Ok(parent.join(format!(
        "{ARCHIVE_PREFIX}{}{COMPRESS_SUFFIX}",
        name.to_string_lossy()
    )))
}

/// Pack `dir` into an adjacent archive and return the archive path.
///
/// The archive holds the directory itself as its single top-level entry.
/// An existing file at the archive path is never overwritten.
///
/// # Errors
///
/// [`ReleaseError::ArchiveExists`] when the archive path is taken; IO errors
/// otherwise. A partially written archive is removed.
pub async fn compress_directory(dir: &Path) -> Result<PathBuf, ReleaseError> {
    let archive = archive_path(dir)?;
    if tokio::fs::try_exists(&archive).await? {
        return Err(ReleaseError::ArchiveExists(archive));
    }

    info!(dir = %dir.display(), archive = %archive.display(), "Compressing directory");
    let src = dir.to_path_buf();
    let dest = archive.clone();
    tokio::task::spawn_blocking(move || write_archive(&src, &dest))
        .await
        .map_err(|e| ReleaseError::context("Archive task failed", e))??;

    Ok(archive)
}

fn write_archive(src: &Path, dest: &Path) -> Result<(), ReleaseError> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ReleaseError::ArchiveExists(dest.to_path_buf()),
            _ => ReleaseError::Io(e),
        })?;

    if let Err(e) = pack(src, file) {
        let _ = std::fs::remove_file(dest);
        return Err(e.into());
    }
    Ok(())
}

fn pack(src: &Path, file: File) -> std::io::Result<()> {
    let entry_name = src.file_name().unwrap_or(src.as_os_str());
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    // Bundles contain framework symlinks; keep them as links.
    builder.follow_symlinks(false);
    builder.append_dir_all(entry_name, src)?;
    builder.into_inner()?.finish()?.into_inner().map_err(|e| e.into_error())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn app_dir(root: &Path) -> PathBuf {
        let app = root.join("macos").join("xxx.app");
        fs::create_dir_all(app.join("Contents/MacOS")).unwrap();
        fs::write(app.join("Contents/Info.plist"), "<plist/>").unwrap();
        fs::write(app.join("Contents/MacOS/xxx"), "binary").unwrap();
        app
    }

    fn entries(archive: &Path) -> Vec<String> {
        let gz = flate2::read::GzDecoder::new(File::open(archive).unwrap());
        let mut tar = tar::Archive::new(gz);
        let mut names: Vec<String> = tar
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_archive_path_is_adjacent() {
        assert_eq!(
            archive_path(Path::new("/b/macos/xxx.app")).unwrap(),
            Path::new("/b/macos/__zipped__xxx.app.tar.gz")
        );
    }

    #[tokio::test]
    async fn test_compress_directory_keeps_top_level_entry() {
        let tmp = TempDir::new().unwrap();
        let app = app_dir(tmp.path());

        let archive = compress_directory(&app).await.unwrap();
        assert_eq!(archive, tmp.path().join("macos/__zipped__xxx.app.tar.gz"));

        let names = entries(&archive);
        assert!(names.contains(&"xxx.app/Contents/Info.plist".to_string()), "{names:?}");
        assert!(names.contains(&"xxx.app/Contents/MacOS/xxx".to_string()), "{names:?}");
    }

    #[tokio::test]
    async fn test_existing_archive_is_not_overwritten() {
        let tmp = TempDir::new().unwrap();
        let app = app_dir(tmp.path());
        let archive = archive_path(&app).unwrap();
        fs::write(&archive, "keep me").unwrap();

        let err = compress_directory(&app).await.unwrap_err();
        assert!(matches!(err, ReleaseError::ArchiveExists(ref p) if *p == archive), "{err}");
        assert_eq!(fs::read_to_string(&archive).unwrap(), "keep me");
    }
}
