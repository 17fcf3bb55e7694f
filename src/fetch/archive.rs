//! Archive extraction for `.zip`, `.tar.gz`/`.tgz` and `.tar` files.
//!
//! The decoders are synchronous, so extraction runs on the blocking pool and is
//! awaited before anything else happens.

use anyhow::Result;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::DepwrightError;

/// Archive formats depwright can unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.zip`
    Zip,
    /// `.tar.gz` or `.tgz`
    TarGz,
    /// `.tar`
    Tar,
}

impl ArchiveFormat {
    /// Guesses the format from a file name.
    #[must_use]
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

/// Whether `path` names a zip archive.
#[must_use]
pub fn is_zip(path: &Path) -> bool {
    ArchiveFormat::detect(path) == Some(ArchiveFormat::Zip)
}

fn archive_error(path: &Path, reason: impl std::fmt::Display) -> DepwrightError {
    DepwrightError::ArchiveError {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Unpacks `archive` into `dest`, creating `dest` if needed.
pub async fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let format = ArchiveFormat::detect(archive)
        .ok_or_else(|| archive_error(archive, "unrecognized archive extension"))?;
    debug!("Extracting {} to {}", archive.display(), dest.display());

    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();
    let task_archive = archive.clone();

    tokio::task::spawn_blocking(move || -> Result<()> {
        fs::create_dir_all(&dest)
            .map_err(|e| DepwrightError::filesystem("create directory", &dest, e))?;
        match format {
            ArchiveFormat::Zip => extract_zip(&task_archive, &dest),
            ArchiveFormat::TarGz => {
                let file = File::open(&task_archive).map_err(|e| archive_error(&task_archive, e))?;
                let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(file));
                tar.unpack(&dest).map_err(|e| archive_error(&task_archive, e))?;
                Ok(())
            }
            ArchiveFormat::Tar => {
                let file = File::open(&task_archive).map_err(|e| archive_error(&task_archive, e))?;
                tar::Archive::new(file).unpack(&dest).map_err(|e| archive_error(&task_archive, e))?;
                Ok(())
            }
        }
    })
    .await
    .map_err(|e| archive_error(&archive, e))?
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive).map_err(|e| archive_error(archive, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| archive_error(archive, e))?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| archive_error(archive, e))?;
        // Entries escaping the destination are skipped
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)
                .map_err(|e| DepwrightError::filesystem("create directory", &outpath, e))?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| DepwrightError::filesystem("create directory", parent, e))?;
            }
            let mut outfile = File::create(&outpath)
                .map_err(|e| DepwrightError::filesystem("create file", &outpath, e))?;
            std::io::copy(&mut entry, &mut outfile).map_err(|e| archive_error(archive, e))?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode)).ok();
            }
        }
    }

    Ok(())
}

/// Picks the source directory inside an extraction directory.
///
/// With an explicit `root` name that subdirectory is used. Otherwise a sole
/// top-level directory is used (GitHub tarballs unpack to `owner-repo-sha/`), and
/// the extraction directory itself when there are several entries.
pub fn locate_root(extracted: &Path, root: Option<&str>) -> Result<PathBuf> {
    if let Some(root) = root {
        let candidate = extracted.join(root);
        if !candidate.is_dir() {
            return Err(archive_error(extracted, format!("expected directory '{root}' in archive")).into());
        }
        return Ok(candidate);
    }

    let entries: Vec<PathBuf> = fs::read_dir(extracted)
        .map_err(|e| DepwrightError::filesystem("read directory", extracted, e))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .collect();

    match entries.as_slice() {
        [only] if only.is_dir() => Ok(only.clone()),
        _ => Ok(extracted.to_path_buf()),
    }
}
