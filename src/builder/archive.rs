//! Distribution archives.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::builder::plan::{ArchiveFormat, TarCompression};
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists};

/// Files under `dir` paired with their archive path below `root_dir`.
fn archive_entries(dir: &Path, root_dir: &str) -> Result<Vec<(PathBuf, String)>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .with_context(|| format!("{} is outside {}", entry.path().display(), dir.display()))?;
        let name = format!("{}/{}", root_dir, rel.to_string_lossy().replace('\\', "/"));
        entries.push((entry.path().to_path_buf(), name));
    }
    Ok(entries)
}

/// Pack `staging` into `output`, placing every entry under `root_dir`.
///
/// The archive is written to a temporary file and renamed into place, so a
/// failure leaves nothing at `output`. Returns the number of files packed.
pub fn write_archive(
    staging: &Path,
    output: &Path,
    root_dir: &str,
    format: ArchiveFormat,
) -> Result<usize> {
    let entries = archive_entries(staging, root_dir)?;
    let parent = output
        .parent()
        .with_context(|| format!("{} has no parent directory", output.display()))?;
    ensure_dir(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
    match format {
        ArchiveFormat::Tar(TarCompression::None) => {
            write_tar(tmp.as_file_mut(), &entries)?;
        }
        ArchiveFormat::Tar(TarCompression::Gzip) => {
            let encoder = GzEncoder::new(tmp.as_file_mut(), Compression::default());
            let encoder = write_tar(encoder, &entries)?;
            encoder.finish().context("failed to finish gzip stream")?;
        }
        ArchiveFormat::Zip => write_zip(tmp.as_file_mut(), &entries)?,
    }

    tmp.persist(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::debug!("packed {} file(s) into {}", entries.len(), output.display());
    Ok(entries.len())
}

fn write_tar<W: Write>(writer: W, entries: &[(PathBuf, String)]) -> Result<W> {
    let mut builder = tar::Builder::new(writer);
    for (path, name) in entries {
        let mut file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        builder
            .append_file(name, &mut file)
            .with_context(|| format!("failed to add {} to tar", path.display()))?;
    }
    builder.into_inner().context("failed to finish tar archive")
}

fn write_zip(file: &mut File, entries: &[(PathBuf, String)]) -> Result<()> {
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (path, name) in entries {
        zip.start_file(name.as_str(), options)
            .with_context(|| format!("failed to add {} to zip", path.display()))?;
        let mut source =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        io::copy(&mut source, &mut zip)?;
    }
    zip.finish().context("failed to finish zip archive")?;
    Ok(())
}

/// Recreate `destination` holding a copy of every file in `files`.
///
/// Files land side by side; a later file with an already used name is
/// skipped with a warning.
pub fn stage_files(destination: &Path, files: &[PathBuf]) -> Result<usize> {
    remove_dir_all_if_exists(destination)?;
    ensure_dir(destination)?;

    let mut staged = 0;
    for file in files {
        let name = file
            .file_name()
            .with_context(|| format!("{} has no file name", file.display()))?;
        let target = destination.join(name);
        if target.exists() {
            tracing::warn!(
                "{} already staged, skipping {}",
                target.display(),
                file.display()
            );
            continue;
        }
        fs::copy(file, &target).with_context(|| {
            format!("failed to copy {} to {}", file.display(), target.display())
        })?;
        staged += 1;
    }
    Ok(staged)
}
