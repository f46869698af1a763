//! Atomic file output.
//!
//! Every file is first written to a temporary file in its target
//! directory and then renamed over the target, so a reader never sees a
//! half-written file. Multi-file outputs such as a shapefile layer are
//! all-or-nothing: nothing is renamed until every temporary file has been
//! written, and if a rename fails the targets already renamed are removed
//! again.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use georef_export::ShapefileLayer;
use tempfile::NamedTempFile;

use crate::error::IoError;

/// Write `bytes` to `path` atomically.
///
/// # Errors
///
/// Returns [`IoError::Write`] naming `path` if the temporary file cannot
/// be created, written or renamed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), IoError> {
    write_all_atomic(&[(path.to_path_buf(), bytes)])
}

/// Write several files as one unit.
///
/// # Errors
///
/// Returns [`IoError::Write`] naming the first file that failed. When
/// the error is returned none of the targets has been created. A target
/// that existed beforehand may have been replaced and then removed.
pub fn write_all_atomic(files: &[(PathBuf, &[u8])]) -> Result<(), IoError> {
    let staged = files
        .iter()
        .map(|(path, bytes)| stage(path, bytes).map(|temp| (path, temp)))
        .collect::<Result<Vec<_>, IoError>>()?;

    let mut committed: Vec<&PathBuf> = Vec::with_capacity(staged.len());
    for (path, temp) in staged {
        if let Err(err) = temp.persist(path) {
            for done in committed {
                // Best effort; report the rename failure.
                let _ = std::fs::remove_file(done);
            }
            return Err(IoError::Write {
                path: path.clone(),
                source: err.error,
            });
        }
        committed.push(path);
    }
    for (path, bytes) in files {
        log::info!("wrote {} ({} bytes)", path.display(), bytes.len());
    }
    Ok(())
}

fn stage(path: &Path, bytes: &[u8]) -> Result<NamedTempFile, IoError> {
    let write_err = |source| IoError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".georef-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    temp.write_all(bytes).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    Ok(temp)
}

/// Target path and contents of every member of `layer`, named after
/// `base` with its extension replaced (`base.shp`, `base.shx`, ...).
///
/// Pass the result, possibly extended with other outputs, to
/// [`write_all_atomic`].
#[must_use]
pub fn shapefile_files<'a>(base: &Path, layer: &'a ShapefileLayer) -> Vec<(PathBuf, &'a [u8])> {
    layer
        .files()
        .into_iter()
        .map(|(ext, bytes)| (base.with_extension(ext), bytes))
        .collect()
}

/// Companion vertex table for a shapefile: `<stem>_vertices.csv` in the
/// same directory.
#[must_use]
pub fn vertices_csv_path(shp: &Path) -> PathBuf {
    let stem = shp.file_stem().unwrap_or_default().to_string_lossy();
    shp.with_file_name(format!("{stem}_vertices.csv"))
}

/// World file for an image: same stem, extension from
/// [`georef_export::world_file_extension`]. Images without an extension
/// get `.wld`.
#[must_use]
pub fn world_file_path(image: &Path) -> PathBuf {
    match image.extension().and_then(|e| e.to_str()) {
        Some(ext) => image.with_extension(georef_export::world_file_extension(ext)),
        None => image.with_extension("wld"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pgw");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        // No temporary files left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_directory_reports_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/out.pgw");
        let err = write_atomic(&path, b"x").unwrap_err();
        assert!(matches!(err, IoError::Write { .. }));
        assert_eq!(err.path(), path);
    }

    #[test]
    fn multi_file_write_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.shp");
        let bad = dir.path().join("missing").join("a.shx");
        let files = [
            (good.clone(), b"shp".as_slice()),
            (bad.clone(), b"shx".as_slice()),
        ];
        let err = write_all_atomic(&files).unwrap_err();
        assert_eq!(err.path(), bad);
        assert!(!good.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn failed_rename_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("layer.shp");
        // A directory cannot be replaced by a file rename.
        let blocked = dir.path().join("layer.shx");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("keep"), b"").unwrap();
        let files = [
            (first.clone(), b"a".as_slice()),
            (blocked.clone(), b"b".as_slice()),
        ];
        let err = write_all_atomic(&files).unwrap_err();
        assert_eq!(err.path(), blocked);
        assert!(!first.exists());
    }

    #[test]
    fn shapefile_members_share_the_base_name() {
        let layer = ShapefileLayer {
            shp: b"shp".to_vec(),
            shx: b"shx".to_vec(),
            dbf: b"dbf".to_vec(),
            prj: "prj".to_string(),
            cpg: "UTF-8".to_string(),
        };
        let dir = tempfile::tempdir().unwrap();
        let files = shapefile_files(&dir.path().join("parcels.shp"), &layer);
        let names: Vec<String> = files
            .iter()
            .map(|(path, _)| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            ["parcels.shp", "parcels.shx", "parcels.dbf", "parcels.prj", "parcels.cpg"]
        );

        write_all_atomic(&files).unwrap();
        assert_eq!(std::fs::read(dir.path().join("parcels.cpg")).unwrap(), b"UTF-8");
    }

    #[test]
    fn naming_helpers() {
        assert_eq!(
            vertices_csv_path(Path::new("/data/parcels.shp")),
            PathBuf::from("/data/parcels_vertices.csv")
        );
        assert_eq!(
            world_file_path(Path::new("/maps/sheet.png")),
            PathBuf::from("/maps/sheet.pgw")
        );
        assert_eq!(
            world_file_path(Path::new("scan.tif")),
            PathBuf::from("scan.tfw")
        );
    }
}
