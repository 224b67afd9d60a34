use csv::{ByteRecord, StringRecord};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use super::codec;
use super::error::DataStoreError;

/// Creates an empty file. Fails if it already exists or if its directory is missing.
pub fn create_empty(path: &Path) -> Result<(), DataStoreError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|err| DataStoreError::io(path, err))?;
    Ok(())
}

/// Returns Ok(None) if the file doesn't exist yet
///
/// Lines are returned as raw bytes so the caller can skip single lines that aren't valid UTF-8.
pub fn open_records(
    path: &Path,
) -> Result<Option<impl Iterator<Item = csv::Result<ByteRecord>>>, DataStoreError> {
    if !path.try_exists().map_err(|err| DataStoreError::io(path, err))? {
        return Ok(None);
    }
    let file = File::open(path).map_err(|err| DataStoreError::io(path, err))?;
    Ok(Some(codec::reader(file).into_byte_records()))
}

/// Replaces the whole file with the given records.
pub fn save_records(
    path: &Path,
    records: impl Iterator<Item = StringRecord>,
) -> Result<(), DataStoreError> {
    // First write to temporary file so we don't lose data if writing fails halfway
    let tmppath = temp_path(path)?;
    if let Err(err) = write_records(&tmppath, records) {
        remove_temp(&tmppath);
        return Err(DataStoreError::io(&tmppath, err));
    }

    // Ok, writing succeeded, let's now replace the real file with the tmpfile
    if let Err(err) = std::fs::rename(&tmppath, path) {
        remove_temp(&tmppath);
        return Err(DataStoreError::io(path, err));
    }
    Ok(())
}

fn write_records(
    path: &Path,
    records: impl Iterator<Item = StringRecord>,
) -> std::io::Result<()> {
    let mut writer = codec::writer(File::create(path)?);
    for record in records {
        writer.write_record(&record)?;
    }
    writer.flush()?;
    let file = writer.into_inner().map_err(|err| err.into_error())?;
    file.sync_all()?;
    Ok(())
}

fn remove_temp(tmppath: &Path) {
    if let Err(err) = std::fs::remove_file(tmppath) {
        if err.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Failed to remove {}: {}", tmppath.display(), err);
        }
    }
}

fn temp_path(path: &Path) -> Result<PathBuf, DataStoreError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            DataStoreError::io(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "Path has no valid utf-8 filename",
                ),
            )
        })?;
    Ok(path.with_file_name(format!("{}.temp", filename)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(path: &Path) -> Vec<Vec<String>> {
        open_records(path)
            .unwrap()
            .unwrap()
            .map(|record| {
                StringRecord::from_byte_record(record.unwrap())
                    .unwrap()
                    .iter()
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }

    fn records(lines: &[&[&str]]) -> impl Iterator<Item = StringRecord> {
        lines
            .iter()
            .map(|fields| StringRecord::from(fields.to_vec()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn open_nonexisting() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("10040.jrnl");
        assert!(open_records(&path).unwrap().is_none());
    }

    #[test]
    fn create_empty_then_open() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("10040.jrnl");
        create_empty(&path).unwrap();
        assert!(read_all(&path).is_empty());
    }

    #[test]
    fn create_empty_fails_without_directory() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("missing").join("10040.jrnl");
        let err = create_empty(&path).unwrap_err();
        assert!(matches!(err, DataStoreError::Io { .. }));
    }

    #[test]
    fn save_and_overwrite() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("0.ldgr");
        save_records(&path, records(&[&["a", "1"], &["b", " "], &["c", ""]])).unwrap();
        assert_eq!("a~1\nb~ \nc~\n", std::fs::read_to_string(&path).unwrap());
        save_records(&path, records(&[&["d", "\"quoted\""]])).unwrap();
        assert_eq!(
            vec![vec!["d".to_string(), "\"quoted\"".to_string()]],
            read_all(&path)
        );
        assert!(!tempdir.path().join("0.ldgr.temp").exists());
    }

    #[test]
    fn lines_of_any_length_are_read() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("0.ldgr");
        std::fs::write(&path, "a~b~c\r\nd\n\ne~f\n").unwrap();
        assert_eq!(
            vec![
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["d".to_string()],
                vec!["e".to_string(), "f".to_string()],
            ],
            read_all(&path)
        );
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("0.ldgr");
        // A non-empty directory can't be replaced by a file
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "").unwrap();

        let err = save_records(&path, records(&[&["a", "1"]])).unwrap_err();
        assert!(matches!(err, DataStoreError::Io { .. }));
        assert!(!tempdir.path().join("0.ldgr.temp").exists());
        assert!(path.join("keep").exists());
    }
}
