//! Reading and writing forest documents
//!
//! A forest document is the JSON form of [`ForestArrays`]:
//! `{"trees": [{"children_left": [..], "children_right": [..], "feature": [..], "threshold": [..], "value": [..]}, ..]}`.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use sepsis_trees::ForestArrays;

use crate::error::{Result, TrainError};

/// Writes `forest` to `path`, replacing any existing file
///
/// A failure half way leaves a truncated file behind.
pub fn write_forest<P: AsRef<Path>>(path: P, forest: &ForestArrays) -> Result<()> {
    let path = path.as_ref();
    let io_error = |source: io::Error| TrainError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, forest).map_err(|err| json_error(path, err))?;
    writer.flush().map_err(io_error)?;

    Ok(())
}

/// Reads a forest document from `path` and validates every tree
pub fn read_forest<P: AsRef<Path>>(path: P) -> Result<ForestArrays> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| TrainError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let forest: ForestArrays =
        serde_json::from_reader(BufReader::new(file)).map_err(|err| json_error(path, err))?;
    forest.validate()?;

    Ok(forest)
}

/// Failures of the underlying file stay I/O errors, everything else is a JSON error
fn json_error(path: &Path, err: serde_json::Error) -> TrainError {
    if err.is_io() {
        TrainError::Io {
            path: path.to_path_buf(),
            source: err.into(),
        }
    } else {
        TrainError::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sepsis_trees::{TreeArrays, TREE_LEAF, TREE_UNDEFINED};

    fn leaf_forest() -> ForestArrays {
        ForestArrays {
            trees: vec![TreeArrays {
                children_left: vec![TREE_LEAF],
                children_right: vec![TREE_LEAF],
                feature: vec![TREE_UNDEFINED],
                threshold: vec![-2.0],
                value: vec![vec![vec![3.0, 1.0]]],
            }],
        }
    }

    #[test]
    fn written_forest_reads_back() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.json");

        write_forest(&path, &leaf_forest())?;
        assert_eq!(read_forest(&path)?, leaf_forest());

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            r#"{"trees":[{"children_left":[-1],"children_right":[-1],"feature":[-2],"threshold":[-2.0],"value":[[[3.0,1.0]]]}]}"#
        );

        Ok(())
    }

    #[test]
    fn existing_file_is_replaced() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.json");
        std::fs::write(&path, "x".repeat(4096)).unwrap();

        write_forest(&path, &leaf_forest())?;
        read_forest(&path)?;

        Ok(())
    }

    #[test]
    fn unwritable_path_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("forest.json");

        match write_forest(&path, &leaf_forest()) {
            Err(TrainError::Io { path: err_path, .. }) => assert_eq!(err_path, path),
            other => panic!("expected an io error, got {:?}", other),
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn full_device_reports_an_io_error() {
        // large enough to overflow the write buffer before the final flush
        let forest = ForestArrays {
            trees: vec![leaf_forest().trees[0].clone(); 2000],
        };
        let path = Path::new("/dev/full");

        match write_forest(path, &forest) {
            Err(TrainError::Io { path: err_path, .. }) => assert_eq!(err_path, path),
            other => panic!("expected an io error, got {:?}", other),
        }
    }

    #[test]
    fn invalid_documents_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.json");

        std::fs::write(&path, "{\"trees\": [").unwrap();
        assert!(matches!(read_forest(&path), Err(TrainError::Json(_))));

        let mut forest = leaf_forest();
        forest.trees[0].children_left[0] = 0;
        write_forest(&path, &forest).unwrap();
        assert!(matches!(read_forest(&path), Err(TrainError::Model(_))));
    }
}
