// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Label table I/O.
//!
//! Ground-truth, prediction and label files share one layout: whitespace
//! delimited numeric text, one instance per row, columns
//! `class_id cx cy w h (kx ky kv) x P` with normalized coordinates. The
//! third keypoint field is a 0/1/2 visibility flag in label files and a
//! continuous confidence in prediction ("detail") files.

use std::fs;
use std::io::Write;
use std::path::Path;

use ndarray::{Array2, ArrayView1};

use crate::error::{CalibError, Result};

/// Columns preceding the keypoint triples: `class_id cx cy w h`.
pub const META_COLUMNS: usize = 5;

/// Filename suffix of prediction ("detail") files carrying keypoint
/// confidences. The paired label or ground-truth file is `<base>.txt`.
pub const DETAIL_SUFFIX: &str = "_detail.txt";

/// List the detail files of a directory, sorted for deterministic runs.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn detail_files(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut files: Vec<std::path::PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(DETAIL_SUFFIX))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Base name of a detail file with the suffix stripped, e.g.
/// `img_001_detail.txt` -> `img_001`.
#[must_use]
pub fn detail_base_name(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()?.strip_suffix(DETAIL_SUFFIX)
}

/// Total columns of an instance row for a given keypoint count.
#[must_use]
pub const fn row_width(point_count: usize) -> usize {
    META_COLUMNS + 3 * point_count
}

/// Load a label table from disk.
///
/// # Arguments
///
/// * `path` - File to read.
/// * `point_count` - Expected number of keypoints per instance.
///
/// # Returns
///
/// * An `(instances, 5 + 3 * point_count)` array. Empty files yield a
///   zero-row table.
///
/// # Errors
///
/// Returns [`CalibError::SchemaMismatch`] when any row has the wrong number
/// of columns, [`CalibError::ParseError`] when a value is not numeric, and
/// an IO error when the file cannot be read.
pub fn load_table(path: &Path, point_count: usize) -> Result<Array2<f32>> {
    let width = row_width(point_count);
    let text = fs::read_to_string(path)?;

    let mut values: Vec<f32> = Vec::new();
    let mut rows = 0;
    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() != width {
            return Err(CalibError::SchemaMismatch {
                path: path.to_path_buf(),
                expected: width,
                actual: tokens.len(),
            });
        }
        for token in tokens {
            values.push(token.parse::<f32>().map_err(|_| {
                CalibError::ParseError(format!(
                    "invalid value '{token}' in {}",
                    path.display()
                ))
            })?);
        }
        rows += 1;
    }

    Array2::from_shape_vec((rows, width), values)
        .map_err(|e| CalibError::ParseError(format!("{}: {e}", path.display())))
}

/// Serialize a label table back to disk.
///
/// Class id and visibility columns are written as integers, everything else
/// at 6 decimals, matching the layout the upstream detector emits.
///
/// # Arguments
///
/// * `path` - Destination file, overwritten whole.
/// * `table` - Instance rows to write.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
#[allow(clippy::cast_possible_truncation)]
pub fn save_table(path: &Path, table: &Array2<f32>) -> Result<()> {
    let mut file = fs::File::create(path)?;
    for row in table.rows() {
        let mut fields: Vec<String> = Vec::with_capacity(row.len());
        fields.push(format!("{}", row[0] as i64));
        for value in row.iter().take(META_COLUMNS).skip(1) {
            fields.push(format!("{value:.6}"));
        }
        let mut column = META_COLUMNS;
        while column < row.len() {
            fields.push(format!("{:.6}", row[column]));
            fields.push(format!("{:.6}", row[column + 1]));
            fields.push(format!("{}", row[column + 2] as i64));
            column += 3;
        }
        writeln!(file, "{}", fields.join(" "))?;
    }
    Ok(())
}

/// Center-form bounding box `[cx, cy, w, h]` of an instance row.
#[must_use]
pub fn instance_box(row: &ArrayView1<'_, f32>) -> [f32; 4] {
    [row[1], row[2], row[3], row[4]]
}

/// Keypoint triple `(x, y, visibility-or-confidence)` of an instance row.
#[must_use]
pub fn keypoint(row: &ArrayView1<'_, f32>, index: usize) -> (f32, f32, f32) {
    let base = META_COLUMNS + index * 3;
    (row[base], row[base + 1], row[base + 2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_row_width() {
        assert_eq!(row_width(13), 44);
        assert_eq!(row_width(2), 11);
    }

    #[test]
    fn test_load_and_accessors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("img.txt");
        fs::write(&path, "0 0.5 0.5 0.4 0.4 0.5 0.5 2 0.6 0.6 0\n").unwrap();

        let table = load_table(&path, 2).unwrap();
        assert_eq!(table.shape(), &[1, 11]);

        let row = table.row(0);
        assert_eq!(instance_box(&row), [0.5, 0.5, 0.4, 0.4]);
        assert_eq!(keypoint(&row, 0), (0.5, 0.5, 2.0));
        assert_eq!(keypoint(&row, 1), (0.6, 0.6, 0.0));
    }

    #[test]
    fn test_load_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").unwrap();

        let table = load_table(&path, 2).unwrap();
        assert_eq!(table.shape(), &[0, 11]);
    }

    #[test]
    fn test_load_schema_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, "0 0.5 0.5 0.4 0.4 0.5 0.5 2\n").unwrap();

        match load_table(&path, 2) {
            Err(CalibError::SchemaMismatch {
                expected, actual, ..
            }) => {
                assert_eq!(expected, 11);
                assert_eq!(actual, 8);
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_load_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.txt");
        fs::write(&path, "0 0.5 oops 0.4 0.4 0.5 0.5 2 0.6 0.6 0\n").unwrap();

        assert!(matches!(
            load_table(&path, 2),
            Err(CalibError::ParseError(_))
        ));
    }

    #[test]
    fn test_detail_discovery() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b_detail.txt"), "").unwrap();
        fs::write(dir.path().join("a_detail.txt"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();

        let files = detail_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(detail_base_name(&files[0]), Some("a"));
        assert_eq!(detail_base_name(&files[1]), Some("b"));
        assert_eq!(detail_base_name(Path::new("a.txt")), None);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");

        let table = Array2::from_shape_vec(
            (1, 11),
            vec![0.0, 0.5, 0.5, 0.4, 0.4, 0.123456, 0.654321, 2.0, 0.0, 0.0, 0.0],
        )
        .unwrap();
        save_table(&path, &table).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "0 0.500000 0.500000 0.400000 0.400000 0.123456 0.654321 2 0.000000 0.000000 0\n"
        );

        let reloaded = load_table(&path, 2).unwrap();
        assert_eq!(reloaded, table);
    }
}
