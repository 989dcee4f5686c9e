// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Dataset sharding.
//!
//! Annotation tools choke on directories with thousands of images, so this
//! utility shuffles a dataset directory and moves its images into numbered
//! folders of a fixed size. Each image's sibling `.txt` label moves along
//! with it, and an optional `classes.txt` is copied into every folder.

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::error::{CalibError, Result};

/// Counters reported after a split run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitSummary {
    /// Folders created.
    pub folders: usize,
    /// Images moved (labels move with their image and are not counted).
    pub files_moved: usize,
}

/// Check if a path is an image file based on extension.
fn is_image_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("png")
    })
}

/// Shard a dataset directory into fixed-size folders.
///
/// Images are shuffled before sharding so every folder gets a representative
/// slice of the dataset. Folders are named `split_<chunk_size>_<i>` under
/// `dest_dir`.
///
/// # Arguments
///
/// * `src_dir` - Directory holding the images (and sibling `.txt` labels).
/// * `dest_dir` - Root under which the split folders are created.
/// * `chunk_size` - Maximum number of images per folder.
/// * `classes_txt` - Optional `classes.txt` copied into every folder.
///
/// # Errors
///
/// Returns an error if a directory cannot be read or created, or if a file
/// move fails.
pub fn split(
    src_dir: &Path,
    dest_dir: &Path,
    chunk_size: usize,
    classes_txt: Option<&Path>,
) -> Result<SplitSummary> {
    if chunk_size == 0 {
        return Err(CalibError::ConfigError(
            "chunk size must be at least 1".to_string(),
        ));
    }

    let mut images: Vec<PathBuf> = fs::read_dir(src_dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image_file(path))
        .collect();
    images.shuffle(&mut thread_rng());

    let progress = ProgressBar::new(images.len() as u64).with_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
            .expect("valid progress template")
            .progress_chars("=> "),
    );
    progress.set_message("Splitting files into folders");

    let mut summary = SplitSummary::default();
    for (chunk_idx, chunk) in images.chunks(chunk_size).enumerate() {
        let target_dir = dest_dir.join(format!("split_{chunk_size}_{chunk_idx}"));
        fs::create_dir_all(&target_dir)?;
        summary.folders += 1;

        if let Some(classes) = classes_txt {
            if classes.exists() {
                let name = classes.file_name().unwrap_or_default();
                fs::copy(classes, target_dir.join(name))?;
            }
        }

        for image in chunk {
            let image_name = image.file_name().unwrap_or_default();
            fs::rename(image, target_dir.join(image_name))?;
            summary.files_moved += 1;

            let label = image.with_extension("txt");
            if label.exists() {
                let label_name = label.file_name().unwrap_or_default();
                fs::rename(&label, target_dir.join(label_name))?;
            }
            progress.inc(1);
        }
    }
    progress.finish_and_clear();

    Ok(summary)
}
