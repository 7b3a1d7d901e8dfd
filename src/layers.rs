//! Layer image sequence extraction.
//!
//! A slice folder holds one image per layer, numbered in the file name
//! (`slice_0001.png`, `layer12.jpg`, ...).  Every decimal digit in the
//! name is concatenated into the layer number.  The usable sequence must
//! start at 1 and is cut at the first gap or repeated number; files past
//! the cut are counted as `skipped`, entries that are not numbered images
//! as `ignored`.  Numbers compare as digit strings, so their length is
//! unbounded.

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSequence {
    layers: Vec<PathBuf>,
    /// Numbered images dropped after the first break in numbering.
    pub skipped: usize,
    /// Entries that are not images or carry no number.
    pub ignored: usize,
}

impl LayerSequence {
    /// Scan `dir` (non-recursive).  Symlinks are followed; only
    /// subdirectories are left out.
    pub fn from_dir(dir: &Path) -> io::Result<Self> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                paths.push(path);
            }
        }
        let seq = Self::from_paths(paths);
        if seq.is_empty() {
            warn!("No layer sequence starting at 1 in {}", dir.display());
        } else {
            info!(
                "{} layers in {} ({} skipped, {} ignored)",
                seq.len(),
                dir.display(),
                seq.skipped,
                seq.ignored
            );
        }
        Ok(seq)
    }

    /// Build a sequence from an unordered listing.
    pub fn from_paths<I>(paths: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PathBuf>,
    {
        let mut ignored = 0;
        let mut numbered: Vec<(LayerNumber, PathBuf)> = Vec::new();
        for path in paths {
            let path = path.into();
            match layer_number(&path) {
                Some(n) => numbered.push((n, path)),
                None => ignored += 1,
            }
        }
        numbered.sort_by(|(a, _), (b, _)| a.cmp(b));

        let total = numbered.len();
        let mut layers = Vec::new();
        let mut expected = 1u64;
        for (n, path) in numbered {
            if !n.is(expected) {
                break;
            }
            layers.push(path);
            expected += 1;
        }

        Self {
            skipped: total - layers.len(),
            ignored,
            layers,
        }
    }

    /// Wrap an already validated list; index 0 is layer 1.
    pub fn from_ordered(layers: Vec<PathBuf>) -> Self {
        Self {
            layers,
            skipped: 0,
            ignored: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Image for the 0-based `layer_index`.
    pub fn get(&self, layer_index: u32) -> Option<&Path> {
        self.layers.get(layer_index as usize).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.layers.iter().map(PathBuf::as_path)
    }
}

/// Decimal layer number with leading zeros dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LayerNumber(String);

impl LayerNumber {
    fn is(&self, n: u64) -> bool {
        self.0 == n.to_string()
    }
}

impl Ord for LayerNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for LayerNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Layer number of an image path, or `None` for anything else.
fn layer_number(path: &Path) -> Option<LayerNumber> {
    let ext = path.extension()?.to_str()?;
    if !IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
        return None;
    }
    let name = path.file_name()?.to_str()?;
    let digits: String = name.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    Some(LayerNumber(digits.trim_start_matches('0').to_owned()))
}
