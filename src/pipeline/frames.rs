use std::path::{Path, PathBuf};

use crate::foundation::error::{GlitchError, GlitchResult};

/// Decomposed numbered frame filename, e.g. `shot_0042.png` ->
/// prefix `shot_`, number 42, padding 4, ext `png`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameName {
    pub prefix: String,
    pub number: u64,
    pub padding: usize,
    pub ext: String,
}

impl FrameName {
    /// Parse a filename ending in digits before its extension. Returns
    /// `None` for anything that is not a numbered frame.
    pub fn parse(filename: &str) -> Option<Self> {
        let dot = filename.rfind('.')?;
        let (stem, ext) = filename.split_at(dot);
        let ext = &ext[1..];
        if stem.is_empty() || ext.is_empty() {
            return None;
        }

        let digits_start = stem
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()?
            .0;
        let digits = &stem[digits_start..];
        let number: u64 = digits.parse().ok()?;
        Some(Self {
            prefix: stem[..digits_start].to_string(),
            number,
            padding: digits.len(),
            ext: ext.to_string(),
        })
    }

    /// Filename for `number` using this name's prefix and padding but the
    /// given extension. Numbers wider than the padding are not truncated.
    pub fn renumber(&self, number: u64, ext: &str) -> String {
        format!(
            "{}{:0width$}.{}",
            self.prefix,
            number,
            ext,
            width = self.padding
        )
    }
}

/// One input frame on disk.
#[derive(Clone, Debug)]
pub struct SourceFrame {
    pub name: FrameName,
    pub path: PathBuf,
}

/// Collect the numbered frames in `dir`, sorted by frame number. Files
/// that do not look like frames are skipped; an empty result is an error.
pub fn scan_frames(dir: &Path) -> GlitchResult<Vec<SourceFrame>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| GlitchError::pipeline(format!("cannot read {}: {e}", dir.display())))?;

    let mut frames = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| GlitchError::pipeline(format!("cannot read directory entry: {e}")))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(name) = FrameName::parse(filename) {
            frames.push(SourceFrame { name, path });
        }
    }

    if frames.is_empty() {
        return Err(GlitchError::pipeline(format!(
            "no numbered frame files found in {}",
            dir.display()
        )));
    }

    frames.sort_by_key(|f| f.name.number);
    Ok(frames)
}
