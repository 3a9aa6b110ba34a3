//! Structural checks on the user's file selection.
//!
//! Only metadata (name, size) is looked at before submission. Feature file
//! contents are previewed by `inspect_feature_file` but never block a
//! request: the service decides whether the 42 entries are right.

use kmc_core::{Error, InputSelection, InputSlot, Result, SelectedFile};

pub const EXPECTED_FEATURE_COUNT: usize = 42;

const FEATURE_EXTENSIONS: &[&str] = &[".txt"];
const NIFTI_EXTENSIONS: &[&str] = &[".nii", ".nii.gz"];

/// A selection that passed validation. Only this can become a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatedSelection<'a> {
    FeatureFile(&'a SelectedFile),
    ImageMaskPair {
        image: &'a SelectedFile,
        mask: &'a SelectedFile,
    },
}

pub fn validate(selection: &InputSelection) -> Result<ValidatedSelection<'_>> {
    match selection {
        InputSelection::FeatureFile { file } => {
            let file = check_file(file.as_ref(), InputSlot::FeatureFile)?;
            Ok(ValidatedSelection::FeatureFile(file))
        }
        InputSelection::ImageMaskPair { image, mask } => {
            let image = check_file(image.as_ref(), InputSlot::Image)?;
            let mask = check_file(mask.as_ref(), InputSlot::Mask)?;
            Ok(ValidatedSelection::ImageMaskPair { image, mask })
        }
    }
}

fn check_file(file: Option<&SelectedFile>, slot: InputSlot) -> Result<&SelectedFile> {
    let file = file.ok_or(Error::MissingFile(slot))?;

    if file.is_empty() {
        return Err(Error::EmptyFile {
            slot,
            name: file.name.clone(),
        });
    }

    let (extensions, expected) = match slot {
        InputSlot::FeatureFile => (FEATURE_EXTENSIONS, ".txt"),
        InputSlot::Image | InputSlot::Mask => (NIFTI_EXTENSIONS, ".nii / .nii.gz"),
    };
    if !has_extension(&file.name, extensions) {
        return Err(Error::UnsupportedExtension {
            slot,
            name: file.name.clone(),
            expected,
        });
    }

    Ok(file)
}

pub(crate) fn has_extension(name: &str, extensions: &[&str]) -> bool {
    let lower = name.to_ascii_lowercase();
    extensions
        .iter()
        .any(|ext| lower.len() > ext.len() && lower.ends_with(ext))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFileSummary {
    pub entries: usize,
    pub malformed_lines: usize,
}

impl FeatureFileSummary {
    pub fn looks_complete(&self) -> bool {
        self.entries == EXPECTED_FEATURE_COUNT && self.malformed_lines == 0
    }
}

/// Counts `key=value` lines the way the service will read them. Blank lines
/// are skipped; invalid UTF-8 is replaced rather than rejected.
pub fn inspect_feature_file(file: &SelectedFile) -> FeatureFileSummary {
    let text = String::from_utf8_lossy(&file.bytes);
    let mut summary = FeatureFileSummary {
        entries: 0,
        malformed_lines: 0,
    };

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.split_once('=') {
            Some((key, _)) if !key.trim().is_empty() => summary.entries += 1,
            _ => summary.malformed_lines += 1,
        }
    }

    summary
}
