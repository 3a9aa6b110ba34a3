use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which file picker a selected file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSlot {
    FeatureFile,
    Image,
    Mask,
}

impl InputSlot {
    pub fn label(&self) -> &'static str {
        match self {
            InputSlot::FeatureFile => "archivo de características",
            InputSlot::Image => "imagen T1",
            InputSlot::Mask => "máscara",
        }
    }

    pub fn missing_message(&self) -> &'static str {
        match self {
            InputSlot::FeatureFile => "Selecciona un archivo .txt con las características radiómicas.",
            InputSlot::Image => "Selecciona la imagen T1 (.nii / .nii.gz).",
            InputSlot::Mask => "Selecciona la máscara correspondiente (.nii / .nii.gz).",
        }
    }
}

/// A file picked by the user: its name and contents.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// The user's current input. Re-selection replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSelection {
    FeatureFile {
        file: Option<SelectedFile>,
    },
    ImageMaskPair {
        image: Option<SelectedFile>,
        mask: Option<SelectedFile>,
    },
}

impl InputSelection {
    pub fn feature_file(file: SelectedFile) -> Self {
        InputSelection::FeatureFile { file: Some(file) }
    }

    pub fn image_mask_pair(image: SelectedFile, mask: SelectedFile) -> Self {
        InputSelection::ImageMaskPair {
            image: Some(image),
            mask: Some(mask),
        }
    }

    /// Names of the files currently selected, in picker order.
    pub fn file_names(&self) -> Vec<&str> {
        match self {
            InputSelection::FeatureFile { file } => file.iter().map(|f| f.name.as_str()).collect(),
            InputSelection::ImageMaskPair { image, mask } => image
                .iter()
                .chain(mask.iter())
                .map(|f| f.name.as_str())
                .collect(),
        }
    }
}

/// Version-independent prediction record handed to the presenter and the
/// exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResult {
    pub predicted_label: String,
    #[serde(default)]
    pub class_probabilities: BTreeMap<String, f64>,
    pub model_identifier: String,
    #[serde(default)]
    pub raw_class_code: Option<i64>,
}

impl InferenceResult {
    pub fn probability(&self, class: &str) -> Option<f64> {
        self.class_probabilities.get(class).copied()
    }
}
