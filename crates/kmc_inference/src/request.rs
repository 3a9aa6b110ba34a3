use std::fmt;

use kmc_core::SelectedFile;

use crate::validator::{has_extension, ValidatedSelection};

/// Service routes, one per input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Predict,
    PredictFromNii,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Predict => "/predict",
            Endpoint::PredictFromNii => "/predict_from_nii",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// One file field of the multipart body.
#[derive(Clone, PartialEq, Eq)]
pub struct FormPart {
    pub field: &'static str,
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FormPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormPart")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    pub endpoint: Endpoint,
    pub parts: Vec<FormPart>,
}

impl InferenceRequest {
    pub fn endpoint_path(&self) -> &'static str {
        self.endpoint.path()
    }

    pub fn part(&self, field: &str) -> Option<&FormPart> {
        self.parts.iter().find(|p| p.field == field)
    }
}

pub fn build_request(selection: &ValidatedSelection<'_>) -> InferenceRequest {
    match selection {
        ValidatedSelection::FeatureFile(file) => InferenceRequest {
            endpoint: Endpoint::Predict,
            parts: vec![form_part("file", file)],
        },
        ValidatedSelection::ImageMaskPair { image, mask } => InferenceRequest {
            endpoint: Endpoint::PredictFromNii,
            parts: vec![form_part("image", image), form_part("mask", mask)],
        },
    }
}

fn form_part(field: &'static str, file: &SelectedFile) -> FormPart {
    FormPart {
        field,
        file_name: file.name.clone(),
        content_type: content_type_for(&file.name),
        bytes: file.bytes.clone(),
    }
}

fn content_type_for(name: &str) -> &'static str {
    if has_extension(name, &[".txt"]) {
        "text/plain"
    } else if has_extension(name, &[".gz"]) {
        "application/gzip"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate;
    use kmc_core::InputSelection;

    #[test]
    fn test_feature_file_request() {
        let selection = InputSelection::feature_file(SelectedFile::new("features.txt", b"a=1\n".to_vec()));
        let request = build_request(&validate(&selection).unwrap());

        assert_eq!(request.endpoint_path(), "/predict");
        assert_eq!(request.parts.len(), 1);
        let part = request.part("file").unwrap();
        assert_eq!(part.file_name, "features.txt");
        assert_eq!(part.content_type, "text/plain");
        assert_eq!(part.bytes, b"a=1\n".to_vec());
    }

    #[test]
    fn test_image_mask_request() {
        let selection = InputSelection::image_mask_pair(
            SelectedFile::new("t1.nii.gz", vec![0x1f, 0x8b]),
            SelectedFile::new("mask.nii", vec![7; 4]),
        );
        let request = build_request(&validate(&selection).unwrap());

        assert_eq!(request.endpoint, Endpoint::PredictFromNii);
        assert_eq!(request.endpoint_path(), "/predict_from_nii");
        let fields: Vec<&str> = request.parts.iter().map(|p| p.field).collect();
        assert_eq!(fields, vec!["image", "mask"]);
        assert_eq!(request.part("image").unwrap().content_type, "application/gzip");
        assert_eq!(request.part("mask").unwrap().content_type, "application/octet-stream");
        assert!(request.part("file").is_none());
    }

    #[test]
    fn test_build_is_deterministic() {
        let selection = InputSelection::feature_file(SelectedFile::new("features.txt", b"x=2".to_vec()));
        let validated = validate(&selection).unwrap();
        assert_eq!(build_request(&validated), build_request(&validated));
    }
}
