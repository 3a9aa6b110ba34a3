//! Maps whatever the prediction service returned onto `InferenceResult`.
//!
//! The service has shipped several response schemas (REF-only, MMC/Control
//! with two probabilities, compound labels). Normalization never fails:
//! missing or unexpected fields just leave the matching part of the result
//! at its default.

use std::collections::BTreeMap;

use kmc_core::InferenceResult;
use serde_json::{Map, Value};

pub const UNKNOWN_LABEL: &str = "N/A";
pub const DEFAULT_MODEL_IDENTIFIER: &str = "radiomics_elasticnet_logreg";

/// Response fields carrying one class probability each, and the class name
/// they are reported under.
const PROBABILITY_FIELDS: &[(&str, &str)] = &[
    ("probability_ref", "ref"),
    ("probability_mmc", "mmc"),
    ("probability_control", "control"),
];

enum Pattern {
    Exact(&'static str),
    ContainsAll(&'static [&'static str]),
    ContainsAny(&'static [&'static str]),
}

impl Pattern {
    fn matches(&self, class: &str) -> bool {
        match self {
            Pattern::Exact(token) => class == *token,
            Pattern::ContainsAll(tokens) => tokens.iter().all(|t| class.contains(t)),
            Pattern::ContainsAny(tokens) => tokens.iter().any(|t| class.contains(t)),
        }
    }
}

struct LabelRule {
    pattern: Pattern,
    label: &'static str,
}

/// Evaluated top to bottom against the upper-cased class; first match wins.
const LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        pattern: Pattern::Exact("REF"),
        label: "Control / referencia (clase modelo)",
    },
    LabelRule {
        pattern: Pattern::Exact("MMC_OR_CONTROL"),
        label: "MMC o Control (clase modelo: no-REF)",
    },
    LabelRule {
        pattern: Pattern::Exact("MMC"),
        label: "MMC (Método Madre Canguro)",
    },
    LabelRule {
        pattern: Pattern::Exact("CONTROL"),
        label: "Control (cuidado convencional)",
    },
    LabelRule {
        pattern: Pattern::ContainsAll(&["MMC", "CONTROL"]),
        label: "MMC vs Control (clasificación binaria)",
    },
    LabelRule {
        pattern: Pattern::ContainsAny(&["MMC"]),
        label: "MMC (Método Madre Canguro)",
    },
    LabelRule {
        pattern: Pattern::ContainsAny(&["CONTROL", "REF"]),
        label: "Control / referencia",
    },
];

/// The untyped JSON body of a prediction response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    fields: Map<String, Value>,
}

impl RawResponse {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    /// The class as reported. Falsy values (`0`, `false`, blank strings)
    /// count as absent; other numbers and `true` are stringified.
    pub fn predicted_class(&self) -> Option<String> {
        match self.get("predicted_class")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            Value::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }

    pub fn probability(&self, field: &str) -> Option<f64> {
        self.get(field)?.as_f64().filter(|p| p.is_finite())
    }

    pub fn model_type(&self) -> Option<&str> {
        self.get("model_type")?.as_str().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn raw_class_int(&self) -> Option<i64> {
        let value = self.get("raw_class_int")?;
        value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        })
    }
}

impl From<Value> for RawResponse {
    /// Anything other than a JSON object carries no usable fields.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }
}

/// Whitespace is ignored for matching, but an unmatched class is returned
/// exactly as the service sent it.
pub fn resolve_label(predicted_class: Option<&str>) -> String {
    let raw = match predicted_class {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return UNKNOWN_LABEL.to_string(),
    };

    let class = raw.trim().to_ascii_uppercase();
    LABEL_RULES
        .iter()
        .find(|rule| rule.pattern.matches(&class))
        .map(|rule| rule.label.to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub fn normalize(raw: &RawResponse, model_hint: Option<&str>) -> InferenceResult {
    let predicted_class = raw.predicted_class();
    let predicted_label = resolve_label(predicted_class.as_deref());

    let class_probabilities: BTreeMap<String, f64> = PROBABILITY_FIELDS
        .iter()
        .filter_map(|(field, class)| raw.probability(field).map(|p| (class.to_string(), p)))
        .collect();

    let model_identifier = raw
        .model_type()
        .or_else(|| model_hint.map(str::trim).filter(|h| !h.is_empty()))
        .unwrap_or(DEFAULT_MODEL_IDENTIFIER)
        .to_string();

    tracing::debug!(
        "Normalized predicted_class {:?} to '{}' with {} probabilities",
        predicted_class,
        predicted_label,
        class_probabilities.len()
    );

    InferenceResult {
        predicted_label,
        class_probabilities,
        model_identifier,
        raw_class_code: raw.raw_class_int(),
    }
}
