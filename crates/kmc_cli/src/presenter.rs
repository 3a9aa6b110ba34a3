use std::fmt::Write;

use kmc_core::{ErrorInfo, InferenceResult, RequestState};

const BAR_WIDTH: usize = 20;

/// Display names for the class keys the normalizer produces.
fn class_title(class: &str) -> String {
    match class {
        "ref" => "REF".to_string(),
        "mmc" => "MMC".to_string(),
        "control" => "Control".to_string(),
        other => other.to_string(),
    }
}

/// Probabilities are stored as reported; only the display clamps them.
pub fn clamp_unit(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

pub fn probability_bar(p: f64) -> String {
    let filled = (clamp_unit(p) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

pub fn render_result(result: &InferenceResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Clase predicha: {}", result.predicted_label);

    for (class, p) in &result.class_probabilities {
        let _ = writeln!(
            out,
            "Probabilidad (clase {}): {:>5.1}% {}",
            class_title(class),
            clamp_unit(*p) * 100.0,
            probability_bar(*p)
        );
    }

    let raw = result
        .raw_class_code
        .map(|code| code.to_string())
        .unwrap_or_else(|| "-".to_string());
    let _ = writeln!(out, "Modelo: {} · Salida interna (raw): {}", result.model_identifier, raw);
    out
}

pub fn render_error(error: &ErrorInfo) -> String {
    format!("Error: {}\n", error.message)
}

/// Renders whatever the state holds. A failed state never shows a result.
pub fn render_state(state: &RequestState) -> String {
    match state {
        RequestState::Idle => String::new(),
        RequestState::Submitting => "Procesando…\n".to_string(),
        RequestState::Succeeded(result) => render_result(result),
        RequestState::Failed(error) => render_error(error),
    }
}
