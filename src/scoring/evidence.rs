use std::collections::HashMap;

use crate::metadata::SENTINEL;
use crate::scoring::{is_generic, settle_score, Deduction, EvidenceReport, Verdict};

/// First year a capture device matching "iPhone" could have existed.
const IPHONE_LAUNCH_YEAR: i32 = 2007;

/// Vendors whose cameras stamp GPS data by default.
const MOBILE_VENDORS: &[&str] = &["iphone", "samsung", "pixel"];

/// JPEG files above this size are unusual for straight-from-camera output.
const JPEG_SIZE_LIMIT_KB: f64 = 10_000.0;

type EvidenceRule = fn(&FieldView) -> Option<Deduction>;

// Deliberately disjoint from the authenticity rules: this is a second,
// independent opinion, not a refinement of the first.
const RULES: &[EvidenceRule] = &[
    anachronistic_model_rule,
    editing_software_rule,
    mobile_without_gps_rule,
    oversized_jpeg_rule,
    generic_make_rule,
];

/// Heuristic forgery scorer over an arbitrary metadata field mapping. The
/// mapping does not have to come from this engine; missing keys, sentinel
/// values, and non-numeric sizes are all tolerated.
pub struct EvidenceScorer;

impl EvidenceScorer {
    pub fn score(fields: &HashMap<String, String>) -> EvidenceReport {
        let view = FieldView(fields);
        let deductions: Vec<Deduction> = RULES.iter().filter_map(|rule| rule(&view)).collect();

        let score = settle_score(&deductions);

        EvidenceReport {
            confidence_score: score,
            verdict: Verdict::from_score(score),
            evidence: deductions.into_iter().map(|d| d.text).collect(),
        }
    }
}

/// Read-only view that folds absent keys and the boundary sentinel into one
/// "not available" case.
struct FieldView<'a>(&'a HashMap<String, String>);

impl FieldView<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|value| *value != SENTINEL)
    }
}

fn capture_year(view: &FieldView) -> Option<i32> {
    let date = view.get("Date Taken")?;
    date.get(..4)?.parse().ok()
}

fn anachronistic_model_rule(view: &FieldView) -> Option<Deduction> {
    let model = view.get("Camera Model")?;
    if !model.to_lowercase().contains("iphone") {
        return None;
    }
    let year = capture_year(view)?;
    if year < IPHONE_LAUNCH_YEAR {
        Some(Deduction::new(
            30,
            format!(
                "Camera model '{model}' did not exist in {year} (iPhone launched in {IPHONE_LAUNCH_YEAR})."
            ),
        ))
    } else {
        None
    }
}

fn editing_software_rule(view: &FieldView) -> Option<Deduction> {
    let software = view.get("Software")?;
    let lowered = software.to_lowercase();
    if lowered.contains("photoshop") || lowered.contains("gimp") {
        Some(Deduction::new(
            25,
            format!("Editing software recorded in metadata: {software}."),
        ))
    } else {
        None
    }
}

fn mobile_without_gps_rule(view: &FieldView) -> Option<Deduction> {
    let make = view.get("Camera Make")?;
    let lowered = make.to_lowercase();
    if !MOBILE_VENDORS.iter().any(|vendor| lowered.contains(vendor)) {
        return None;
    }

    if view.get("GPS Latitude").is_none() || view.get("GPS Longitude").is_none() {
        Some(Deduction::new(
            15,
            "Mobile device photo is missing GPS data (commonly stripped during editing).",
        ))
    } else {
        None
    }
}

fn oversized_jpeg_rule(view: &FieldView) -> Option<Deduction> {
    let mime = view.get("File Type")?;
    if !mime.to_lowercase().contains("jpeg") {
        return None;
    }

    // "1234.56 KB" as written by the extractor; non-numeric sizes skip.
    let size_kb: f64 = view
        .get("File Size")?
        .trim()
        .trim_end_matches("KB")
        .trim()
        .parse()
        .ok()?;

    if size_kb > JPEG_SIZE_LIMIT_KB {
        Some(Deduction::new(
            10,
            format!("JPEG file is unusually large ({size_kb:.2} KB)."),
        ))
    } else {
        None
    }
}

fn generic_make_rule(view: &FieldView) -> Option<Deduction> {
    match view.get("Camera Make") {
        Some(make) if !is_generic(make) => None,
        _ => Some(Deduction::new(10, "Camera make is missing or generic.")),
    }
}
