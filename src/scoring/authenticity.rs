use crate::metadata::flags::{check_capture_order, DateOrdering};
use crate::metadata::{Field, MetadataSnapshot};
use crate::scoring::{is_generic, settle_score, Deduction, RiskLevel, ScoreReport};

/// Editing tools whose presence in the Software tag counts against the
/// image, matched as case-insensitive substrings.
const EDITING_SOFTWARE: &[&str] = &["photoshop", "gimp", "lightroom", "paint", "snapseed"];

type ScoreRule = fn(&MetadataSnapshot) -> Vec<Deduction>;

// Evaluated in order; flag ordering is part of the report contract, so new
// rules are appended, never inserted.
const RULES: &[ScoreRule] = &[
    camera_make_rule,
    camera_model_rule,
    gps_rule,
    date_order_rule,
    software_rule,
];

/// Weighted deduction model over a metadata snapshot. Starts at 100 and
/// applies each triggered rule independently; several may fire at once.
pub struct AuthenticityScorer;

impl AuthenticityScorer {
    pub fn score(snapshot: &MetadataSnapshot) -> ScoreReport {
        let deductions: Vec<Deduction> = RULES.iter().flat_map(|rule| rule(snapshot)).collect();

        let score = settle_score(&deductions);
        let risk_level = RiskLevel::from_score(score);

        ScoreReport {
            authenticity_score: score,
            risk_level,
            flags: deductions.into_iter().map(|d| d.text).collect(),
            recommendation: risk_level.recommendation().to_string(),
        }
    }
}

fn identity_field_missing(snapshot: &MetadataSnapshot, field: Field) -> bool {
    match snapshot.get(field).as_str() {
        Some(value) => is_generic(value),
        None => true,
    }
}

fn camera_make_rule(snapshot: &MetadataSnapshot) -> Vec<Deduction> {
    if identity_field_missing(snapshot, Field::CameraMake) {
        vec![Deduction::new(15, "Camera make is missing or generic.")]
    } else {
        Vec::new()
    }
}

fn camera_model_rule(snapshot: &MetadataSnapshot) -> Vec<Deduction> {
    if identity_field_missing(snapshot, Field::CameraModel) {
        vec![Deduction::new(15, "Camera model is missing or generic.")]
    } else {
        Vec::new()
    }
}

fn gps_rule(snapshot: &MetadataSnapshot) -> Vec<Deduction> {
    let absent = |field: Field| match snapshot.get(field).as_str() {
        Some(value) => value.trim().is_empty(),
        None => true,
    };

    if absent(Field::GpsLatitude) || absent(Field::GpsLongitude) {
        vec![Deduction::new(10, "GPS location data is missing.")]
    } else {
        Vec::new()
    }
}

fn date_order_rule(snapshot: &MetadataSnapshot) -> Vec<Deduction> {
    let (Some(taken), Some(modified)) = (
        snapshot.get(Field::DateTaken).as_str(),
        snapshot.get(Field::LastModified).as_str(),
    ) else {
        return Vec::new();
    };

    match check_capture_order(taken, modified) {
        DateOrdering::CaptureAfterModified => vec![Deduction::new(
            20,
            "'Date Taken' is after 'Last Modified' time.",
        )],
        // A parse failure is reported, not penalized.
        DateOrdering::UnreadableCapture | DateOrdering::UnreadableModified => vec![Deduction::new(
            0,
            "Date fields could not be read for consistency checking.",
        )],
        DateOrdering::Consistent => Vec::new(),
    }
}

fn software_rule(snapshot: &MetadataSnapshot) -> Vec<Deduction> {
    let Some(software) = snapshot.get(Field::Software).as_str() else {
        return Vec::new();
    };
    let lowered = software.to_lowercase();

    EDITING_SOFTWARE
        .iter()
        .filter(|tool| lowered.contains(*tool))
        .map(|tool| Deduction::new(25, format!("Editing software detected: {tool}.")))
        .collect()
}
