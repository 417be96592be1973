use std::collections::HashMap;

use serde::Serialize;

use crate::metadata::flags::{check_capture_order, DateOrdering};
use crate::metadata::{Field, MetadataSnapshot, TagValue, SENTINEL};
use crate::scoring::is_generic;

/// What-if result of applying proposed metadata edits. The original
/// snapshot is untouched; the simulated one is a modified copy.
#[derive(Debug, Clone, Serialize)]
pub struct EditDiff {
    #[serde(rename = "original_metadata")]
    pub original: MetadataSnapshot,
    #[serde(rename = "simulated_metadata")]
    pub simulated: MetadataSnapshot,
    #[serde(rename = "simulated_flags")]
    pub flags: Vec<String>,
}

/// Applies caller-proposed field overrides to a snapshot and reports what a
/// reviewer should notice about each change. Field names that are not part
/// of the snapshot's known field set are ignored.
pub struct EditSimulator;

impl EditSimulator {
    pub fn simulate(original: &MetadataSnapshot, edits: &HashMap<String, String>) -> EditDiff {
        let mut simulated = original.clone();
        let mut flags = Vec::new();

        // Walk the canonical field order so flag output is deterministic
        // regardless of the edit map's iteration order.
        for field in Field::ALL {
            let Some(new_value) = edits.get(field.key()) else {
                continue;
            };

            let previous = original.get(field).clone();
            simulated.set(field, TagValue::from_wire(new_value));

            let removed = new_value.is_empty() || new_value == SENTINEL;
            if removed {
                flags.push(format!("⚠️ '{field}' is missing or removed."));
            }

            if let Some(old) = previous.as_str() {
                if old != new_value {
                    flags.push(format!("✏️ '{field}' changed from '{old}' to '{new_value}'."));
                }
            }

            if field == Field::DateTaken && !removed {
                flags.extend(date_edit_flag(new_value, original));
            }

            if field.is_camera() && is_generic(new_value) {
                flags.push(format!("⚠️ '{field}' appears fake or tampered."));
            }

            if field.is_gps() && removed {
                flags.push(format!("⚠️ '{field}' removal suggests possible metadata stripping."));
            }
        }

        EditDiff {
            original: original.clone(),
            simulated,
            flags,
        }
    }
}

/// Re-runs the date-ordering check for an edited capture timestamp against
/// the original modification time, reporting parse failures distinctly.
fn date_edit_flag(new_value: &str, original: &MetadataSnapshot) -> Option<String> {
    let modified = original.get(Field::LastModified).as_str()?;

    match check_capture_order(new_value, modified) {
        DateOrdering::CaptureAfterModified => {
            Some("⚠️ Edited 'Date Taken' is after 'Last Modified' time.".to_string())
        }
        DateOrdering::UnreadableCapture => {
            Some("⚠️ Edited 'Date Taken' could not be parsed as a timestamp.".to_string())
        }
        DateOrdering::UnreadableModified => {
            Some("⚠️ 'Last Modified' could not be parsed as a timestamp.".to_string())
        }
        DateOrdering::Consistent => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edits(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn base_snapshot() -> MetadataSnapshot {
        MetadataSnapshot::new()
            .with(Field::FileName, TagValue::present("photo.jpg"))
            .with(Field::CameraMake, TagValue::present("Canon"))
            .with(Field::CameraModel, TagValue::present("EOS 5D"))
            .with(Field::DateTaken, TagValue::present("2024:06:01 12:00:00"))
            .with(
                Field::LastModified,
                TagValue::present("Wed Jan  1 00:00:00 2025"),
            )
            .with(Field::GpsLatitude, TagValue::present("12.34"))
            .with(Field::GpsLongitude, TagValue::present("56.78"))
    }

    #[test]
    fn empty_edit_set_is_a_no_op() {
        let original = base_snapshot();
        let diff = EditSimulator::simulate(&original, &HashMap::new());
        assert_eq!(diff.simulated, original);
        assert!(diff.flags.is_empty());
    }

    #[test]
    fn unknown_field_names_are_ignored() {
        let original = base_snapshot();
        let diff = EditSimulator::simulate(
            &original,
            &edits(&[("Shutter Count", "9000"), ("Flags", "nope")]),
        );
        assert_eq!(diff.simulated, original);
        assert!(diff.flags.is_empty());
    }

    #[test]
    fn blanking_gps_flags_removal_and_stripping() {
        let original = base_snapshot();
        let diff = EditSimulator::simulate(&original, &edits(&[("GPS Latitude", "")]));

        assert_eq!(diff.simulated.get(Field::GpsLatitude).as_str(), Some(""));
        assert!(diff
            .flags
            .iter()
            .any(|f| f.contains("'GPS Latitude' is missing or removed")));
        assert!(diff
            .flags
            .iter()
            .any(|f| f.contains("possible metadata stripping")));
    }

    #[test]
    fn changed_value_records_before_and_after() {
        let diff =
            EditSimulator::simulate(&base_snapshot(), &edits(&[("Camera Make", "Nikon")]));
        assert_eq!(
            diff.flags,
            vec!["✏️ 'Camera Make' changed from 'Canon' to 'Nikon'.".to_string()]
        );
        assert_eq!(diff.simulated.get(Field::CameraMake).as_str(), Some("Nikon"));
    }

    #[test]
    fn change_from_missing_original_is_not_reported_as_a_change() {
        let original = base_snapshot().with(Field::Software, TagValue::missing());
        let diff = EditSimulator::simulate(&original, &edits(&[("Software", "Photoshop")]));
        assert!(diff.flags.is_empty());
        assert_eq!(diff.simulated.get(Field::Software).as_str(), Some("Photoshop"));
    }

    #[test]
    fn sentinel_edit_counts_as_removal_and_goes_absent() {
        let diff = EditSimulator::simulate(&base_snapshot(), &edits(&[("Camera Model", SENTINEL)]));
        assert!(diff.simulated.get(Field::CameraModel).is_missing());
        assert!(diff
            .flags
            .iter()
            .any(|f| f.contains("'Camera Model' is missing or removed")));
        assert!(diff
            .flags
            .iter()
            .any(|f| f.contains("changed from 'EOS 5D'")));
    }

    #[test]
    fn backdating_capture_time_past_modification_is_flagged() {
        let diff = EditSimulator::simulate(
            &base_snapshot(),
            &edits(&[("Date Taken", "2025:06:01 12:00:00")]),
        );
        assert!(diff
            .flags
            .iter()
            .any(|f| f.contains("Edited 'Date Taken' is after")));
    }

    #[test]
    fn unparsable_capture_edit_is_flagged_distinctly() {
        let diff = EditSimulator::simulate(
            &base_snapshot(),
            &edits(&[("Date Taken", "sometime last year")]),
        );
        assert!(diff
            .flags
            .iter()
            .any(|f| f.contains("could not be parsed as a timestamp")));
    }

    #[test]
    fn placeholder_camera_values_look_tampered() {
        let diff =
            EditSimulator::simulate(&base_snapshot(), &edits(&[("Camera Make", "unknown")]));
        assert!(diff
            .flags
            .iter()
            .any(|f| f.contains("'Camera Make' appears fake or tampered")));
    }

    #[test]
    fn original_snapshot_is_never_mutated() {
        let original = base_snapshot();
        let before = original.clone();
        let _ = EditSimulator::simulate(&original, &edits(&[("Camera Make", "")]));
        assert_eq!(original, before);
    }
}
