use chrono::NaiveDateTime;

use crate::metadata::{Field, MetadataSnapshot};

/// EXIF capture timestamps: `2024:05:01 10:30:00`.
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Filesystem modification times in ctime style: `Wed May  1 10:30:00 2024`.
pub const CTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Typed outcome of comparing a capture timestamp against a modification
/// time. Parse failures are observable here instead of being swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrdering {
    Consistent,
    CaptureAfterModified,
    UnreadableCapture,
    UnreadableModified,
}

pub fn check_capture_order(date_taken: &str, last_modified: &str) -> DateOrdering {
    let taken = match NaiveDateTime::parse_from_str(date_taken.trim(), EXIF_DATETIME_FORMAT) {
        Ok(taken) => taken,
        Err(_) => return DateOrdering::UnreadableCapture,
    };
    let modified = match NaiveDateTime::parse_from_str(last_modified.trim(), CTIME_FORMAT) {
        Ok(modified) => modified,
        Err(_) => return DateOrdering::UnreadableModified,
    };

    if taken > modified {
        DateOrdering::CaptureAfterModified
    } else {
        DateOrdering::Consistent
    }
}

type FlagRule = fn(&MetadataSnapshot) -> Option<String>;

// Append-only: new rules go at the end so existing flag ordering is stable.
const RULES: &[FlagRule] = &[date_order_rule, camera_presence_rule];

/// Derives anomaly flags from a snapshot. Pure; never fails, a rule that
/// cannot evaluate its inputs simply does not fire.
pub struct ConsistencyFlagger;

impl ConsistencyFlagger {
    pub fn evaluate(snapshot: &MetadataSnapshot) -> Vec<String> {
        RULES.iter().filter_map(|rule| rule(snapshot)).collect()
    }
}

fn date_order_rule(snapshot: &MetadataSnapshot) -> Option<String> {
    let taken = snapshot.get(Field::DateTaken).as_str()?;
    let modified = snapshot.get(Field::LastModified).as_str()?;

    match check_capture_order(taken, modified) {
        DateOrdering::CaptureAfterModified => {
            Some("⚠️ 'Date Taken' is after 'Last Modified' time.".to_string())
        }
        _ => None,
    }
}

fn camera_presence_rule(snapshot: &MetadataSnapshot) -> Option<String> {
    if snapshot.get(Field::CameraMake).is_missing() || snapshot.get(Field::CameraModel).is_missing()
    {
        Some(
            "⚠️ Camera make/model missing — may indicate editing or stripped metadata.".to_string(),
        )
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TagValue;

    fn snapshot(taken: &str, modified: &str) -> MetadataSnapshot {
        MetadataSnapshot::new()
            .with(Field::DateTaken, TagValue::present(taken))
            .with(Field::LastModified, TagValue::present(modified))
            .with(Field::CameraMake, TagValue::present("Canon"))
            .with(Field::CameraModel, TagValue::present("EOS 5D"))
    }

    #[test]
    fn capture_after_modification_is_flagged() {
        let flags = ConsistencyFlagger::evaluate(&snapshot(
            "2025:06:01 12:00:00",
            "Wed Jan  1 00:00:00 2025",
        ));
        assert_eq!(flags, vec!["⚠️ 'Date Taken' is after 'Last Modified' time.".to_string()]);
    }

    #[test]
    fn consistent_dates_produce_no_flags() {
        let flags = ConsistencyFlagger::evaluate(&snapshot(
            "2024:06:01 12:00:00",
            "Wed Jan  1 00:00:00 2025",
        ));
        assert!(flags.is_empty());
    }

    #[test]
    fn malformed_dates_never_panic_and_skip_the_rule() {
        for bad in ["not a date", "2025-06-01 12:00:00", "", "2025:13:99 99:99:99"] {
            let flags = ConsistencyFlagger::evaluate(&snapshot(bad, "Wed Jan  1 00:00:00 2025"));
            assert!(flags.is_empty(), "unexpected flags for {bad:?}: {flags:?}");
        }
        let flags = ConsistencyFlagger::evaluate(&snapshot("2025:06:01 12:00:00", "garbage"));
        assert!(flags.is_empty());
    }

    #[test]
    fn missing_camera_fields_are_flagged_once() {
        let stripped = MetadataSnapshot::new()
            .with(Field::DateTaken, TagValue::missing())
            .with(Field::CameraModel, TagValue::present("EOS 5D"));
        let flags = ConsistencyFlagger::evaluate(&stripped);
        assert_eq!(flags.len(), 1);
        assert!(flags[0].contains("Camera make/model missing"));
    }

    #[test]
    fn ordering_outcomes_are_typed() {
        assert_eq!(
            check_capture_order("2025:06:01 12:00:00", "Wed Jan  1 00:00:00 2025"),
            DateOrdering::CaptureAfterModified
        );
        assert_eq!(
            check_capture_order("bogus", "Wed Jan  1 00:00:00 2025"),
            DateOrdering::UnreadableCapture
        );
        assert_eq!(
            check_capture_order("2024:06:01 12:00:00", "bogus"),
            DateOrdering::UnreadableModified
        );
    }
}
