use std::{fs, fs::File, io::BufReader, path::Path};

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::metadata::flags::{ConsistencyFlagger, CTIME_FORMAT};
use crate::metadata::{Field, MetadataSnapshot, TagValue};

/// Builds a [`MetadataSnapshot`] from a file on disk: filesystem facts,
/// guessed MIME type, and embedded EXIF capture tags. A file without EXIF
/// data (or with unreadable tags) still yields a full snapshot; every
/// unreadable tag degrades to an absent value.
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn extract<P: AsRef<Path>>(path: P) -> Result<MetadataSnapshot> {
        let path = path.as_ref();
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::extract_with_name(path, &display_name)
    }

    /// Extracts with an explicit display name, for callers whose on-disk
    /// names are content-addressed rather than user-facing.
    pub fn extract_with_name(path: &Path, display_name: &str) -> Result<MetadataSnapshot> {
        let fs_meta = fs::metadata(path)?;
        let size_kb = fs_meta.len() as f64 / 1024.0;
        let mime = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("Unknown");
        let modified: DateTime<Local> = fs_meta.modified()?.into();

        let mut snapshot = MetadataSnapshot::new()
            .with(Field::FileName, TagValue::present(display_name))
            .with(Field::FileSize, TagValue::present(format!("{size_kb:.2} KB")))
            .with(Field::FileType, TagValue::present(mime))
            .with(
                Field::LastModified,
                TagValue::present(modified.format(CTIME_FORMAT).to_string()),
            );

        match Self::read_exif(path) {
            Ok(exif) => {
                snapshot.set(Field::CameraMake, ascii_tag(&exif, exif::Tag::Make));
                snapshot.set(Field::CameraModel, ascii_tag(&exif, exif::Tag::Model));
                snapshot.set(Field::DateTaken, ascii_tag(&exif, exif::Tag::DateTimeOriginal));
                snapshot.set(Field::ExposureTime, display_tag(&exif, exif::Tag::ExposureTime));
                snapshot.set(Field::FStop, display_tag(&exif, exif::Tag::FNumber));
                snapshot.set(
                    Field::IsoSpeed,
                    display_tag(&exif, exif::Tag::PhotographicSensitivity),
                );
                snapshot.set(Field::FocalLength, display_tag(&exif, exif::Tag::FocalLength));
                snapshot.set(Field::GpsLatitude, display_tag(&exif, exif::Tag::GPSLatitude));
                snapshot.set(Field::GpsLongitude, display_tag(&exif, exif::Tag::GPSLongitude));
                snapshot.set(Field::Software, ascii_tag(&exif, exif::Tag::Software));
            }
            Err(err) => {
                log::debug!("no EXIF data in {}: {}", path.display(), err);
            }
        }

        let flags = ConsistencyFlagger::evaluate(&snapshot);
        snapshot.set_flags(flags);
        Ok(snapshot)
    }

    fn read_exif(path: &Path) -> std::result::Result<exif::Exif, exif::Error> {
        let file = File::open(path).map_err(exif::Error::Io)?;
        let mut reader = BufReader::new(file);
        exif::Reader::new().read_from_container(&mut reader)
    }
}

/// Reads an ASCII tag as its raw text, so capture timestamps keep the
/// `YYYY:MM:DD HH:MM:SS` form instead of a prettified rendering.
fn ascii_tag(exif: &exif::Exif, tag: exif::Tag) -> TagValue {
    let Some(field) = exif.get_field(tag, exif::In::PRIMARY) else {
        return TagValue::missing();
    };

    if let exif::Value::Ascii(ref chunks) = field.value {
        if let Some(chunk) = chunks.first() {
            let text = String::from_utf8_lossy(chunk);
            let text = text.trim_matches('\0').trim();
            if text.is_empty() {
                return TagValue::missing();
            }
            return TagValue::present(text);
        }
        return TagValue::missing();
    }

    TagValue::present(field.display_value().to_string())
}

fn display_tag(exif: &exif::Exif, tag: exif::Tag) -> TagValue {
    match exif.get_field(tag, exif::In::PRIMARY) {
        Some(field) => TagValue::present(field.display_value().to_string()),
        None => TagValue::missing(),
    }
}
