pub mod exif;
pub mod flags;

use std::collections::HashMap;
use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Boundary representation of a tag that could not be read. Internal code
/// checks `TagValue::is_missing`, never this text.
pub const SENTINEL: &str = "Could not retrieve";

/// The fixed field set of a metadata snapshot, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FileName,
    FileSize,
    FileType,
    LastModified,
    CameraMake,
    CameraModel,
    DateTaken,
    ExposureTime,
    FStop,
    IsoSpeed,
    FocalLength,
    GpsLatitude,
    GpsLongitude,
    Software,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::FileName,
        Field::FileSize,
        Field::FileType,
        Field::LastModified,
        Field::CameraMake,
        Field::CameraModel,
        Field::DateTaken,
        Field::ExposureTime,
        Field::FStop,
        Field::IsoSpeed,
        Field::FocalLength,
        Field::GpsLatitude,
        Field::GpsLongitude,
        Field::Software,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::FileName => "File Name",
            Field::FileSize => "File Size",
            Field::FileType => "File Type",
            Field::LastModified => "Last Modified",
            Field::CameraMake => "Camera Make",
            Field::CameraModel => "Camera Model",
            Field::DateTaken => "Date Taken",
            Field::ExposureTime => "Exposure Time",
            Field::FStop => "F-Stop",
            Field::IsoSpeed => "ISO Speed",
            Field::FocalLength => "Focal Length",
            Field::GpsLatitude => "GPS Latitude",
            Field::GpsLongitude => "GPS Longitude",
            Field::Software => "Software",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.key() == key)
    }

    pub fn is_camera(self) -> bool {
        matches!(self, Field::CameraMake | Field::CameraModel)
    }

    pub fn is_gps(self) -> bool {
        matches!(self, Field::GpsLatitude | Field::GpsLongitude)
    }

    fn index(self) -> usize {
        Field::ALL.iter().position(|&f| f == self).unwrap_or(0)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A metadata value that is either present (possibly empty) or absent.
/// Absence serializes to [`SENTINEL`]; it is never compared as a string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagValue(Option<String>);

impl TagValue {
    pub fn present(value: impl Into<String>) -> Self {
        TagValue(Some(value.into()))
    }

    pub fn missing() -> Self {
        TagValue(None)
    }

    /// Builds a value from boundary text, folding the sentinel back to absent.
    pub fn from_wire(value: &str) -> Self {
        if value == SENTINEL {
            TagValue(None)
        } else {
            TagValue(Some(value.to_string()))
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_missing(&self) -> bool {
        self.0.is_none()
    }

    /// Display text as it appears on the wire.
    pub fn display(&self) -> &str {
        self.0.as_deref().unwrap_or(SENTINEL)
    }
}

impl Serialize for TagValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display())
    }
}

/// An immutable snapshot of a file's capture metadata plus derived
/// consistency flags. Edits never mutate in place; the simulator clones.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataSnapshot {
    values: [TagValue; 14],
    flags: Vec<String>,
}

impl MetadataSnapshot {
    pub fn new() -> Self {
        MetadataSnapshot {
            values: std::array::from_fn(|_| TagValue::missing()),
            flags: Vec::new(),
        }
    }

    pub fn get(&self, field: Field) -> &TagValue {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, value: TagValue) {
        self.values[field.index()] = value;
    }

    pub fn with(mut self, field: Field, value: TagValue) -> Self {
        self.set(field, value);
        self
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn set_flags(&mut self, flags: Vec<String>) {
        self.flags = flags;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &TagValue)> {
        Field::ALL.iter().map(|&f| (f, self.get(f)))
    }

    /// Flattens the snapshot to the generic wire mapping consumed by the
    /// evidence scorer and external callers. Flags are not included.
    pub fn to_field_map(&self) -> HashMap<String, String> {
        self.iter()
            .map(|(f, v)| (f.key().to_string(), v.display().to_string()))
            .collect()
    }
}

impl Default for MetadataSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for MetadataSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Field::ALL.len() + 1))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.key(), value)?;
        }
        map.serialize_entry("Flags", &self.flags)?;
        map.end()
    }
}
