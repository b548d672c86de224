//! Record types produced by the loaders.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::normalize::normalize;

/// NFC-normalized school name; the join key between environment and growth data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SchoolKey(String);

impl SchoolKey {
    pub fn new(raw: &str) -> Self {
        SchoolKey(normalize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for SchoolKey {
    fn from(raw: &str) -> Self {
        SchoolKey::new(raw)
    }
}

/// One sensor reading. Blank cells in the source become `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentRecord {
    pub school: SchoolKey,
    pub time: NaiveDateTime,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub ph: Option<f64>,
    pub ec: Option<f64>,
    /// Remaining source columns as raw text, in file order.
    #[serde(serialize_with = "serialize_pairs")]
    pub extra: Vec<(String, String)>,
}

/// Numeric environment columns that can be averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvField {
    Temperature,
    Humidity,
    Ph,
    Ec,
}

impl EnvField {
    pub const ALL: [EnvField; 4] = [
        EnvField::Temperature,
        EnvField::Humidity,
        EnvField::Ph,
        EnvField::Ec,
    ];

    /// Column name in the source files.
    pub fn column(self) -> &'static str {
        match self {
            EnvField::Temperature => "temperature",
            EnvField::Humidity => "humidity",
            EnvField::Ph => "ph",
            EnvField::Ec => "ec",
        }
    }

    pub fn value(self, record: &EnvironmentRecord) -> Option<f64> {
        match self {
            EnvField::Temperature => record.temperature,
            EnvField::Humidity => record.humidity,
            EnvField::Ph => record.ph,
            EnvField::Ec => record.ec,
        }
    }
}

/// A passthrough cell from a growth sheet column with no dedicated field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TraitValue {
    Number(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
    Empty,
}

/// One measured individual from a growth sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthRecord {
    pub school: SchoolKey,
    pub leaf_count: Option<f64>,
    pub shoot_length_mm: Option<f64>,
    pub fresh_weight_g: Option<f64>,
    /// Remaining columns, in sheet order.
    #[serde(serialize_with = "serialize_pairs")]
    pub extra: Vec<(String, TraitValue)>,
}

fn serialize_pairs<S: Serializer, V: Serialize>(pairs: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(pairs.iter().map(|(k, v)| (k, v)))
}

/// Growth columns that every sheet must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthTrait {
    LeafCount,
    ShootLength,
    FreshWeight,
}

impl GrowthTrait {
    pub const ALL: [GrowthTrait; 3] = [
        GrowthTrait::LeafCount,
        GrowthTrait::ShootLength,
        GrowthTrait::FreshWeight,
    ];

    pub fn column(self) -> &'static str {
        match self {
            GrowthTrait::LeafCount => "leaf_count",
            GrowthTrait::ShootLength => "shoot_length_mm",
            GrowthTrait::FreshWeight => "fresh_weight_g",
        }
    }

    /// Header spellings accepted for this trait, already in
    /// [`crate::normalize::header_key`] form.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            GrowthTrait::LeafCount => &["leaf_count", "잎 수", "잎수"],
            GrowthTrait::ShootLength => &["shoot_length_mm", "shoot_length", "지상부 길이", "지상부길이"],
            GrowthTrait::FreshWeight => &["fresh_weight_g", "fresh_weight", "생중량"],
        }
    }

    pub fn value(self, record: &GrowthRecord) -> Option<f64> {
        match self {
            GrowthTrait::LeafCount => record.leaf_count,
            GrowthTrait::ShootLength => record.shoot_length_mm,
            GrowthTrait::FreshWeight => record.fresh_weight_g,
        }
    }
}
