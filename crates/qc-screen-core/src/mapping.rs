//! Part to material mapping
//!
//! The mapping document is produced elsewhere (from the part master) and
//! read here as-is. Fields are read leniently: part numbers and material
//! names may have been exported as numbers, and unknown fields are ignored.

use std::collections::BTreeSet;

use ahash::AHashMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::normalize::normalize_part_number;

/// Root of the mapping document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MappingDocument {
    #[serde(default)]
    pub parts: Vec<PartEntry>,
}

/// One part and the materials it is made from
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub part_number: String,
    #[serde(default)]
    pub uniq_no: Option<UniqNo>,
    #[serde(default)]
    pub materials: Vec<MaterialEntry>,
}

/// A material attached to a part
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub material_name: String,
}

/// Identifier of a part in the part master, compared by value.
///
/// Any JSON scalar is accepted. Integral numbers compare equal whatever
/// their JSON spelling (`12`, `12.0`); other numbers keep their JSON text.
/// Arrays and objects are kept as their compact JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UniqNo {
    Number(i64),
    Decimal(String),
    Text(String),
    Flag(bool),
    Composite(String),
}

impl From<Value> for UniqNo {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => UniqNo::Number(i),
                (None, Some(f)) if is_integral(f) => UniqNo::Number(f as i64),
                _ => UniqNo::Decimal(n.to_string()),
            },
            Value::String(s) => UniqNo::Text(s),
            Value::Bool(b) => UniqNo::Flag(b),
            other => UniqNo::Composite(other.to_string()),
        }
    }
}

fn is_integral(f: f64) -> bool {
    f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

impl<'de> Deserialize<'de> for UniqNo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(UniqNo::from)
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Text(String),
        Int(i64),
        Float(f64),
        Flag(bool),
    }

    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Text(s)) => s,
        Some(Loose::Int(n)) => n.to_string(),
        Some(Loose::Float(n)) => n.to_string(),
        Some(Loose::Flag(b)) => b.to_string(),
        None => String::new(),
    })
}

/// Mapping entries indexed by normalized part number
#[derive(Debug, Clone, Default)]
pub struct PartCatalog {
    by_norm: AHashMap<String, PartEntry>,
    part_numbers: BTreeSet<String>,
}

impl PartCatalog {
    /// Index a mapping document.
    ///
    /// Entries with a blank part number are skipped. When two entries
    /// normalize to the same key the later one wins.
    pub fn from_document(doc: MappingDocument) -> Self {
        let mut catalog = PartCatalog::default();
        for part in doc.parts {
            let raw = part.part_number.trim().to_string();
            if raw.is_empty() {
                continue;
            }
            catalog.by_norm.insert(normalize_part_number(&raw), part);
            catalog.part_numbers.insert(raw);
        }
        catalog
    }

    /// Find the entry for a part number as written anywhere
    pub fn lookup(&self, part_number: &str) -> Option<&PartEntry> {
        self.by_norm.get(&normalize_part_number(part_number))
    }

    /// Whether a part number resolves
    pub fn contains(&self, part_number: &str) -> bool {
        self.lookup(part_number).is_some()
    }

    /// Distinct (trimmed) part numbers as written in the document
    pub fn part_numbers(&self) -> &BTreeSet<String> {
        &self.part_numbers
    }

    /// Number of distinct normalized keys
    pub fn len(&self) -> usize {
        self.by_norm.len()
    }

    /// Check if the catalog has no parts
    pub fn is_empty(&self) -> bool {
        self.by_norm.is_empty()
    }
}

impl From<MappingDocument> for PartCatalog {
    fn from(doc: MappingDocument) -> Self {
        PartCatalog::from_document(doc)
    }
}
