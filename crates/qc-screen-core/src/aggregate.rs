//! Defect statistics and material risk
//!
//! Observations are grouped by (line, part number, defect). Groups whose part
//! resolves in the [`PartCatalog`] are then folded once more per material.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::mapping::{PartCatalog, UniqNo};
use crate::normalize::{normalize_part_number, normalize_text};
use crate::observation::DefectObservation;

/// One row per (line, part number, defect)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartDefectStat {
    pub line: String,
    pub part_number: String,
    pub part_number_norm: String,
    pub defect_name: String,
    pub defect_name_norm: String,
    pub occurrence_qty: i64,
    pub affected_days: usize,
    /// Greatest sheet name by plain string order
    pub last_seen_sheet: Option<String>,
}

/// One row per (line, material, defect)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialDefectRisk {
    pub line: String,
    pub material_name: String,
    pub material_name_norm: String,
    pub defect_name: String,
    pub defect_name_norm: String,
    /// Average quantity per contributing part/defect group, 4 decimals
    pub risk_score: f64,
    pub affected_parts: usize,
    pub sample_size: u64,
}

/// Everything the aggregator produces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefectStatistics {
    pub part_item_defect_stats: Vec<PartDefectStat>,
    pub material_item_defect_risk: Vec<MaterialDefectRisk>,
    /// Raw part numbers (as observed) with no catalog entry, sorted
    pub unmatched_part_numbers: Vec<String>,
}

type GroupKey = (String, String, String);

#[derive(Debug, Default)]
struct PartGroup {
    qty: i64,
    days: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct MaterialGroup {
    qty: i64,
    parts: BTreeSet<Option<UniqNo>>,
    samples: u64,
}

/// Build all statistics in one pass over `observations`
pub fn aggregate(observations: &[DefectObservation], catalog: &PartCatalog) -> DefectStatistics {
    let mut groups: BTreeMap<GroupKey, PartGroup> = BTreeMap::new();
    let mut unmatched: BTreeSet<String> = BTreeSet::new();

    for ob in observations {
        let key = (
            ob.line.clone(),
            ob.part_number.trim().to_string(),
            ob.defect_name.trim().to_string(),
        );
        let group = groups.entry(key).or_default();
        group.qty = group.qty.saturating_add(ob.quantity);
        group.days.insert(ob.sheet_name.clone());

        if !catalog.contains(&ob.part_number) {
            unmatched.insert(ob.part_number.clone());
        }
    }

    let mut materials: BTreeMap<GroupKey, MaterialGroup> = BTreeMap::new();
    for ((line, part_number, defect_name), group) in &groups {
        let Some(part) = catalog.lookup(part_number) else {
            continue;
        };
        for material in &part.materials {
            let material_name = material.material_name.trim();
            if material_name.is_empty() {
                continue;
            }
            let entry = materials
                .entry((line.clone(), material_name.to_string(), defect_name.clone()))
                .or_default();
            entry.qty = entry.qty.saturating_add(group.qty);
            entry.parts.insert(part.uniq_no.clone());
            entry.samples += 1;
        }
    }

    let part_item_defect_stats = groups
        .into_iter()
        .map(|((line, part_number, defect_name), group)| PartDefectStat {
            part_number_norm: normalize_part_number(&part_number),
            defect_name_norm: normalize_text(&defect_name),
            occurrence_qty: group.qty,
            affected_days: group.days.len(),
            last_seen_sheet: group.days.iter().next_back().cloned(),
            line,
            part_number,
            defect_name,
        })
        .collect();

    let material_item_defect_risk = materials
        .into_iter()
        .map(|((line, material_name, defect_name), group)| {
            let sample_size = group.samples.max(1);
            MaterialDefectRisk {
                material_name_norm: normalize_text(&material_name),
                defect_name_norm: normalize_text(&defect_name),
                risk_score: risk_score(group.qty, sample_size),
                affected_parts: group.parts.len(),
                sample_size,
                line,
                material_name,
                defect_name,
            }
        })
        .collect();

    DefectStatistics {
        part_item_defect_stats,
        material_item_defect_risk,
        unmatched_part_numbers: unmatched.into_iter().collect(),
    }
}

/// `qty / max(1, samples)` rounded to 4 decimal places
pub fn risk_score(qty: i64, samples: u64) -> f64 {
    let score = qty as f64 / samples.max(1) as f64;
    (score * 10_000.0).round() / 10_000.0
}
