//! Mapping from source dataset categories to target class ids.

use std::collections::{BTreeMap, HashMap};

use crate::coco::Category;
use crate::types::CategoryKey;

/// The fixed target taxonomy of the caries detector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetClass {
    Impacted = 0,
    Caries = 1,
    PeriapicalLesion = 2,
    DeepCaries = 3,
}

impl TargetClass {
    pub const ALL: [TargetClass; 4] = [
        TargetClass::Impacted,
        TargetClass::Caries,
        TargetClass::PeriapicalLesion,
        TargetClass::DeepCaries,
    ];

    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            TargetClass::Impacted => "Impacted",
            TargetClass::Caries => "Caries",
            TargetClass::PeriapicalLesion => "Periapical Lesion",
            TargetClass::DeepCaries => "Deep Caries",
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.id() == id)
    }
}

// Pediatric dataset labels. Pulpitis is folded into Deep Caries and
// developmental anomalies into Impacted.
pub const PEDIATRIC_LABELS: &[(&str, TargetClass)] = &[
    ("龋病", TargetClass::Caries),
    ("深窝沟", TargetClass::DeepCaries),
    ("根尖周炎", TargetClass::PeriapicalLesion),
    ("牙齿发育异常", TargetClass::Impacted),
    ("牙髓炎", TargetClass::DeepCaries),
];

/// Many-to-one table from source category keys to target class ids.
///
/// Built once before a conversion pass and only read afterwards. Keys
/// without an entry are dropped by the caller.
#[derive(Debug, Clone, Default)]
pub struct CategoryMap {
    table: HashMap<CategoryKey, u32>,
    names: BTreeMap<u32, String>,
}

impl CategoryMap {
    /// Static table for the LabelMe polygon schema.
    pub fn pediatric() -> Self {
        let table = PEDIATRIC_LABELS
            .iter()
            .map(|(label, class)| (CategoryKey::Label(label.to_string()), class.id()))
            .collect();
        let names = TargetClass::ALL
            .iter()
            .map(|class| (class.id(), class.name().to_string()))
            .collect();
        Self { table, names }
    }

    /// Sequential ids over categories sorted by ascending source id.
    pub fn sequential(categories: &[Category]) -> Self {
        let mut sorted: Vec<&Category> = categories.iter().collect();
        sorted.sort_by_key(|category| category.id);
        sorted.dedup_by_key(|category| category.id);

        let mut map = Self::default();
        for (target_id, category) in sorted.into_iter().enumerate() {
            let target_id = target_id as u32;
            map.table.insert(CategoryKey::Id(category.id), target_id);
            map.names.insert(target_id, category.name.clone());
        }
        map
    }

    /// Only categories named in `allowlist`, numbered by list position.
    ///
    /// Several source categories sharing a listed name all map to that
    /// name's position.
    pub fn allowlist(categories: &[Category], allowlist: &[String]) -> Self {
        let mut map = Self::default();
        for (target_id, name) in allowlist.iter().enumerate() {
            map.names.insert(target_id as u32, name.clone());
        }
        for category in categories {
            if let Some(target_id) = allowlist.iter().position(|name| name == &category.name) {
                map.table
                    .insert(CategoryKey::Id(category.id), target_id as u32);
            }
        }
        map
    }

    /// Pick `allowlist` when non-empty, else the sequential mapping.
    pub fn for_coco(categories: &[Category], allowlist: &[String]) -> Self {
        if allowlist.is_empty() {
            Self::sequential(categories)
        } else {
            Self::allowlist(categories, allowlist)
        }
    }

    pub fn get(&self, key: &CategoryKey) -> Option<u32> {
        self.table.get(key).copied()
    }

    /// Target class names ordered by id
    pub fn names(&self) -> impl Iterator<Item = (u32, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Source keys sorted, with their target ids
    pub fn entries(&self) -> Vec<(&CategoryKey, u32)> {
        let mut entries: Vec<_> = self.table.iter().map(|(key, id)| (key, *id)).collect();
        entries.sort();
        entries
    }
}
