use capsim_data::{BacteriumId, Lineage, RemovalCause, SpeciesId};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Life record of one bacterium, kept after it is removed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LineageRecord {
    pub id: BacteriumId,
    pub species: SpeciesId,
    pub origin_id: BacteriumId,
    pub parent_id: Option<BacteriumId>,
    pub generation: u32,
    pub birth_tick: u64,
    pub removal_tick: Option<u64>,
    pub removal_cause: Option<RemovalCause>,
    pub children: Vec<BacteriumId>,
}

impl LineageRecord {
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.removal_tick.is_none()
    }
}

/// Every bacterium that ever lived in the world, keyed by id.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LineageRegistry {
    pub records: BTreeMap<BacteriumId, LineageRecord>,
}

impl LineageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a founder or a newborn; newborns are also linked to their parent.
    pub fn record_birth(&mut self, lineage: &Lineage, species: SpeciesId, tick: u64) {
        self.records.insert(
            lineage.id,
            LineageRecord {
                id: lineage.id,
                species,
                origin_id: lineage.origin_id,
                parent_id: lineage.parent_id,
                generation: lineage.generation,
                birth_tick: tick,
                removal_tick: None,
                removal_cause: None,
                children: Vec::new(),
            },
        );
        if let Some(parent) = lineage.parent_id {
            if let Some(record) = self.records.get_mut(&parent) {
                record.children.push(lineage.id);
            }
        }
    }

    pub fn record_removal(&mut self, id: BacteriumId, cause: RemovalCause, tick: u64) {
        if let Some(record) = self.records.get_mut(&id) {
            record.removal_tick = Some(tick);
            record.removal_cause = Some(cause);
        }
    }

    #[must_use]
    pub fn get(&self, id: BacteriumId) -> Option<&LineageRecord> {
        self.records.get(&id)
    }

    #[must_use]
    pub fn living_count(&self) -> usize {
        self.records.values().filter(|r| r.is_alive()).count()
    }

    /// Living members of each founder's clone, largest first.
    #[must_use]
    pub fn clone_sizes(&self) -> Vec<(BacteriumId, usize)> {
        let mut sizes: BTreeMap<BacteriumId, usize> = BTreeMap::new();
        for record in self.records.values().filter(|r| r.is_alive()) {
            *sizes.entry(record.origin_id).or_default() += 1;
        }
        let mut list: Vec<_> = sizes.into_iter().collect();
        list.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        list
    }

    /// Writes the registry as gzip-compressed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let file = File::create(path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        let json = serde_json::to_string(self)?;
        encoder.write_all(json.as_bytes())?;
        encoder.finish()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if !path.as_ref().exists() {
            return Ok(Self::new());
        }
        let file = File::open(path)?;
        let decoder = GzDecoder::new(BufReader::new(file));
        let registry = serde_json::from_reader(decoder)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_birth_links_parent() {
        let mut registry = LineageRegistry::new();
        let founder = Lineage::founder(BacteriumId(1));
        let child = Lineage::child_of(&founder, BacteriumId(2));
        registry.record_birth(&founder, SpeciesId(0), 0);
        registry.record_birth(&child, SpeciesId(0), 10);

        let parent = registry.get(BacteriumId(1)).expect("founder recorded");
        assert_eq!(parent.children, vec![BacteriumId(2)]);
        assert_eq!(registry.get(BacteriumId(2)).map(|r| r.generation), Some(1));
        assert_eq!(registry.clone_sizes(), vec![(BacteriumId(1), 2)]);
    }

    #[test]
    fn test_removal_is_recorded() {
        let mut registry = LineageRegistry::new();
        registry.record_birth(&Lineage::founder(BacteriumId(1)), SpeciesId(0), 0);
        registry.record_removal(BacteriumId(1), RemovalCause::OutOfBounds, 42);
        let record = registry.get(BacteriumId(1)).expect("recorded");
        assert!(!record.is_alive());
        assert_eq!(record.removal_tick, Some(42));
        assert_eq!(registry.living_count(), 0);
    }

    #[test]
    fn test_gzip_archive_round_trip() {
        let dir = std::env::temp_dir().join(format!("capsim_lineage_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("lineage.json.gz");

        let mut registry = LineageRegistry::new();
        registry.record_birth(&Lineage::founder(BacteriumId(7)), SpeciesId(1), 3);
        registry.save(&path).expect("save");
        let loaded = LineageRegistry::load(&path).expect("load");
        assert_eq!(loaded.records, registry.records);

        std::fs::remove_dir_all(&dir).ok();
    }
}
