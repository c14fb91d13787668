use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::error::TigError;
use crate::core::header::TigHeader;
use crate::core::tig::Tig;
use crate::core::types::{TigId, UNASSIGNED_TIG_ID};
use crate::utils::io::{create_writer, open_reader};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access tig store: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read or write tig: {0}")]
    Tig(#[from] TigError),

    #[error("Tig {0} is already in the store")]
    DuplicateTig(TigId),

    #[error("Record {0} in the stream has no tig ID")]
    UnassignedTig(usize),

    #[error("Failed to serialize store summary: {0}")]
    Summary(#[from] serde_json::Error),
}

/// Summary format version for compatibility checking
pub const SUMMARY_VERSION: &str = "1.0.0";

/// Serializable summary of a store: one header per tig
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSummary {
    pub version: String,
    pub created_at: String,
    pub tig_count: usize,
    pub total_children: u64,
    pub tigs: Vec<TigHeader>,
}

/// A flat collection of independent tigs with an ID index
#[derive(Debug, Default)]
pub struct TigStore {
    tigs: Vec<Tig>,

    /// Index: tig ID -> index in tigs vec
    id_to_index: HashMap<TigId, usize>,
}

impl TigStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tig, returning its ID.
    ///
    /// A tig without an ID is given one past the largest ID in the store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateTig` if the store already holds a tig
    /// with the same ID.
    pub fn add(&mut self, mut tig: Tig) -> Result<TigId, StoreError> {
        if !tig.is_assigned() {
            tig.tig_id = self.next_id();
        }
        if self.id_to_index.contains_key(&tig.tig_id) {
            return Err(StoreError::DuplicateTig(tig.tig_id));
        }

        let id = tig.tig_id;
        self.id_to_index.insert(id, self.tigs.len());
        self.tigs.push(tig);
        Ok(id)
    }

    /// The ID an unassigned tig would get
    #[must_use]
    pub fn next_id(&self) -> TigId {
        self.id_to_index
            .keys()
            .copied()
            .max()
            .map_or(0, |max| max.saturating_add(1).min(UNASSIGNED_TIG_ID - 1))
    }

    /// Get a tig by ID
    #[must_use]
    pub fn get(&self, id: TigId) -> Option<&Tig> {
        self.id_to_index.get(&id).map(|&idx| &self.tigs[idx])
    }

    /// Get a tig by ID for modification. Its ID must not be changed.
    pub fn get_mut(&mut self, id: TigId) -> Option<&mut Tig> {
        self.id_to_index.get(&id).map(|&idx| &mut self.tigs[idx])
    }

    /// Tigs in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Tig> {
        self.tigs.iter()
    }

    /// Header projection of every tig, in insertion order
    #[must_use]
    pub fn headers(&self) -> Vec<TigHeader> {
        self.tigs.iter().map(TigHeader::from).collect()
    }

    /// Number of tigs in the store
    #[must_use]
    pub fn len(&self) -> usize {
        self.tigs.len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tigs.is_empty()
    }

    /// Write every tig back to back
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Tig` if a tig is invalid or cannot be written.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), StoreError> {
        for tig in &self.tigs {
            tig.save(writer)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read tigs until the end of the stream
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Tig` if a record is malformed,
    /// `StoreError::DuplicateTig` if two records share an ID, and
    /// `StoreError::UnassignedTig` for a record without an ID. Stores written
    /// by [`TigStore::save`] never contain one, and giving it a fresh ID here
    /// would silently renumber it.
    pub fn load<R: Read>(reader: &mut R) -> Result<Self, StoreError> {
        let mut store = Self::new();
        let mut tig = Tig::new();
        while tig.load_next(reader)? {
            if !tig.is_assigned() {
                return Err(StoreError::UnassignedTig(store.len()));
            }
            debug!(
                "Loaded tig {} with {} children",
                tig.tig_id,
                tig.number_of_children()
            );
            store.add(tig.clone())?;
        }
        Ok(store)
    }

    /// Write the store to a file, gzip-compressed if the name ends in `.gz`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be created or written,
    /// including a failure to finish a gzip stream.
    pub fn save_to_file(&self, path: &Path) -> Result<(), StoreError> {
        let mut writer = create_writer(path)?;
        self.save(&mut writer)?;
        writer.finish()?;
        debug!("Wrote {} tigs to {}", self.len(), path.display());
        Ok(())
    }

    /// Load a store from a file, decompressing gzip input
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file cannot be read, or any error from
    /// [`TigStore::load`].
    pub fn load_from_file(path: &Path) -> Result<Self, StoreError> {
        let mut reader = open_reader(path)?;
        let store = Self::load(&mut reader)?;
        debug!("Read {} tigs from {}", store.len(), path.display());
        Ok(store)
    }

    /// Summarize the store
    #[must_use]
    pub fn summary(&self) -> StoreSummary {
        StoreSummary {
            version: SUMMARY_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            tig_count: self.len(),
            total_children: self
                .tigs
                .iter()
                .map(|t| t.number_of_children() as u64)
                .sum(),
            tigs: self.headers(),
        }
    }

    /// Export the store summary to JSON
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Summary` if serialization fails.
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.summary())?)
    }
}

impl<'a> IntoIterator for &'a TigStore {
    type Item = &'a Tig;
    type IntoIter = std::slice::Iter<'a, Tig>;

    fn into_iter(self) -> Self::IntoIter {
        self.tigs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::position::PositionRecord;
    use crate::core::types::ChildKind;

    fn tig_with_reads(id: TigId, reads: &[u32]) -> Tig {
        let mut tig = Tig::with_id(id);
        for (i, &read) in reads.iter().enumerate() {
            let bgn = 100 * i as u32;
            tig.add_child(PositionRecord::new(ChildKind::Read, read, bgn, bgn + 150));
        }
        tig
    }

    #[test]
    fn test_add_and_get() {
        let mut store = TigStore::new();
        assert!(store.is_empty());

        store.add(tig_with_reads(4, &[1, 2])).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(4).unwrap().number_of_children(), 2);
        assert!(store.get(5).is_none());
    }

    #[test]
    fn test_add_assigns_ids() {
        let mut store = TigStore::new();
        assert_eq!(store.add(Tig::new()).unwrap(), 0);
        assert_eq!(store.add(tig_with_reads(10, &[1])).unwrap(), 10);
        assert_eq!(store.add(Tig::new()).unwrap(), 11);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut store = TigStore::new();
        store.add(Tig::with_id(3)).unwrap();
        assert!(matches!(
            store.add(Tig::with_id(3)),
            Err(StoreError::DuplicateTig(3))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_mut() {
        let mut store = TigStore::new();
        store.add(Tig::with_id(1)).unwrap();
        store.get_mut(1).unwrap().flags.set_circular(true);
        assert!(store.get(1).unwrap().flags.suggest_circular());
    }

    #[test]
    fn test_save_load() {
        let mut store = TigStore::new();
        store.add(tig_with_reads(0, &[5, 6, 7])).unwrap();
        store.add(tig_with_reads(1, &[8])).unwrap();
        store.add(Tig::with_id(2)).unwrap();

        let mut bytes = Vec::new();
        store.save(&mut bytes).unwrap();

        let loaded = TigStore::load(&mut bytes.as_slice()).unwrap();
        assert_eq!(loaded.len(), 3);
        for tig in &store {
            assert_eq!(loaded.get(tig.tig_id), Some(tig));
        }
    }

    #[test]
    fn test_load_rejects_unassigned_record() {
        let mut bytes = Vec::new();
        tig_with_reads(0, &[1]).save(&mut bytes).unwrap();
        tig_with_reads(UNASSIGNED_TIG_ID, &[2]).save(&mut bytes).unwrap();

        assert!(matches!(
            TigStore::load(&mut bytes.as_slice()),
            Err(StoreError::UnassignedTig(1))
        ));
    }

    #[test]
    fn test_file_round_trip_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = TigStore::new();
        store.add(tig_with_reads(0, &[1, 2, 3])).unwrap();

        for name in ["tigs.bin", "tigs.bin.gz"] {
            let path = dir.path().join(name);
            store.save_to_file(&path).unwrap();
            let loaded = TigStore::load_from_file(&path).unwrap();
            assert_eq!(loaded.get(0), store.get(0));
        }
    }

    #[test]
    fn test_summary_json() {
        let mut store = TigStore::new();
        store.add(tig_with_reads(0, &[1, 2])).unwrap();
        store.add(tig_with_reads(1, &[3])).unwrap();

        let summary = store.summary();
        assert_eq!(summary.tig_count, 2);
        assert_eq!(summary.total_children, 3);
        assert_eq!(summary.tigs[1].tig_id, 1);

        let json = store.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"children_len\": 2"));
    }
}
