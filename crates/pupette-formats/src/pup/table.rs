//! Block table association
//!
//! Every blocked entry has exactly one companion entry with the block table
//! bit set whose `id` equals the blocked entry's *directory index*. The
//! association is resolved once for the whole directory.

use super::entry::PupEntry;
use super::error::{PupError, PupResult};
use tracing::trace;

/// Resolved blocked-entry/block-table pairs, indexed by directory position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableIndex {
    /// `table_for[i]` is the directory index of entry `i`'s block table
    table_for: Vec<Option<usize>>,
    /// `owner_of[j]` is the blocked entry that table entry `j` describes
    owner_of: Vec<Option<usize>>,
}

impl TableIndex {
    /// Resolve the associations of a whole directory
    ///
    /// Fails on the first blocked entry that has a reserved identifier, no
    /// table, or more than one table.
    pub fn resolve(entries: &[PupEntry]) -> PupResult<Self> {
        let mut table_for = vec![None; entries.len()];
        let mut owner_of = vec![None; entries.len()];

        // Group table entries by the directory index they point at
        let mut candidates: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];
        for (j, entry) in entries.iter().enumerate() {
            if entry.is_block_table() {
                if let Some(slot) = usize::try_from(entry.id())
                    .ok()
                    .and_then(|target| candidates.get_mut(target))
                {
                    slot.push(j);
                }
            }
        }

        for (i, entry) in entries.iter().enumerate() {
            if !entry.is_blocked() {
                continue;
            }

            if entry.has_reserved_id() {
                return Err(PupError::ReservedBlockedId {
                    index: i,
                    id: entry.id(),
                });
            }

            let table = match candidates[i].as_slice() {
                [] => return Err(PupError::MissingBlockTable { index: i }),
                [j] => *j,
                many => {
                    return Err(PupError::DuplicateBlockTable {
                        index: i,
                        tables: many.to_vec(),
                    });
                }
            };

            trace!("entry {} uses block table entry {}", i, table);
            table_for[i] = Some(table);
            owner_of[table] = Some(i);
        }

        Ok(Self {
            table_for,
            owner_of,
        })
    }

    /// Block table entry for the blocked entry at `index`
    pub fn table_for(&self, index: usize) -> Option<usize> {
        self.table_for.get(index).copied().flatten()
    }

    /// Blocked entry described by the table entry at `index`
    pub fn owner_of(&self, index: usize) -> Option<usize> {
        self.owner_of.get(index).copied().flatten()
    }

    /// Number of resolved associations
    pub fn len(&self) -> usize {
        self.table_for.iter().filter(|t| t.is_some()).count()
    }

    /// Whether the directory has no blocked entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate `(blocked, table)` pairs in directory order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.table_for
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.map(|t| (i, t)))
    }
}
