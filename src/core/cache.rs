use super::table::CombinedTable;
use anyhow::Result;

/// Persistent snapshot of a [`CombinedTable`].
pub trait TableCache: Send + Sync {
    /// Whether a snapshot is present, regardless of whether it is readable.
    fn exists(&self) -> bool;

    fn load(&self) -> Result<CombinedTable>;

    /// Replaces any existing snapshot.
    fn save(&self, table: &CombinedTable) -> Result<()>;
}
