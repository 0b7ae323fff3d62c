//! Diagnostic dump of both generations

use super::probed::ProbedStore;
use super::slot::Slot;
use std::fmt;
use std::io::{self, Write};

/// Helper for printing every slot of a store with `format!` and `{}`
///
/// Created by [`ProbedStore::dump`].
pub struct Dump<'a, H> {
    store: &'a ProbedStore<H>,
}

fn write_slots(f: &mut fmt::Formatter<'_>, slots: &[Slot]) -> fmt::Result {
    for (i, slot) in slots.iter().enumerate() {
        writeln!(f, "[{}] : {}", i, slot)?;
    }
    Ok(())
}

impl<H> fmt::Display for Dump<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dump for the current table: ")?;
        write_slots(f, self.store.current_table().slots())?;
        writeln!(f, "Dump for the old table: ")?;
        if let Some(old) = self.store.old_table() {
            write_slots(f, old.slots())?;
        }
        Ok(())
    }
}

impl<H> ProbedStore<H> {
    /// Display adapter listing every slot of both generations in index order
    pub fn dump(&self) -> Dump<'_, H> {
        Dump { store: self }
    }

    /// Write the dump to `out`
    pub fn dump_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self.dump())
    }
}
