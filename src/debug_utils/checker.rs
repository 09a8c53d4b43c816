//! Consistency checks for [`SparseSet`] and [`Registry`].
//!
//! These walk every internal structure and are much slower than any
//! individual operation, so they are meant for tests, fuzzing and debugging.

use anyhow::{Result, bail, ensure};
use hashbrown::HashSet;
use rustc_hash::FxBuildHasher;

use crate::{Id, Registry, SparseSet};

/// Checks that `set` satisfies all of its structural invariants:
///
/// - the dense array holds no null identifier and no index beyond the limit;
/// - every present identifier's slot maps back to its own dense position;
/// - no two present identifiers share a slot;
/// - the payload buffer holds exactly one record per present identifier;
/// - capacity covers the length.
///
/// Sparse entries that point at a dense position holding another slot are
/// tolerated.
pub fn validate_sparse_set(set: &SparseSet) -> Result<()> {
    let ids = set.ids();
    ensure!(
        set.capacity() >= ids.len(),
        "Capacity {} is less than length {}",
        set.capacity(),
        ids.len()
    );
    ensure!(
        set.payload_bytes().len() == ids.len() * set.stride(),
        "Payload buffer holds {} bytes, expected {} records of {} bytes",
        set.payload_bytes().len(),
        ids.len(),
        set.stride()
    );

    let mut slots = HashSet::with_capacity_and_hasher(ids.len(), FxBuildHasher);
    for (pos, &id) in ids.iter().enumerate() {
        ensure!(!id.is_null(), "Null identifier at position {pos}");
        ensure!(
            id.index() <= set.max_index(),
            "{id} at position {pos} exceeds the index limit {}",
            set.max_index()
        );
        if !slots.insert(id.index()) {
            bail!("{id} at position {pos} shares its slot with an earlier entry");
        }
        let Some(slot) = id.slot() else {
            bail!("{id} at position {pos} has no slot");
        };
        match set.sparse().get(slot) {
            Some(sparse_pos) if sparse_pos == pos => {}
            Some(sparse_pos) => {
                bail!("{id} at position {pos} has sparse entry pointing at {sparse_pos}")
            }
            None => bail!("{id} at position {pos} has no sparse entry"),
        }
        ensure!(
            set.index_of(id) == Some(pos),
            "Lookup of {id} does not find position {pos}"
        );
    }

    let mut present = 0;
    for (slot, pos) in set.sparse().entries() {
        if set
            .id_at(pos)
            .is_some_and(|id| id.index() as usize == slot.index())
        {
            present += 1;
        }
    }
    ensure!(
        present == ids.len(),
        "Sparse index confirms {present} entries but the dense array holds {}",
        ids.len()
    );

    Ok(())
}

/// Checks that `registry` satisfies all of its structural invariants:
///
/// - the watermark does not exceed the index limit;
/// - the free list holds distinct indices below the watermark, none of them
///   live;
/// - every index below the watermark that is not on the free list is live;
/// - the live count matches.
pub fn validate_registry(registry: &Registry) -> Result<()> {
    let watermark = registry.watermark();
    ensure!(
        u64::from(watermark) <= u64::from(registry.max_index()) + 1,
        "Watermark {watermark} exceeds the index limit {}",
        registry.max_index()
    );

    let mut free = HashSet::with_capacity_and_hasher(registry.free_list().len(), FxBuildHasher);
    for &slot in registry.free_list() {
        let index = slot.index() as u32;
        ensure!(
            index < watermark,
            "Free {slot} was never handed out (watermark {watermark})"
        );
        ensure!(free.insert(index), "{slot} is on the free list twice");
        ensure!(!registry.is_alive(index), "Free {slot} is marked live");
    }

    let mut live = 0;
    for index in 0..watermark {
        let Some(generation) = registry.generation(index) else {
            bail!("Index {index} below the watermark has no generation");
        };
        if free.contains(&index) {
            ensure!(
                registry.current(index).is_none(),
                "Free index {index} has a current identifier"
            );
            continue;
        }
        let id = Id::new(index, generation);
        ensure!(
            registry.is_alive(index) && registry.valid(id),
            "Index {index} is neither free nor live"
        );
        live += 1;
    }
    ensure!(
        live == registry.len(),
        "Found {live} live identifiers, registry reports {}",
        registry.len()
    );

    Ok(())
}
