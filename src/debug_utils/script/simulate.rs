//! Replays a [`Script`] against the real containers and a reference model.
//!
//! The reference model is deliberately naive: hash maps for slot lookup and a
//! plain vector of `(Id, record)` pairs for the dense order. Every result of
//! the real containers must match the model exactly, including the dense
//! position of every entry and which entry moved during a removal.

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use anyhow::{Context, Result, ensure};
use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

use super::{Op, Script};
use crate::debug_utils::{validate_registry, validate_sparse_set};
use crate::{
    Error, FieldType, FieldValue, Id, Insertion, Options, Registry, Removal, SparseSet,
};

/// Counters collected while replaying a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Identifiers handed out by the registry.
    pub creates: usize,
    /// Successful recycles.
    pub recycles: usize,
    /// Recycles of an identifier that was not valid.
    pub stale_recycles: usize,
    /// Insertions which appended a new entry.
    pub appends: usize,
    /// Insertions which replaced an entry for the same slot.
    pub replacements: usize,
    /// Insertions of an identifier that was already present.
    pub duplicates: usize,
    /// Successful removals.
    pub removes: usize,
    /// Removals of an identifier that was not present.
    pub missing_removes: usize,
    /// Successful swaps.
    pub swaps: usize,
    /// Calls to clear.
    pub clears: usize,
    /// Field writes that hit a present entry.
    pub field_writes: usize,
    /// Field reads that hit a present entry.
    pub field_reads: usize,
    /// Operations which returned an error (matching the model).
    pub errors: usize,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "creates:         {}", self.creates)?;
        writeln!(f, "recycles:        {}", self.recycles)?;
        writeln!(f, "stale recycles:  {}", self.stale_recycles)?;
        writeln!(f, "appends:         {}", self.appends)?;
        writeln!(f, "replacements:    {}", self.replacements)?;
        writeln!(f, "duplicates:      {}", self.duplicates)?;
        writeln!(f, "removes:         {}", self.removes)?;
        writeln!(f, "missing removes: {}", self.missing_removes)?;
        writeln!(f, "swaps:           {}", self.swaps)?;
        writeln!(f, "clears:          {}", self.clears)?;
        writeln!(f, "field writes:    {}", self.field_writes)?;
        writeln!(f, "field reads:     {}", self.field_reads)?;
        writeln!(f, "errors:          {}", self.errors)
    }
}

/// Reference model of a [`Registry`].
struct RegistryModel {
    /// Generation and liveness per index handed out so far.
    slots: HashMap<u32, (u32, bool), FxBuildHasher>,
    free: Vec<u32>,
    next: u32,
    max_index: u32,
}

impl RegistryModel {
    fn create(&mut self) -> Result<Id, Error> {
        if let Some(index) = self.free.pop() {
            let (generation, live) = self.slots.entry(index).or_default();
            *live = true;
            return Ok(Id::new(index, *generation));
        }
        if self.next > self.max_index {
            return Err(Error::CapacityExceeded);
        }
        let index = self.next;
        self.next += 1;
        self.slots.insert(index, (0, true));
        Ok(Id::new(index, 0))
    }

    fn recycle(&mut self, id: Id) -> Result<bool, Error> {
        match self.slots.get_mut(&id.index()) {
            Some((generation, live)) if *live && *generation == id.generation() => {
                *generation = generation.wrapping_add(1);
                *live = false;
                self.free.push(id.index());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn valid(&self, id: Id) -> bool {
        self.slots
            .get(&id.index())
            .is_some_and(|&(generation, live)| live && generation == id.generation())
    }
}

/// Reference model of a [`SparseSet`].
struct SetModel {
    dense: Vec<(Id, Vec<u8>)>,
    positions: HashMap<u32, usize, FxBuildHasher>,
    stride: usize,
    max_index: u32,
}

impl SetModel {
    fn lookup(&self, id: Id) -> Option<usize> {
        let pos = *self.positions.get(&id.index())?;
        (self.dense[pos].0 == id).then_some(pos)
    }

    fn insert(&mut self, id: Id, payload: Option<&[u8]>) -> Result<Insertion, Error> {
        if id.is_null() {
            return Err(Error::NullId);
        }
        if id.index() > self.max_index {
            return Err(Error::CapacityExceeded);
        }
        if let Some(payload) = payload {
            if payload.len() != self.stride {
                return Err(Error::PayloadSize {
                    expected: self.stride,
                    actual: payload.len(),
                });
            }
        }
        if let Some(&pos) = self.positions.get(&id.index()) {
            let entry = &mut self.dense[pos];
            if entry.0 == id {
                return Ok(Insertion::Duplicate(pos));
            }
            entry.0 = id;
            if let Some(payload) = payload {
                entry.1 = payload.to_vec();
            }
            return Ok(Insertion::Replaced(pos));
        }
        let pos = self.dense.len();
        let mut record = Vec::new();
        record.try_reserve_exact(self.stride)?;
        match payload {
            Some(payload) => record.extend_from_slice(payload),
            None => record.resize(self.stride, 0),
        }
        self.dense.push((id, record));
        self.positions.insert(id.index(), pos);
        Ok(Insertion::Appended(pos))
    }

    fn remove(&mut self, id: Id) -> Option<Removal> {
        let pos = self.lookup(id)?;
        self.dense.swap_remove(pos);
        self.positions.remove(&id.index());
        let moved = self.dense.get(pos).map(|&(moved, _)| moved);
        if let Some(moved) = moved {
            self.positions.insert(moved.index(), pos);
        }
        Some(Removal {
            position: pos,
            moved,
        })
    }

    fn swap(&mut self, a: usize, b: usize) -> Result<(), Error> {
        let len = self.dense.len();
        for position in [a, b] {
            if position >= len {
                return Err(Error::PositionOutOfBounds { position, len });
            }
        }
        self.dense.swap(a, b);
        self.positions.insert(self.dense[a].0.index(), a);
        self.positions.insert(self.dense[b].0.index(), b);
        Ok(())
    }

    fn clear(&mut self) {
        self.dense.clear();
        self.positions.clear();
    }

    fn check_field(&self, offset: usize, ty: FieldType) -> Result<(), Error> {
        if offset.checked_add(ty.size()).is_some_and(|end| end <= self.stride) {
            Ok(())
        } else {
            Err(Error::FieldOutOfBounds {
                offset,
                size: ty.size(),
                stride: self.stride,
            })
        }
    }

    fn set_field(&mut self, id: Id, offset: usize, value: FieldValue) -> Result<bool, Error> {
        self.check_field(offset, value.ty())?;
        let Some(pos) = self.lookup(id) else {
            return Ok(false);
        };
        let (bits, size) = field_bits(value);
        let bytes = bits.to_le_bytes();
        self.dense[pos].1[offset..offset + size].copy_from_slice(&bytes[..size]);
        Ok(true)
    }

    fn get_field(&self, id: Id, offset: usize, ty: FieldType) -> Result<Option<u64>, Error> {
        self.check_field(offset, ty)?;
        let Some(pos) = self.lookup(id) else {
            return Ok(None);
        };
        let mut bytes = [0; 8];
        bytes[..ty.size()].copy_from_slice(&self.dense[pos].1[offset..offset + ty.size()]);
        Ok(Some(u64::from_le_bytes(bytes)))
    }
}

/// Raw bit pattern and byte size of a field value.
///
/// Floats are compared by bits so that NaN payloads round trip.
fn field_bits(value: FieldValue) -> (u64, usize) {
    let bits = match value {
        FieldValue::U8(v) => u64::from(v),
        FieldValue::I32(v) => u64::from(v as u32),
        FieldValue::I64(v) => v as u64,
        FieldValue::F32(v) => u64::from(v.to_bits()),
        FieldValue::F64(v) => v.to_bits(),
    };
    (bits, value.ty().size())
}

/// Replays operations against a [`Registry`] and a [`SparseSet`] and checks
/// every result against a reference model.
pub struct Simulator {
    registry: Registry,
    set: SparseSet,
    registry_model: RegistryModel,
    set_model: SetModel,
    stats: Stats,
}

impl Simulator {
    /// Creates a simulator with empty containers using `options` and the given
    /// payload stride.
    pub fn new(options: &Options, stride: usize) -> Result<Self> {
        let mut set = SparseSet::with_options(options);
        set.set_stride(stride)?;
        let registry = Registry::with_options(options);
        Ok(Self {
            registry_model: RegistryModel {
                slots: HashMap::default(),
                free: vec![],
                next: 0,
                max_index: registry.max_index(),
            },
            set_model: SetModel {
                dense: vec![],
                positions: HashMap::default(),
                stride,
                max_index: set.max_index(),
            },
            registry,
            set,
            stats: Stats::default(),
        })
    }

    /// Replays a whole script on fresh containers, checking every invariant
    /// after each operation.
    pub fn run(options: &Options, script: &Script) -> Result<Stats> {
        let mut sim = Self::new(options, script.stride)?;
        for (i, op) in script.ops.iter().enumerate() {
            sim.apply(op)
                .and_then(|()| sim.check())
                .with_context(|| format!("operation {i}: {op}"))?;
        }
        Ok(sim.stats)
    }

    /// Statistics collected so far.
    #[must_use]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// The registry being exercised.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The sparse set being exercised.
    #[must_use]
    pub fn set(&self) -> &SparseSet {
        &self.set
    }

    /// Applies one operation to both the real containers and the model and
    /// checks that the results agree.
    pub fn apply(&mut self, op: &Op) -> Result<()> {
        trace!("Applying {op}");
        match op {
            Op::Create => {
                let actual = self.registry.create();
                let expected = self.registry_model.create();
                ensure!(actual == expected, "got {actual:?}, expected {expected:?}");
                match actual {
                    Ok(_) => stat!(self.stats, creates),
                    Err(_) => stat!(self.stats, errors),
                }
            }
            &Op::Recycle(id) => {
                let actual = self.registry.recycle(id);
                let expected = self.registry_model.recycle(id);
                ensure!(actual == expected, "got {actual:?}, expected {expected:?}");
                ensure!(!self.registry.valid(id), "{id} is still valid after recycle");
                match actual {
                    Ok(true) => stat!(self.stats, recycles),
                    Ok(false) => stat!(self.stats, stale_recycles),
                    Err(_) => stat!(self.stats, errors),
                }
            }
            Op::Insert(id, payload) => {
                let actual = self.set.insert(*id, payload.as_deref());
                // Running out of memory depends on the allocator. The model
                // stays as it was and `check` confirms the set did too.
                if actual == Err(Error::OutOfMemory) {
                    stat!(self.stats, errors);
                    return Ok(());
                }
                let expected = self.set_model.insert(*id, payload.as_deref());
                ensure!(actual == expected, "got {actual:?}, expected {expected:?}");
                match actual {
                    Ok(Insertion::Appended(_)) => stat!(self.stats, appends),
                    Ok(Insertion::Replaced(_)) => stat!(self.stats, replacements),
                    Ok(Insertion::Duplicate(_)) => stat!(self.stats, duplicates),
                    Err(_) => stat!(self.stats, errors),
                }
            }
            &Op::Remove(id) => {
                let actual = self.set.remove_entry(id);
                let expected = self.set_model.remove(id);
                ensure!(actual == expected, "got {actual:?}, expected {expected:?}");
                ensure!(!self.set.contains(id), "{id} still present after remove");
                match actual {
                    Some(_) => stat!(self.stats, removes),
                    None => stat!(self.stats, missing_removes),
                }
            }
            &Op::Swap(a, b) => {
                let actual = self.set.swap_at(a, b);
                let expected = self.set_model.swap(a, b);
                ensure!(actual == expected, "got {actual:?}, expected {expected:?}");
                match actual {
                    Ok(()) => stat!(self.stats, swaps),
                    Err(_) => stat!(self.stats, errors),
                }
            }
            Op::Clear => {
                self.set.clear();
                self.set_model.clear();
                ensure!(self.set.is_empty(), "set not empty after clear");
                stat!(self.stats, clears);
            }
            &Op::SetField(id, offset, value) => {
                let actual = self.set.set_field(id, offset, value);
                let expected = self.set_model.set_field(id, offset, value);
                ensure!(actual == expected, "got {actual:?}, expected {expected:?}");
                match actual {
                    Ok(true) => stat!(self.stats, field_writes),
                    Ok(false) => {}
                    Err(_) => stat!(self.stats, errors),
                }
            }
            &Op::GetField(id, offset, ty) => {
                let actual = self
                    .set
                    .get_field(id, offset, ty)
                    .map(|value| value.map(|v| field_bits(v).0));
                let expected = self.set_model.get_field(id, offset, ty);
                ensure!(actual == expected, "got {actual:?}, expected {expected:?}");
                match actual {
                    Ok(Some(_)) => stat!(self.stats, field_reads),
                    Ok(None) => {}
                    Err(_) => stat!(self.stats, errors),
                }
            }
        }
        Ok(())
    }

    /// Validates both containers and compares their full contents with the
    /// model.
    pub fn check(&self) -> Result<()> {
        validate_sparse_set(&self.set)?;
        validate_registry(&self.registry)?;

        ensure!(
            self.set.len() == self.set_model.dense.len(),
            "set has {} entries, model has {}",
            self.set.len(),
            self.set_model.dense.len()
        );
        for (pos, ((id, record), (model_id, model_record))) in
            self.set.iter().zip(&self.set_model.dense).enumerate()
        {
            ensure!(
                id == *model_id,
                "position {pos} holds {id}, model holds {model_id}"
            );
            ensure!(
                record == &model_record[..],
                "record of {id} at position {pos} differs from the model"
            );
        }

        let live = self
            .registry_model
            .slots
            .values()
            .filter(|&&(_, live)| live)
            .count();
        ensure!(
            self.registry.len() == live,
            "registry has {} live identifiers, model has {live}",
            self.registry.len()
        );
        for (&index, &(generation, live)) in &self.registry_model.slots {
            let id = Id::new(index, generation);
            ensure!(
                self.registry.valid(id) == self.registry_model.valid(id),
                "validity of {id} differs from the model"
            );
            ensure!(
                self.registry.is_alive(index) == live,
                "liveness of index {index} differs from the model"
            );
        }
        Ok(())
    }
}
