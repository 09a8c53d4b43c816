use alloc::vec::Vec;
use core::ops::RangeInclusive;

use arbitrary::{Arbitrary, Result, Unstructured};

use super::{Op, Payload, Script};
use crate::{FieldType, FieldValue, Id, Registry};

/// Configuration options for [`Script::arbitrary_with_config`].
///
/// It's generally fine to just use `Default::default` for this.
#[derive(Debug, Clone)]
pub struct ArbitraryScriptConfig {
    /// Payload stride of the script.
    pub stride: RangeInclusive<usize>,

    /// Number of operations in the script.
    pub num_ops: RangeInclusive<usize>,

    /// Largest index used for identifiers which were not handed out by the
    /// registry. Keeping this small limits the number of sparse pages a
    /// script can touch.
    pub max_foreign_index: u32,
}

impl Default for ArbitraryScriptConfig {
    fn default() -> Self {
        Self {
            stride: 0..=24,
            num_ops: 0..=200,
            max_foreign_index: 3 * crate::PAGE_SIZE as u32,
        }
    }
}

impl<'a> Arbitrary<'a> for Script {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        Script::arbitrary_with_config(u, ArbitraryScriptConfig::default())
    }
}

impl Script {
    /// Constructs a randomly-generated `Script`.
    ///
    /// Most operations refer to identifiers that the script's own `create`
    /// operations hand out, current or stale, so that replays exercise
    /// recycling and same-slot replacement. A few use arbitrary identifiers,
    /// wrong payload sizes or out-of-range offsets and positions to exercise
    /// error paths.
    pub fn arbitrary_with_config(
        u: &mut Unstructured<'_>,
        config: ArbitraryScriptConfig,
    ) -> Result<Self> {
        let stride = u.int_in_range(config.stride.clone())?;
        let mut builder = ScriptBuilder {
            u,
            config,
            registry: Registry::new(),
            issued: Vec::new(),
            inserted: 0,
            script: Script {
                stride,
                ops: Vec::new(),
            },
        };
        for _ in 0..builder.u.int_in_range(builder.config.num_ops.clone())? {
            if builder.u.is_empty() {
                break;
            }
            let op = builder.gen_op()?;
            builder.script.ops.push(op);
        }
        Ok(builder.script)
    }
}

struct ScriptBuilder<'a, 'b> {
    /// Source of randomness.
    u: &'a mut Unstructured<'b>,

    /// Configuration options
    config: ArbitraryScriptConfig,

    /// Tracks the identifiers handed out by the generated `create`s.
    registry: Registry,

    /// Every identifier handed out so far, including recycled ones.
    issued: Vec<Id>,

    /// Rough upper bound on the number of entries in the set.
    inserted: usize,

    /// Script that is being built.
    script: Script,
}

impl ScriptBuilder<'_, '_> {
    /// Picks an identifier, preferring previously issued ones.
    fn gen_id(&mut self) -> Result<Id> {
        if self.issued.is_empty() || self.u.ratio(1, 8)? {
            if self.u.ratio(1, 16)? {
                return Ok(Id::NULL);
            }
            let index = self.u.int_in_range(0..=self.config.max_foreign_index)?;
            let generation = self.u.int_in_range(0..=3)?;
            return Ok(Id::new(index, generation));
        }
        Ok(*self.u.choose(&self.issued)?)
    }

    /// Generates a payload, usually of the right size.
    fn gen_payload(&mut self) -> Result<Option<Payload>> {
        if self.u.ratio(1, 4)? {
            return Ok(None);
        }
        let len = if self.u.ratio(1, 16)? {
            self.u.int_in_range(0..=self.script.stride + 1)?
        } else {
            self.script.stride
        };
        let mut payload = Payload::with_capacity(len);
        for _ in 0..len {
            payload.push(self.u.arbitrary()?);
        }
        Ok(Some(payload))
    }

    /// Generates a field offset, usually one that fits a `ty` field.
    fn gen_offset(&mut self, ty: FieldType) -> Result<usize> {
        let stride = self.script.stride;
        if stride >= ty.size() && !self.u.ratio(1, 8)? {
            self.u.int_in_range(0..=stride - ty.size())
        } else {
            self.u.int_in_range(0..=stride + 1)
        }
    }

    /// Generates a position, usually an in-range one.
    fn gen_position(&mut self) -> Result<usize> {
        let bound = self.inserted.max(1);
        if self.u.ratio(1, 8)? {
            self.u.int_in_range(0..=bound + 1)
        } else {
            self.u.int_in_range(0..=bound - 1)
        }
    }

    fn gen_create(&mut self) -> Op {
        if let Ok(id) = self.registry.create() {
            self.issued.push(id);
        }
        Op::Create
    }

    fn gen_op(&mut self) -> Result<Op> {
        Ok(match self.u.int_in_range(0..=15)? {
            0..=2 => self.gen_create(),
            3 => {
                let id = self.gen_id()?;
                self.registry.recycle(id).ok();
                Op::Recycle(id)
            }
            4..=7 => {
                self.inserted += 1;
                Op::Insert(self.gen_id()?, self.gen_payload()?)
            }
            8..=9 => {
                self.inserted = self.inserted.saturating_sub(1);
                Op::Remove(self.gen_id()?)
            }
            10 => Op::Swap(self.gen_position()?, self.gen_position()?),
            11 => {
                if self.u.ratio(1, 4)? {
                    self.inserted = 0;
                    Op::Clear
                } else {
                    self.gen_create()
                }
            }
            12..=13 => {
                let value: FieldValue = self.u.arbitrary()?;
                let offset = self.gen_offset(value.ty())?;
                Op::SetField(self.gen_id()?, offset, value)
            }
            _ => {
                let ty: FieldType = self.u.arbitrary()?;
                let offset = self.gen_offset(ty)?;
                Op::GetField(self.gen_id()?, offset, ty)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::Options;
    use crate::debug_utils::Simulator;

    #[test]
    fn generated_scripts_replay_cleanly() {
        let mut state = 0x2545_f491_4f6c_dd1d_u64;
        let mut bytes = vec![0u8; 4096];
        let mut recycles = 0;
        for _ in 0..32 {
            for byte in &mut bytes {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                *byte = state as u8;
            }
            let script = Script::arbitrary(&mut Unstructured::new(&bytes)).unwrap();
            recycles += script
                .ops
                .iter()
                .filter(|op| matches!(op, Op::Recycle(_)))
                .count();
            Simulator::run(&Options::default(), &script).unwrap();
        }
        assert!(recycles > 0);
    }
}
