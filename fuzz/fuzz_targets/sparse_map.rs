//! Checks that a `SparseMap` keeps its values attached to the right keys
//! through arbitrary inserts, removals and swaps.

#![no_main]

use std::collections::HashMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use slotset::{Id, SparseMap};

#[derive(Arbitrary, Debug)]
enum MapOp {
    Insert(u8, u8, u32),
    Remove(u8, u8),
    Swap(u8, u8),
    Clear,
}

fuzz_target!(|ops: Vec<MapOp>| {
    // Ensure the logger is initialized.
    let _ = pretty_env_logger::try_init();

    let mut map = SparseMap::new();
    let mut model: HashMap<u32, (Id, u32)> = HashMap::new();
    for op in ops {
        match op {
            MapOp::Insert(index, generation, value) => {
                let id = Id::new(index.into(), generation.into());
                let old = map.insert(id, value).unwrap();
                let expected = model.insert(id.index(), (id, value)).map(|(_, v)| v);
                assert_eq!(old, expected);
            }
            MapOp::Remove(index, generation) => {
                let id = Id::new(index.into(), generation.into());
                let expected = match model.get(&id.index()) {
                    Some(&(key, value)) if key == id => {
                        model.remove(&id.index());
                        Some(value)
                    }
                    _ => None,
                };
                assert_eq!(map.remove(id), expected);
            }
            MapOp::Swap(a, b) => {
                let (a, b) = (usize::from(a), usize::from(b));
                let in_bounds = a < map.len() && b < map.len();
                assert_eq!(map.swap_at(a, b).is_ok(), in_bounds);
            }
            MapOp::Clear => {
                map.clear();
                model.clear();
            }
        }
        assert_eq!(map.len(), model.len());
        for (id, &value) in map.iter() {
            assert_eq!(model.get(&id.index()), Some(&(id, value)));
            assert_eq!(map.get(id), Some(&value));
        }
    }
});
