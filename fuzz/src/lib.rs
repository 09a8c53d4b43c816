use std::fmt;

use arbitrary::{Arbitrary, Result, Unstructured};
use slotset::debug_utils::Script;
use slotset::{MAX_INDEX, Options, PAGE_SIZE};

/// Common implementation of a test case used by all fuzz targets.
pub struct TestCase {
    pub options: Options,
    pub script: Script,
}

impl Arbitrary<'_> for TestCase {
    fn arbitrary(u: &mut Unstructured) -> Result<Self> {
        // Ensure the logger is initialized.
        let _ = pretty_env_logger::try_init();

        let max_index = if u.arbitrary()? {
            MAX_INDEX
        } else {
            u.int_in_range(0..=2 * PAGE_SIZE as u32)?
        };
        let options = Options {
            initial_capacity: u.int_in_range(1..=8)?,
            directory_capacity: u.int_in_range(1..=4)?,
            max_index,
        };
        let script = u.arbitrary()?;
        log::trace!("Using options {options:?}:\n{script}");
        Ok(TestCase { options, script })
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:?}", self.options)?;
        writeln!(f, "{}", self.script)
    }
}
