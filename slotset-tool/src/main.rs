use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use arbitrary::Unstructured;
use clap::Parser;
use rand::RngCore;
use slotset::Options;
use slotset::debug_utils::{self, ArbitraryScriptConfig, Script, Simulator};

#[derive(Parser)]
/// Tool for testing slotset.
enum Args {
    /// Replay a script against a registry and a sparse set, checking every
    /// result against a reference model.
    Run {
        /// Print the final state of the registry and the sparse set.
        #[clap(short = 'v')]
        verbose: bool,

        /// File containing the script to replay.
        script: PathBuf,

        /// Container options.
        #[clap(flatten)]
        options: Options,
    },

    /// Generate a random script.
    Gen {
        /// Maximum payload stride in bytes.
        #[clap(long, default_value_t = 16)]
        stride: usize,

        /// Maximum number of operations.
        #[clap(long, default_value_t = 100)]
        ops: usize,

        /// Largest index used for identifiers not handed out by the registry.
        #[clap(long, default_value_t = 64)]
        max_foreign_index: u32,
    },

    /// Parses the given script and re-dumps it with proper formatting.
    ///
    /// Note that this will strip all comments.
    Fmt {
        /// File containing the script.
        script: PathBuf,
    },
}

fn load_script(path: &Path) -> Result<Script> {
    let script = fs::read(path).context("could not read script input file")?;
    let script = String::from_utf8(script).context("script input is not UTF-8")?;
    Script::parse(&script).context("could not parse script input file")
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = Args::parse();

    match args {
        Args::Run {
            verbose,
            ref script,
            ref options,
        } => {
            let script = load_script(script)?;
            let mut sim = Simulator::new(options, script.stride)?;
            for (i, op) in script.ops.iter().enumerate() {
                sim.apply(op)
                    .and_then(|()| sim.check())
                    .with_context(|| format!("operation {i} ({op}) failed"))?;
            }

            if verbose {
                println!(
                    "================ Registry ================\n{}",
                    debug_utils::DisplayRegistry(sim.registry())
                );
                println!(
                    "================ Sparse set ================\n{}",
                    debug_utils::DisplaySparseSet(sim.set())
                );
            }

            println!("{}", sim.stats());
        }
        Args::Gen {
            stride,
            ops,
            max_foreign_index,
        } => {
            let config = ArbitraryScriptConfig {
                stride: 0..=stride,
                num_ops: 0..=ops,
                max_foreign_index,
            };
            let mut bytes = [0; 4096];
            rand::rng().fill_bytes(&mut bytes);
            let script = Script::arbitrary_with_config(&mut Unstructured::new(&bytes), config)
                .context("failed to generate arbitrary script")?;

            print!("{script}");
        }
        Args::Fmt { ref script } => {
            let script = load_script(script)?;

            print!("{script}");
        }
    }
    Ok(())
}
