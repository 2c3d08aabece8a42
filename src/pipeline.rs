//! End-to-end compression pipeline.
//!
//! Wires the phases together: frequency aggregation, tree and codebook
//! construction, parallel encoding, bit packing. Each phase is timed and the
//! durations are handed back to the caller; nothing is persisted here beyond
//! the log lines.

use std::path::Path;
use std::time::{Duration, Instant};

use log::info;

use crate::bits;
use crate::code::{build_codebook, Codebook};
use crate::decode::decode;
use crate::encode::{concat, encode};
use crate::error::{Error, Result};
use crate::freq::{count_frequencies, FreqTable, MergeStrategy};
use crate::tree::{build_tree, Node};

/// Which scheduling backend runs the fork-join phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Scoped OS threads, one per partition.
    #[default]
    Threads,
    /// The rayon task pool.
    Rayon,
}

/// Worker configuration for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuffmanConfig {
    /// Mapper workers for frequency aggregation. Must be at least 1.
    pub n_mappers: usize,
    /// Reducer workers; 0 selects the direct-fold merge strategy.
    pub n_reducers: usize,
    /// Encoder workers. Must be at least 1.
    pub n_encoders: usize,
    /// Scheduling backend.
    pub mode: ExecutionMode,
}

impl Default for HuffmanConfig {
    fn default() -> Self {
        HuffmanConfig {
            n_mappers: 4,
            n_reducers: 0,
            n_encoders: 4,
            mode: ExecutionMode::Threads,
        }
    }
}

impl HuffmanConfig {
    fn validate(&self) -> Result<()> {
        if self.n_mappers == 0 {
            return Err(Error::Config("mapper count must be at least 1".into()));
        }
        if self.n_encoders == 0 {
            return Err(Error::Config("encoder count must be at least 1".into()));
        }
        Ok(())
    }

    fn merge_strategy(&self) -> MergeStrategy {
        if self.n_reducers == 0 {
            MergeStrategy::Fold
        } else {
            MergeStrategy::PartitionedReduce {
                n_reducers: self.n_reducers,
            }
        }
    }
}

/// Elapsed wall time per pipeline phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseTimings {
    pub aggregation: Duration,
    pub tree_codebook: Duration,
    pub encoding: Duration,
}

/// Everything a run produces: the packed artifact plus the structures needed
/// to verify or inspect it.
#[derive(Debug)]
pub struct Compressed {
    /// Header byte plus packed payload, the on-disk artifact of `bits`.
    pub packed: Vec<u8>,
    pub tree: Node,
    pub codebook: Codebook,
    pub freqs: FreqTable,
}

/// Run the full pipeline over an in-memory byte sequence.
///
/// Empty input is rejected up front; a failure in any phase aborts the run
/// with no partial result.
pub fn compress(input: &[u8], config: &HuffmanConfig) -> Result<(Compressed, PhaseTimings)> {
    config.validate()?;
    if input.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut timings = PhaseTimings::default();

    let start = Instant::now();
    let freqs = count_frequencies(input, config.n_mappers, config.merge_strategy(), config.mode)?;
    timings.aggregation = start.elapsed();
    info!(
        "aggregation: {} distinct symbols in {:?}",
        freqs.len(),
        timings.aggregation
    );

    let start = Instant::now();
    let tree = build_tree(&freqs)?;
    let codebook = build_codebook(&tree);
    timings.tree_codebook = start.elapsed();
    info!("tree + codebook built in {:?}", timings.tree_codebook);

    let start = Instant::now();
    let stream = encode(input, &codebook, config.n_encoders, config.mode)?;
    let packed = bits::pack(&concat(&stream));
    timings.encoding = start.elapsed();
    info!(
        "encoding: {} payload bytes from {} input bytes in {:?}",
        packed.len() - 1,
        input.len(),
        timings.encoding
    );

    Ok((
        Compressed {
            packed,
            tree,
            codebook,
            freqs,
        },
        timings,
    ))
}

/// Compress the first line of `input_path` and write the packed artifact to
/// `output_path`.
pub fn compress_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &HuffmanConfig,
) -> Result<(Compressed, PhaseTimings)> {
    let input = bits::read_input(input_path)?;
    let (compressed, timings) = compress(&input, config)?;
    std::fs::write(output_path, &compressed.packed)?;
    Ok((compressed, timings))
}

/// Decode a packed artifact against the tree and compare with the original
/// sequence.
pub fn verify(packed: &[u8], tree: &Node, original: &[u8]) -> Result<bool> {
    let bitstream = bits::unpack(packed)?;
    let decoded = decode(&bitstream, tree)?;
    Ok(decoded == original)
}
