//! Parallel Huffman compression.
//!
//! Builds a Huffman codebook for a byte sequence and encodes the sequence
//! with it, parallelizing the two expensive phases: symbol-frequency
//! aggregation (direct fold or partitioned map/reduce) and per-byte encoding
//! (disjoint partitions reassembled in partition order). Scoped OS threads
//! and the rayon pool are interchangeable scheduling backends.

pub mod bits;
pub mod code;
pub mod decode;
pub mod encode;
pub mod error;
pub mod freq;
pub mod pipeline;
pub mod tree;

pub use code::{build_codebook, Code, Codebook};
pub use decode::decode;
pub use encode::{concat, encode, EncodedStream};
pub use error::{Error, Result};
pub use freq::{count_frequencies, partitions, FreqTable, MergeStrategy};
pub use pipeline::{
    compress, compress_file, verify, Compressed, ExecutionMode, HuffmanConfig, PhaseTimings,
};
pub use tree::{build_tree, Node};
