//! Partition-ordered parallel encoding.
//!
//! The input is split the same way as in the frequency aggregator; each
//! encoder worker maps the bytes of its own partition through the codebook
//! into a private bit buffer. Workers never synchronize with each other:
//! partitions are disjoint, and results are collected by partition index,
//! not by completion order, so the concatenation of partitions `0..n`
//! always reproduces the bit sequence of the input in original byte order.

use std::thread;

use bitvec::prelude::*;

use crate::code::Codebook;
use crate::error::{Error, Result};
use crate::freq::partitions;
use crate::pipeline::ExecutionMode;

/// Encoded output, one bit buffer per partition, indexed by partition id.
pub type EncodedStream = Vec<BitVec<u8, Lsb0>>;

/// Encode `input` with `n_encoders` parallel workers.
///
/// A byte without a codebook entry is an internal-consistency error
/// ([`Error::MissingCode`]); the whole call fails and no partial stream is
/// returned. `n_encoders == 0` is a configuration error.
pub fn encode(
    input: &[u8],
    codebook: &Codebook,
    n_encoders: usize,
    mode: ExecutionMode,
) -> Result<EncodedStream> {
    if n_encoders == 0 {
        return Err(Error::Config("encoder count must be at least 1".into()));
    }

    match mode {
        ExecutionMode::Threads => encode_threads(input, codebook, n_encoders),
        ExecutionMode::Rayon => encode_rayon(input, codebook, n_encoders),
    }
}

/// Encode one partition in byte order. The sizing pass keeps the buffer from
/// reallocating mid-append.
fn encode_partition(slice: &[u8], codebook: &Codebook) -> Result<BitVec<u8, Lsb0>> {
    let mut bits_needed = 0usize;
    for &byte in slice {
        let code = codebook.get(&byte).ok_or(Error::MissingCode(byte))?;
        bits_needed += code.len();
    }

    let mut out = BitVec::with_capacity(bits_needed);
    for &byte in slice {
        // Checked above; partitions are read-only between the passes.
        let code = codebook.get(&byte).ok_or(Error::MissingCode(byte))?;
        out.extend_from_bitslice(code);
    }
    Ok(out)
}

fn encode_threads(input: &[u8], codebook: &Codebook, n_encoders: usize) -> Result<EncodedStream> {
    let ranges = partitions(input.len(), n_encoders);

    thread::scope(|s| -> Result<EncodedStream> {
        let mut handles = Vec::with_capacity(n_encoders);
        for range in ranges {
            let slice = &input[range];
            let handle = thread::Builder::new()
                .name("huff-encoder".into())
                .spawn_scoped(s, move || encode_partition(slice, codebook))?;
            handles.push(handle);
        }

        // Joining in spawn order collects partitions by index, so worker
        // completion order cannot leak into the stream.
        let mut stream = Vec::with_capacity(n_encoders);
        for handle in handles {
            match handle.join() {
                Ok(partition) => stream.push(partition?),
                Err(_) => return Err(Error::Worker("encoder panicked".into())),
            }
        }
        Ok(stream)
    })
}

fn encode_rayon(input: &[u8], codebook: &Codebook, n_encoders: usize) -> Result<EncodedStream> {
    use rayon::prelude::*;

    // An indexed parallel collect preserves partition order by construction.
    partitions(input.len(), n_encoders)
        .into_par_iter()
        .map(|range| encode_partition(&input[range], codebook))
        .collect()
}

/// Flatten a stream into a single bit sequence, partitions in index order.
pub fn concat(stream: &EncodedStream) -> BitVec<u8, Lsb0> {
    let total: usize = stream.iter().map(|p| p.len()).sum();
    let mut flat = BitVec::with_capacity(total);
    for partition in stream {
        flat.extend_from_bitslice(partition);
    }
    flat
}
