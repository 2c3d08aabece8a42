//! Parallel symbol-frequency aggregation.
//!
//! The input is split into `n_mappers` contiguous partitions; each mapper
//! counts symbol occurrences in its own partition into a private table, so
//! the mapping phase touches no shared state. Two merge strategies produce
//! the global table:
//!
//! - [`MergeStrategy::Fold`]: after the mappers join, a single thread folds
//!   the partial tables together.
//! - [`MergeStrategy::PartitionedReduce`]: each of `n_reducers` reducer
//!   workers owns a bounded channel; mappers route every `(symbol, count)`
//!   pair to reducer `symbol % n_reducers`. A reducer drains its channel
//!   until every sender has been dropped (the channel-close form of a
//!   termination sentinel), then merges its private table into the global
//!   one under a short-lived lock.
//!
//! Both strategies return identical tables for the same input; counts always
//! sum to the input length.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Mutex;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::debug;

use crate::error::{Error, Result};
use crate::pipeline::ExecutionMode;

/// Mapping from byte symbol to occurrence count.
pub type FreqTable = HashMap<u8, u64>;

/// Capacity of each reducer's channel in the partitioned-reduce strategy.
const REDUCER_QUEUE_CAP: usize = 256;

/// How partial frequency tables are merged into the global table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Sequential fold of the mapper-local tables after the join barrier.
    Fold,
    /// Map/reduce with per-reducer queues keyed by `symbol % n_reducers`.
    PartitionedReduce { n_reducers: usize },
}

/// Split `[0, len)` into `n` contiguous near-equal ranges.
///
/// The first `n - 1` ranges have length `len / n`; the last range absorbs the
/// remainder so the ranges tile `[0, len)` exactly. Used by both the
/// frequency aggregator and the parallel encoder.
pub fn partitions(len: usize, n: usize) -> Vec<Range<usize>> {
    debug_assert!(n > 0);
    let chunk = len / n;
    (0..n)
        .map(|i| {
            let start = i * chunk;
            let end = if i == n - 1 { len } else { start + chunk };
            start..end
        })
        .collect()
}

/// Count frequencies over a slice into a fresh table. Single-threaded; also
/// the per-partition kernel every mapper runs.
pub fn count_frequencies_seq(input: &[u8]) -> FreqTable {
    let mut freqs = FreqTable::new();
    for &byte in input {
        *freqs.entry(byte).or_insert(0) += 1;
    }
    freqs
}

/// Compute the global frequency table for `input` using `n_mappers` parallel
/// mappers and the given merge strategy.
///
/// `n_mappers == 0`, or a `PartitionedReduce` with zero reducers, is a
/// configuration error rejected before any worker starts. Thread spawn
/// failure aborts the whole aggregation with [`Error::Io`]; no partial table
/// is returned.
pub fn count_frequencies(
    input: &[u8],
    n_mappers: usize,
    strategy: MergeStrategy,
    mode: ExecutionMode,
) -> Result<FreqTable> {
    if n_mappers == 0 {
        return Err(Error::Config("mapper count must be at least 1".into()));
    }
    if let MergeStrategy::PartitionedReduce { n_reducers: 0 } = strategy {
        return Err(Error::Config(
            "partitioned reduce needs at least 1 reducer".into(),
        ));
    }

    match strategy {
        MergeStrategy::Fold => match mode {
            ExecutionMode::Threads => fold_threads(input, n_mappers),
            ExecutionMode::Rayon => Ok(fold_rayon(input, n_mappers)),
        },
        // The reduce stage is built on dedicated threads and blocking
        // channels in both modes; only the fork-join phases differ per
        // backend.
        MergeStrategy::PartitionedReduce { n_reducers } => {
            partitioned_reduce(input, n_mappers, n_reducers)
        }
    }
}

/// Fold strategy on scoped threads: one mapper thread per partition, then a
/// sequential merge of the partials.
fn fold_threads(input: &[u8], n_mappers: usize) -> Result<FreqTable> {
    let ranges = partitions(input.len(), n_mappers);

    let partials: Vec<FreqTable> = thread::scope(|s| -> Result<Vec<FreqTable>> {
        let mut handles = Vec::with_capacity(n_mappers);
        for range in ranges {
            let slice = &input[range];
            let handle = thread::Builder::new()
                .name("huff-mapper".into())
                .spawn_scoped(s, move || count_frequencies_seq(slice))?;
            handles.push(handle);
        }
        let mut partials = Vec::with_capacity(n_mappers);
        for handle in handles {
            match handle.join() {
                Ok(partial) => partials.push(partial),
                Err(_) => return Err(Error::Worker("mapper panicked".into())),
            }
        }
        Ok(partials)
    })?;

    Ok(fold_partials(partials))
}

/// Fold strategy on the rayon pool: partitions mapped in parallel, partials
/// folded on the calling thread.
fn fold_rayon(input: &[u8], n_mappers: usize) -> FreqTable {
    use rayon::prelude::*;

    let partials: Vec<FreqTable> = partitions(input.len(), n_mappers)
        .into_par_iter()
        .map(|range| count_frequencies_seq(&input[range]))
        .collect();

    fold_partials(partials)
}

fn fold_partials(partials: Vec<FreqTable>) -> FreqTable {
    let mut result = FreqTable::new();
    for partial in partials {
        for (symbol, count) in partial {
            *result.entry(symbol).or_insert(0) += count;
        }
    }
    result
}

/// Partitioned-reduce strategy: mappers route counted pairs to reducers
/// through bounded channels; reducers accumulate privately and merge into
/// the shared table only after their channel closes.
fn partitioned_reduce(input: &[u8], n_mappers: usize, n_reducers: usize) -> Result<FreqTable> {
    let ranges = partitions(input.len(), n_mappers);
    let result = Mutex::new(FreqTable::new());

    let channels: Vec<(Sender<(u8, u64)>, Receiver<(u8, u64)>)> =
        (0..n_reducers).map(|_| bounded(REDUCER_QUEUE_CAP)).collect();
    let (senders, receivers): (Vec<_>, Vec<_>) = channels.into_iter().unzip();

    thread::scope(|s| -> Result<()> {
        let result = &result;
        for rx in receivers {
            thread::Builder::new()
                .name("huff-reducer".into())
                .spawn_scoped(s, move || reduce_loop(rx, result))?;
        }

        let mut mappers = Vec::with_capacity(n_mappers);
        for range in ranges {
            let slice = &input[range];
            let txs = senders.clone();
            let handle = thread::Builder::new()
                .name("huff-mapper".into())
                .spawn_scoped(s, move || map_and_route(slice, &txs))?;
            mappers.push(handle);
        }
        // Each mapper owns a clone of every sender; dropping the originals
        // here means the reducers see disconnection exactly when the last
        // mapper has joined, after all its pairs are enqueued.
        drop(senders);

        for handle in mappers {
            if handle.join().is_err() {
                return Err(Error::Worker("mapper panicked".into()));
            }
        }
        Ok(())
    })?;

    debug!("partitioned reduce complete: {n_mappers} mappers, {n_reducers} reducers");
    result
        .into_inner()
        .map_err(|_| Error::Worker("reducer panicked".into()))
}

fn map_and_route(slice: &[u8], txs: &[Sender<(u8, u64)>]) {
    let local = count_frequencies_seq(slice);
    for (symbol, count) in local {
        let reducer = symbol as usize % txs.len();
        // Can only fail if the reducer died, which propagates as a panic out
        // of the enclosing scope anyway.
        txs[reducer]
            .send((symbol, count))
            .expect("reducer disconnected before mappers finished");
    }
}

fn reduce_loop(rx: Receiver<(u8, u64)>, result: &Mutex<FreqTable>) {
    let mut private = FreqTable::new();
    // recv fails only once every sender is dropped, so every enqueued pair
    // is drained before the loop exits.
    while let Ok((symbol, count)) = rx.recv() {
        *private.entry(symbol).or_insert(0) += count;
    }

    let mut global = result.lock().expect("frequency merge lock poisoned");
    for (symbol, count) in private {
        *global.entry(symbol).or_insert(0) += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_tile_exactly() {
        for &(len, n) in &[(0usize, 1usize), (1, 1), (5, 2), (6, 3), (7, 3), (100, 7), (3, 8)] {
            let ranges = partitions(len, n);
            assert_eq!(ranges.len(), n);
            let mut next = 0;
            for range in &ranges {
                assert_eq!(range.start, next, "gap or overlap at {range:?}");
                next = range.end;
            }
            assert_eq!(next, len);
            // Only the last range may differ in length from the others.
            let chunk = len / n;
            for range in &ranges[..n - 1] {
                assert_eq!(range.len(), chunk);
            }
        }
    }

    #[test]
    fn counts_sum_to_input_length() {
        let input = b"the quick brown fox jumps over the lazy dog";
        for strategy in [MergeStrategy::Fold, MergeStrategy::PartitionedReduce { n_reducers: 3 }] {
            let freqs =
                count_frequencies(input, 4, strategy, ExecutionMode::Threads).unwrap();
            let total: u64 = freqs.values().sum();
            assert_eq!(total, input.len() as u64);
        }
    }

    #[test]
    fn scenario_aaabbc() {
        let freqs =
            count_frequencies(b"aaabbc", 2, MergeStrategy::Fold, ExecutionMode::Threads).unwrap();
        assert_eq!(freqs, FreqTable::from([(b'a', 3), (b'b', 2), (b'c', 1)]));
    }

    #[test]
    fn strategies_agree() {
        let input: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let fold =
            count_frequencies(&input, 8, MergeStrategy::Fold, ExecutionMode::Threads).unwrap();
        let reduced = count_frequencies(
            &input,
            8,
            MergeStrategy::PartitionedReduce { n_reducers: 4 },
            ExecutionMode::Threads,
        )
        .unwrap();
        assert_eq!(fold, reduced);
    }

    #[test]
    fn backends_agree() {
        let input = b"parallel frequency aggregation should not depend on the backend";
        let threads =
            count_frequencies(input, 3, MergeStrategy::Fold, ExecutionMode::Threads).unwrap();
        let pool = count_frequencies(input, 3, MergeStrategy::Fold, ExecutionMode::Rayon).unwrap();
        assert_eq!(threads, pool);
    }

    #[test]
    fn more_mappers_than_bytes() {
        let freqs =
            count_frequencies(b"ab", 16, MergeStrategy::Fold, ExecutionMode::Threads).unwrap();
        assert_eq!(freqs, FreqTable::from([(b'a', 1), (b'b', 1)]));
    }

    #[test]
    fn zero_mappers_rejected() {
        let result = count_frequencies(b"abc", 0, MergeStrategy::Fold, ExecutionMode::Threads);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn zero_reducers_rejected() {
        let result = count_frequencies(
            b"abc",
            2,
            MergeStrategy::PartitionedReduce { n_reducers: 0 },
            ExecutionMode::Threads,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
