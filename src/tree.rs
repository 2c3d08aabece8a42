//! Huffman tree construction.
//!
//! The tree is an owned recursive structure: each internal node holds its two
//! children in `Box`es, so the whole tree is reclaimed when the root is
//! dropped. Construction uses a min-priority queue keyed by `(frequency,
//! insertion sequence)`; the insertion-sequence tiebreak makes tree shape
//! deterministic for equal-frequency nodes, so repeated runs on the same
//! input always produce the same codebook.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{Error, Result};
use crate::freq::FreqTable;

/// A node in the Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A leaf holds a byte symbol and its frequency.
    Leaf { symbol: u8, freq: u64 },
    /// An internal node holds the summed frequency of its two children.
    Internal {
        freq: u64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    /// Returns the frequency of the node.
    pub fn freq(&self) -> u64 {
        match self {
            Node::Leaf { freq, .. } => *freq,
            Node::Internal { freq, .. } => *freq,
        }
    }

    /// Number of leaves below (and including) this node.
    pub fn leaf_count(&self) -> usize {
        // Iterative walk: skewed trees can be up to 255 levels deep.
        let mut stack = vec![self];
        let mut count = 0;
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf { .. } => count += 1,
                Node::Internal { left, right, .. } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
        count
    }
}

/// Min-heap entry: `BinaryHeap` is a max-heap, so ordering is reversed.
/// `seq` is the monotonically increasing insertion order, used as the
/// secondary key when frequencies tie.
#[derive(Debug, Eq, PartialEq)]
struct HeapEntry {
    freq: u64,
    seq: u64,
    node: Node,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.freq, other.seq).cmp(&(self.freq, self.seq))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Build the Huffman tree for a frequency table.
///
/// Leaves are seeded into the queue in ascending symbol order so the
/// insertion-sequence tiebreak is reproducible across runs and across
/// `HashMap` iteration orders. Returns [`Error::EmptyInput`] for an empty
/// table. A table with a single distinct symbol yields a synthesized
/// internal root whose left child is the lone leaf, so the symbol still
/// receives a one-bit code.
pub fn build_tree(freqs: &FreqTable) -> Result<Node> {
    if freqs.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut symbols: Vec<u8> = freqs.keys().copied().collect();
    symbols.sort_unstable();

    let mut seq = 0u64;
    let mut heap = BinaryHeap::with_capacity(symbols.len());
    for symbol in symbols {
        heap.push(HeapEntry {
            freq: freqs[&symbol],
            seq,
            node: Node::Leaf {
                symbol,
                freq: freqs[&symbol],
            },
        });
        seq += 1;
    }

    if heap.len() == 1 {
        // A lone leaf cannot carry a code; give it a parent so its path is
        // one bit long. The right child mirrors the symbol with zero
        // frequency, and the codebook generator keeps the leftmost (first
        // visited) path for a symbol, so the code is always `0`.
        let leaf = heap.pop().unwrap().node;
        let (symbol, freq) = match leaf {
            Node::Leaf { symbol, freq } => (symbol, freq),
            Node::Internal { .. } => unreachable!("seeded entries are leaves"),
        };
        return Ok(Node::Internal {
            freq,
            left: Box::new(Node::Leaf { symbol, freq }),
            right: Box::new(Node::Leaf { symbol, freq: 0 }),
        });
    }

    while heap.len() > 1 {
        let first = heap.pop().unwrap();
        let second = heap.pop().unwrap();
        let combined = first.node.freq() + second.node.freq();
        heap.push(HeapEntry {
            freq: combined,
            seq,
            node: Node::Internal {
                freq: combined,
                left: Box::new(first.node),
                right: Box::new(second.node),
            },
        });
        seq += 1;
    }

    Ok(heap.pop().unwrap().node)
}
