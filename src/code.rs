//! Codebook generation: one prefix-free bit sequence per leaf symbol.

use std::collections::{HashMap, VecDeque};

use bitvec::prelude::*;

use crate::tree::Node;

/// A single symbol's codeword, root-to-leaf path bits (`false` = left).
pub type Code = BitVec<u8, Lsb0>;

/// Mapping from byte symbol to its codeword.
pub type Codebook = HashMap<u8, Code>;

/// Derive the codebook from a Huffman tree.
///
/// Breadth-first walk with an explicit work list, so maximally skewed trees
/// (path length up to 255) cannot overflow the stack. If a symbol appears at
/// more than one leaf (only the synthesized single-symbol tree does this),
/// the first path visited wins, which BFS makes the shortest and leftmost.
pub fn build_codebook(root: &Node) -> Codebook {
    let mut codes = Codebook::new();
    let mut queue: VecDeque<(&Node, Code)> = VecDeque::new();
    queue.push_back((root, Code::new()));

    while let Some((node, path)) = queue.pop_front() {
        match node {
            Node::Leaf { symbol, .. } => {
                codes.entry(*symbol).or_insert(path);
            }
            Node::Internal { left, right, .. } => {
                let mut left_path = path.clone();
                left_path.push(false);
                queue.push_back((left, left_path));

                let mut right_path = path;
                right_path.push(true);
                queue.push_back((right, right_path));
            }
        }
    }

    codes
}
