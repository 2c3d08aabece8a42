//! Round-trip decoding against the Huffman tree.
//!
//! Used as the correctness oracle for the pipeline: decoding the packed
//! bitstream must reproduce the original input exactly.

use bitvec::prelude::*;

use crate::error::{Error, Result};
use crate::tree::Node;

/// Decode a flat bit sequence by walking the tree from the root: `false`
/// descends left, `true` descends right; reaching a leaf emits its symbol
/// and resets the walk to the root.
///
/// A sequence that ends mid-path (the walk is not back at the root) is a
/// consistency error, not an input error: it means the bitstream and tree
/// disagree.
pub fn decode(bits: &BitSlice<u8, Lsb0>, root: &Node) -> Result<Vec<u8>> {
    let mut decoded = Vec::new();
    let mut node = root;

    for bit in bits {
        node = match node {
            Node::Internal { left, right, .. } => {
                if *bit {
                    right
                } else {
                    left
                }
            }
            // The builder never produces a leaf root, so the walk always
            // starts on an internal node.
            Node::Leaf { .. } => return Err(Error::TruncatedBitstream),
        };

        if let Node::Leaf { symbol, .. } = node {
            decoded.push(*symbol);
            node = root;
        }
    }

    if !std::ptr::eq(node, root) {
        return Err(Error::TruncatedBitstream);
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::build_codebook;
    use crate::encode::{concat, encode};
    use crate::freq::count_frequencies_seq;
    use crate::pipeline::ExecutionMode;
    use crate::tree::build_tree;

    fn round_trip(input: &[u8], n_encoders: usize) -> Vec<u8> {
        let tree = build_tree(&count_frequencies_seq(input)).unwrap();
        let codebook = build_codebook(&tree);
        let stream = encode(input, &codebook, n_encoders, ExecutionMode::Threads).unwrap();
        decode(&concat(&stream), &tree).unwrap()
    }

    #[test]
    fn round_trip_reproduces_input() {
        let input = b"huffman coding in rust is fun!";
        assert_eq!(round_trip(input, 4), input);
    }

    #[test]
    fn round_trip_single_symbol() {
        let input = b"zzzz";
        assert_eq!(round_trip(input, 2), input);
    }

    #[test]
    fn round_trip_two_symbols() {
        let input = b"abababab";
        assert_eq!(round_trip(input, 3), input);
    }

    #[test]
    fn bitstream_ending_mid_path_is_an_error() {
        let input = b"entropy";
        let tree = build_tree(&count_frequencies_seq(input)).unwrap();
        let codebook = build_codebook(&tree);
        let stream = encode(input, &codebook, 1, ExecutionMode::Threads).unwrap();
        let mut bits = concat(&stream);
        // Dropping the final bit of the last codeword strands the walk.
        bits.pop();
        assert!(matches!(
            decode(&bits, &tree),
            Err(Error::TruncatedBitstream)
        ));
    }

    #[test]
    fn empty_bitstream_decodes_to_nothing() {
        let tree = build_tree(&count_frequencies_seq(b"ab")).unwrap();
        let bits = BitVec::<u8, Lsb0>::new();
        assert_eq!(decode(&bits, &tree).unwrap(), Vec::<u8>::new());
    }
}
