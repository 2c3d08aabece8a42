//! Packed bitstream format and file helpers.
//!
//! The on-disk artifact is one header byte holding the count of padding bits
//! (0-7) in the final payload byte, followed by the payload, each byte
//! packing 8 encoded bits least-significant-bit first. `Lsb0` bit vectors
//! share that layout, so packing is a byte-view of the vector plus the
//! header.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use bitvec::prelude::*;
use log::debug;

use crate::error::{Error, Result};

/// Pack a bit sequence into the header-plus-payload byte form.
pub fn pack(bits: &BitSlice<u8, Lsb0>) -> Vec<u8> {
    let padding = ((8 - bits.len() % 8) % 8) as u8;

    let mut padded = bits.to_bitvec();
    padded.force_align();
    padded.set_uninitialized(false);

    let mut bytes = Vec::with_capacity(1 + padded.len().div_ceil(8));
    bytes.push(padding);
    bytes.extend_from_slice(padded.as_raw_slice());
    bytes
}

/// Unpack a header-plus-payload byte sequence back into its bit sequence.
///
/// Rejects a header above 7, a missing header, and a padding count that
/// cannot fit in the payload.
pub fn unpack(bytes: &[u8]) -> Result<BitVec<u8, Lsb0>> {
    let (&header, payload) = bytes
        .split_first()
        .ok_or(Error::Io(std::io::ErrorKind::UnexpectedEof.into()))?;
    if header > 7 {
        return Err(Error::InvalidHeader(header));
    }
    if payload.is_empty() && header != 0 {
        return Err(Error::InvalidHeader(header));
    }

    let mut bits = BitVec::<u8, Lsb0>::from_slice(payload);
    bits.truncate(payload.len() * 8 - header as usize);
    Ok(bits)
}

/// Read the byte sequence to compress: the entire first line of the file,
/// newline excluded.
pub fn read_input(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut line = Vec::new();
    BufReader::new(file).read_until(b'\n', &mut line)?;
    if line.last() == Some(&b'\n') {
        line.pop();
    }
    Ok(line)
}

/// Write a packed bitstream to `path`.
pub fn write_compressed(path: impl AsRef<Path>, bits: &BitSlice<u8, Lsb0>) -> Result<()> {
    let bytes = pack(bits);
    debug!(
        "writing {} payload bytes ({} bits) to {}",
        bytes.len() - 1,
        bits.len(),
        path.as_ref().display()
    );
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    Ok(())
}

/// Read a packed bitstream back from `path`.
pub fn read_compressed(path: impl AsRef<Path>) -> Result<BitVec<u8, Lsb0>> {
    let bytes = std::fs::read(path)?;
    unpack(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirteen_bits_pack_to_two_bytes_with_header_three() {
        let mut bits = BitVec::<u8, Lsb0>::new();
        for i in 0..13 {
            bits.push(i % 3 == 0);
        }
        let packed = pack(&bits);
        assert_eq!(packed[0], 3);
        assert_eq!(packed.len(), 3); // header + 2 payload bytes

        let unpacked = unpack(&packed).unwrap();
        assert_eq!(unpacked, bits);
    }

    #[test]
    fn multiple_of_eight_needs_no_padding() {
        let bits = bitvec![u8, Lsb0; 1, 0, 1, 1, 0, 0, 1, 0];
        let packed = pack(&bits);
        assert_eq!(packed[0], 0);
        assert_eq!(unpack(&packed).unwrap(), bits);
    }

    #[test]
    fn bit_order_is_lsb_first() {
        // Bits 1,0,0,0,0,0,0,1 must pack to 0b1000_0001.
        let bits = bitvec![u8, Lsb0; 1, 0, 0, 0, 0, 0, 0, 1];
        assert_eq!(pack(&bits), vec![0, 0b1000_0001]);
    }

    #[test]
    fn empty_sequence_round_trips() {
        let bits = BitVec::<u8, Lsb0>::new();
        let packed = pack(&bits);
        assert_eq!(packed, vec![0]);
        assert!(unpack(&packed).unwrap().is_empty());
    }

    #[test]
    fn header_above_seven_rejected() {
        assert!(matches!(unpack(&[8, 0xff]), Err(Error::InvalidHeader(8))));
    }

    #[test]
    fn padding_without_payload_rejected() {
        assert!(matches!(unpack(&[3]), Err(Error::InvalidHeader(3))));
    }

    #[test]
    fn missing_header_rejected() {
        assert!(matches!(unpack(&[]), Err(Error::Io(_))));
    }

    #[test]
    fn input_reading_stops_at_first_line() {
        let dir = std::env::temp_dir();
        let path = dir.join("parhuff-read-input-test.txt");
        std::fs::write(&path, b"first line\nsecond line\n").unwrap();
        assert_eq!(read_input(&path).unwrap(), b"first line");
        std::fs::remove_file(&path).ok();
    }
}
