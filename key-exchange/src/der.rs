//! Minimal DER codec: INTEGER, OBJECT IDENTIFIER and SEQUENCE
//!
//! Only the definite-length, primitive encodings the parameter files need.
//! The reader is strict: non-minimal lengths, negative or padded integers,
//! truncated content and unexpected tags all fail with a format error.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::{KexError, Result};

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_OBJECT_IDENTIFIER: u8 = 0x06;
pub const TAG_SEQUENCE: u8 = 0x30;

fn encode_length(len: usize, out: &mut Vec<u8>) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

/// Tag, length and content in one buffer
pub fn encode_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 6);
    out.push(tag);
    encode_length(content.len(), &mut out);
    out.extend_from_slice(content);
    out
}

/// Non-negative INTEGER, with a leading zero when the top bit is set
pub fn encode_integer(value: &BigUint) -> Vec<u8> {
    let mut content = if value.is_zero() {
        vec![0u8]
    } else {
        value.to_bytes_be()
    };
    if content[0] & 0x80 != 0 {
        content.insert(0, 0);
    }
    encode_tlv(TAG_INTEGER, &content)
}

/// SEQUENCE over already encoded elements
pub fn encode_sequence(elements: &[Vec<u8>]) -> Vec<u8> {
    let content: Vec<u8> = elements.concat();
    encode_tlv(TAG_SEQUENCE, &content)
}

/// OBJECT IDENTIFIER from its arcs (at least two)
pub fn encode_oid(arcs: &[u64]) -> Result<Vec<u8>> {
    if arcs.len() < 2 || arcs[0] > 2 || (arcs[0] < 2 && arcs[1] >= 40) {
        return Err(KexError::DomainFault("invalid object identifier arcs"));
    }

    let mut content = Vec::new();
    let first = arcs[0] * 40 + arcs[1];
    for &arc in std::iter::once(&first).chain(&arcs[2..]) {
        // base-128, high bit marks continuation
        let mut chunk = vec![(arc & 0x7f) as u8];
        let mut rest = arc >> 7;
        while rest > 0 {
            chunk.push(0x80 | (rest & 0x7f) as u8);
            rest >>= 7;
        }
        chunk.reverse();
        content.extend(chunk);
    }

    Ok(encode_tlv(TAG_OBJECT_IDENTIFIER, &content))
}

/// Cursor over a DER byte string
#[derive(Debug, Clone)]
pub struct DerReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DerReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn next_byte(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| KexError::format("truncated DER structure"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_length(&mut self) -> Result<usize> {
        let first = self.next_byte()?;
        if first < 0x80 {
            return Ok(first as usize);
        }

        let count = (first & 0x7f) as usize;
        if count == 0 {
            return Err(KexError::format("indefinite DER length"));
        }
        if count > std::mem::size_of::<usize>() {
            return Err(KexError::format("DER length too large"));
        }

        let mut len = 0usize;
        for i in 0..count {
            let byte = self.next_byte()?;
            if i == 0 && byte == 0 {
                return Err(KexError::format("non-minimal DER length"));
            }
            len = (len << 8) | byte as usize;
        }
        if len < 0x80 {
            return Err(KexError::format("non-minimal DER length"));
        }
        Ok(len)
    }

    /// Reads one element with the given tag and returns its content.
    pub fn read_tlv(&mut self, expected_tag: u8) -> Result<&'a [u8]> {
        let tag = self.next_byte()?;
        if tag != expected_tag {
            return Err(KexError::format(format!(
                "unexpected DER tag 0x{tag:02x} (expected 0x{expected_tag:02x})"
            )));
        }

        let len = self.read_length()?;
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| KexError::format("truncated DER structure"))?;

        let content = &self.data[self.pos..end];
        self.pos = end;
        Ok(content)
    }

    pub fn read_integer(&mut self) -> Result<BigUint> {
        let content = self.read_tlv(TAG_INTEGER)?;
        match content {
            [] => Err(KexError::format("empty DER integer")),
            [first, ..] if first & 0x80 != 0 => Err(KexError::format("negative DER integer")),
            [0, second, ..] if second & 0x80 == 0 => Err(KexError::format("non-minimal DER integer")),
            _ => Ok(BigUint::from_bytes_be(content)),
        }
    }

    pub fn read_sequence(&mut self) -> Result<DerReader<'a>> {
        Ok(DerReader::new(self.read_tlv(TAG_SEQUENCE)?))
    }

    pub fn read_oid(&mut self) -> Result<Vec<u64>> {
        let content = self.read_tlv(TAG_OBJECT_IDENTIFIER)?;
        if content.is_empty() {
            return Err(KexError::format("empty object identifier"));
        }

        let mut values = Vec::new();
        let mut current = 0u64;
        let mut fresh = true;
        for &byte in content {
            if fresh && byte == 0x80 {
                return Err(KexError::format("non-minimal object identifier"));
            }
            if current > (u64::MAX >> 7) {
                return Err(KexError::format("object identifier arc overflow"));
            }
            current = (current << 7) | (byte & 0x7f) as u64;
            fresh = byte & 0x80 == 0;
            if fresh {
                values.push(current);
                current = 0;
            }
        }
        if !fresh {
            return Err(KexError::format("truncated object identifier"));
        }

        let first = values[0];
        let (a0, a1) = match first {
            0..=39 => (0, first),
            40..=79 => (1, first - 40),
            _ => (2, first - 80),
        };
        let mut arcs = vec![a0, a1];
        arcs.extend_from_slice(&values[1..]);
        Ok(arcs)
    }

    /// Fails if unread bytes remain.
    pub fn finish(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(KexError::format("trailing data after DER structure"))
        }
    }
}
