//! # Acknowledgment Range Compression
//!
//! ACK and NACK datagrams carry a set of 24-bit sequence numbers compressed
//! into records. Contiguous runs collapse into one RANGE record.
//!
//! ## Wire Format
//! ```text
//! [record_count(2)] [record]*
//! SINGLE: [0x01] [seq(3, LE)]
//! RANGE:  [0x00] [start(3, LE)] [end(3, LE)]   end is inclusive
//! ```
//!
//! ## Security
//! Expansion is bounded: a single range never yields more than
//! `max_range_span + 1` entries and a whole payload never more than
//! `max_entries`, whatever the peer claims.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::serializer::{ByteOrder, PacketSerializer};
use crate::error::{ProtocolError, Result};

/// Record tag for an inclusive `[start, end]` run
pub const RECORD_TYPE_RANGE: u8 = 0x00;

/// Record tag for a lone sequence number
pub const RECORD_TYPE_SINGLE: u8 = 0x01;

/// Largest span expanded from one range record
pub const MAX_RANGE_SPAN: u32 = 512;

/// Largest number of sequence numbers extracted from one payload
pub const MAX_ACK_ENTRIES: usize = 4096;

/// Sequence numbers are 24-bit
pub const MAX_SEQUENCE_NUMBER: u32 = 0x00FF_FFFF;

/// Caps applied while expanding records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckLimits {
    pub max_range_span: u32,
    pub max_entries: usize,
}

impl Default for AckLimits {
    fn default() -> Self {
        Self {
            max_range_span: MAX_RANGE_SPAN,
            max_entries: MAX_ACK_ENTRIES,
        }
    }
}

/// How record tags are interpreted on decode.
///
/// The encoder always writes the `Standard` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckDecodeMode {
    /// RANGE reads two triads, SINGLE reads one
    #[default]
    Standard,
    /// SINGLE reads two triads as an inclusive range, any other tag reads one.
    /// Matches the read shape of some older peers.
    LegacyTwoTriadSingle,
}

/// One compressed unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckRecord {
    Single(u32),
    Range { start: u32, end: u32 },
}

impl AckRecord {
    pub fn encoded_len(&self) -> usize {
        match self {
            AckRecord::Single(_) => 4,
            AckRecord::Range { .. } => 7,
        }
    }

    fn write(&self, out: &mut PacketSerializer) {
        match *self {
            AckRecord::Single(seq) => {
                out.write_u8(RECORD_TYPE_SINGLE);
                out.write_triad(seq, ByteOrder::LittleEndian);
            }
            AckRecord::Range { start, end } => {
                out.write_u8(RECORD_TYPE_RANGE);
                out.write_triad(start, ByteOrder::LittleEndian);
                out.write_triad(end, ByteOrder::LittleEndian);
            }
        }
    }
}

/// Collapse sequence numbers into records, in ascending order.
///
/// Duplicates are folded into the run they belong to.
pub fn to_records(sequence_numbers: &[u32]) -> Vec<AckRecord> {
    let mut sorted = sequence_numbers.to_vec();
    sorted.sort_unstable();

    let mut records = Vec::new();
    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return records;
    };

    let flush = |start: u32, last: u32, records: &mut Vec<AckRecord>| {
        if start == last {
            records.push(AckRecord::Single(start));
        } else {
            records.push(AckRecord::Range { start, end: last });
        }
    };

    let (mut start, mut last) = (first, first);
    for current in iter {
        match current - last {
            0 => {}
            1 => last = current,
            _ => {
                flush(start, last, &mut records);
                start = current;
                last = current;
            }
        }
    }
    flush(start, last, &mut records);

    records
}

/// Write the record count followed by the compressed records.
///
/// Returns the number of records written.
pub fn compress(sequence_numbers: &[u32], out: &mut PacketSerializer) -> Result<u16> {
    let records = to_records(sequence_numbers);
    let count = u16::try_from(records.len())
        .map_err(|_| ProtocolError::TooManyRecords(records.len()))?;

    out.write_u16(count);
    for record in &records {
        record.write(out);
    }

    trace!(
        sequence_numbers = sequence_numbers.len(),
        records = count,
        "Compressed acknowledgment records"
    );
    Ok(count)
}

/// Expand compressed records back into sequence numbers.
///
/// Stops at the declared record count, at end of buffer, or once
/// `max_entries` numbers have been produced. Overlapping ranges produce
/// duplicates.
pub fn decompress(input: &mut PacketSerializer) -> Result<Vec<u32>> {
    let limits = input.options().ack_limits;
    let mode = input.options().ack_decode_mode;

    let record_count = input.read_u16()?;
    let mut sequence_numbers = Vec::new();

    let mut record = 0;
    while record < record_count && !input.is_eof() && sequence_numbers.len() < limits.max_entries
    {
        let tag = input.read_u8()?;
        let is_range = match mode {
            AckDecodeMode::Standard => tag == RECORD_TYPE_RANGE,
            AckDecodeMode::LegacyTwoTriadSingle => tag == RECORD_TYPE_SINGLE,
        };

        if is_range {
            let start = input.read_triad(ByteOrder::LittleEndian)?;
            let end = input
                .read_triad(ByteOrder::LittleEndian)?
                .min(start.saturating_add(limits.max_range_span));
            let budget = limits.max_entries - sequence_numbers.len();
            sequence_numbers.extend((start..=end).take(budget));
        } else {
            sequence_numbers.push(input.read_triad(ByteOrder::LittleEndian)?);
        }
        record += 1;
    }

    if record < record_count {
        trace!(
            declared = record_count,
            decoded = record,
            entries = sequence_numbers.len(),
            "Stopped expanding acknowledgment records early"
        );
    }

    Ok(sequence_numbers)
}
