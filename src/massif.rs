//! Peak heap extraction from massif snapshot files.
//!
//! A massif output file is a sequence of snapshot records separated by
//! `#-----------` rule lines. Each record reports `mem_heap_B` and
//! `mem_heap_extra_B`, and the record holding the heap maximum carries a
//! `heap_tree=peak` annotation. Other records (`heap_tree=empty`,
//! `heap_tree=detailed`) are skipped.

/// Separator between snapshot records.
const RECORD_BOUNDARY: char = '#';
const HEAP_FIELD: &str = "mem_heap_B=";
const HEAP_EXTRA_FIELD: &str = "mem_heap_extra_B=";
const PEAK_MARKER: &str = "heap_tree=peak";

/// The two size fields of the peak-marked snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakSnapshot {
    pub heap_bytes: u64,
    pub heap_extra_bytes: u64,
}

impl PeakSnapshot {
    /// Heap bytes plus allocator bookkeeping bytes.
    pub fn total(&self) -> u64 {
        self.heap_bytes.saturating_add(self.heap_extra_bytes)
    }
}

/// Find the first snapshot record marked as peak.
pub fn find_peak(text: &str) -> Result<PeakSnapshot, MassifError> {
    for record in text.split(RECORD_BOUNDARY) {
        if let Some(snapshot) = parse_record(record)? {
            return Ok(snapshot);
        }
    }
    Err(MassifError::NoPeakSnapshot)
}

/// Peak memory in bytes (`mem_heap_B + mem_heap_extra_B`).
pub fn peak_mem(text: &str) -> Result<u64, MassifError> {
    find_peak(text).map(|s| s.total())
}

/// Returns `Some` only when the record has both size fields, in order,
/// followed by the peak marker.
///
/// Only the first `mem_heap_B` of a record is tried: every later occurrence
/// is followed by a suffix of the text after the first, so it cannot find
/// a `mem_heap_extra_B` and peak marker the first one missed.
fn parse_record(record: &str) -> Result<Option<PeakSnapshot>, MassifError> {
    let Some((heap, rest)) = field_after(record, HEAP_FIELD) else {
        return Ok(None);
    };
    let Some((extra, rest)) = field_after(rest, HEAP_EXTRA_FIELD) else {
        return Ok(None);
    };
    if !rest.contains(PEAK_MARKER) {
        return Ok(None);
    }
    Ok(Some(PeakSnapshot {
        heap_bytes: parse_bytes(heap)?,
        heap_extra_bytes: parse_bytes(extra)?,
    }))
}

/// Locate `field` followed by at least one digit; returns the digit run and
/// the remainder of the record after it.
fn field_after<'a>(record: &'a str, field: &str) -> Option<(&'a str, &'a str)> {
    let mut haystack = record;
    loop {
        let start = haystack.find(field)? + field.len();
        let tail = &haystack[start..];
        let len = tail.bytes().take_while(u8::is_ascii_digit).count();
        if len > 0 {
            return Some((&tail[..len], &tail[len..]));
        }
        haystack = tail;
    }
}

fn parse_bytes(digits: &str) -> Result<u64, MassifError> {
    digits
        .parse()
        .map_err(|_| MassifError::BadNumber(digits.to_string()))
}

#[derive(Debug)]
pub enum MassifError {
    /// No record carries `heap_tree=peak` after both size fields.
    NoPeakSnapshot,
    /// A size field does not fit in 64 bits.
    BadNumber(String),
}

impl std::fmt::Display for MassifError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MassifError::NoPeakSnapshot => write!(f, "no snapshot marked heap_tree=peak"),
            MassifError::BadNumber(s) => write!(f, "heap size out of range: {s}"),
        }
    }
}

impl std::error::Error for MassifError {}
