//! Flatten a run key and its metrics into one spreadsheet row.
//!
//! The run key encodes the benchmark configuration: its first digit run is
//! a flag mask whose bits 0..=4 fill the `rep`, `fast`, `thrd`, `low` and
//! `dfq` columns, and the presence of the strings marker selects the mode.
use crate::aggregate::MetricsBag;

/// Flag columns, indexed by bit position in the run number.
pub const FLAG_COLUMNS: [&str; 5] = ["rep", "fast", "thrd", "low", "dfq"];

/// Which generator output a run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Strings,
    Derivations,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Strings => "strings",
            Mode::Derivations => "derivations",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output row. `None` fields are written as empty cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub number: u64,
    pub mode: Mode,
    pub flags: [bool; FLAG_COLUMNS.len()],
    pub real: Option<f64>,
    pub user: Option<f64>,
    pub sys: Option<f64>,
    pub peak_mem: Option<u64>,
    pub kib: Option<f64>,
    pub mib: Option<f64>,
    pub gib: Option<f64>,
}

/// The first maximal run of ASCII digits in `run_key`, parsed as an integer.
pub fn run_number(run_key: &str) -> Result<u64, RowError> {
    let start = run_key
        .find(|c: char| c.is_ascii_digit())
        .ok_or(RowError::NoNumber)?;
    let digits = &run_key[start..];
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    digits[..len]
        .parse()
        .map_err(|_| RowError::NumberOverflow(digits[..len].to_string()))
}

pub fn mode_of(run_key: &str, strings_marker: &str) -> Mode {
    if run_key.contains(strings_marker) {
        Mode::Strings
    } else {
        Mode::Derivations
    }
}

/// Bit `i` of `number` for each flag column.
pub fn decode_flags(number: u64) -> [bool; FLAG_COLUMNS.len()] {
    std::array::from_fn(|bit| (number >> bit) & 1 == 1)
}

/// `bytes` in KiB, MiB and GiB.
pub fn scaled_mem(bytes: u64) -> [f64; 3] {
    let bytes = bytes as f64;
    std::array::from_fn(|i| bytes / 1024f64.powi(i as i32 + 1))
}

pub fn build_row(run_key: &str, bag: &MetricsBag, strings_marker: &str) -> Result<Row, RowError> {
    let number = run_number(run_key)?;
    let timing = bag.mean_timing();
    let scaled = bag.peak_mem.map(scaled_mem);
    Ok(Row {
        number,
        mode: mode_of(run_key, strings_marker),
        flags: decode_flags(number),
        real: timing.map(|t| t.real),
        user: timing.map(|t| t.user),
        sys: timing.map(|t| t.sys),
        peak_mem: bag.peak_mem,
        kib: scaled.map(|s| s[0]),
        mib: scaled.map(|s| s[1]),
        gib: scaled.map(|s| s[2]),
    })
}

#[derive(Debug)]
pub enum RowError {
    /// The run key has no digits to decode flags from.
    NoNumber,
    /// The digit run does not fit in 64 bits.
    NumberOverflow(String),
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowError::NoNumber => write!(f, "run key has no run number"),
            RowError::NumberOverflow(s) => write!(f, "run number out of range: {s}"),
        }
    }
}

impl std::error::Error for RowError {}
