//! CSV output: a fixed header, then one row per run key.
//!
//! Cells follow the spreadsheet layout the existing analysis sheets import:
//! `True`/`False` flags, floats in shortest round-trip form with a trailing
//! `.0` on whole numbers, and CRLF line endings.
use crate::row::Row;
use std::io::Write;
use std::path::Path;

pub const HEADER: [&str; 14] = [
    "number", "mode", "rep", "fast", "thrd", "low", "dfq", "real", "user", "sys", "peak mem",
    "kiB", "MiB", "GiB",
];

const LINE_END: &str = "\r\n";

/// Write `rows` to `path`, replacing any existing file.
pub fn write_csv(path: &Path, rows: &[Row]) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut out = std::io::BufWriter::new(file);
    write_rows(&mut out, rows)?;
    out.flush()
}

pub fn write_rows<W: Write>(out: &mut W, rows: &[Row]) -> std::io::Result<()> {
    let header: Vec<String> = HEADER.iter().map(|h| escape_csv(h)).collect();
    write!(out, "{}{LINE_END}", header.join(","))?;
    for row in rows {
        write!(out, "{}{LINE_END}", record(row).join(","))?;
    }
    Ok(())
}

/// Cells of one row in `HEADER` order.
fn record(row: &Row) -> Vec<String> {
    let mut cells = Vec::with_capacity(HEADER.len());
    cells.push(row.number.to_string());
    cells.push(escape_csv(row.mode.as_str()));
    cells.extend(row.flags.iter().map(|&f| bool_cell(f).to_string()));
    cells.push(float_cell(row.real));
    cells.push(float_cell(row.user));
    cells.push(float_cell(row.sys));
    cells.push(row.peak_mem.map(|b| b.to_string()).unwrap_or_default());
    cells.push(float_cell(row.kib));
    cells.push(float_cell(row.mib));
    cells.push(float_cell(row.gib));
    cells
}

fn bool_cell(flag: bool) -> &'static str {
    if flag {
        "True"
    } else {
        "False"
    }
}

/// Missing values become empty cells.
fn float_cell(value: Option<f64>) -> String {
    value.map(format_float).unwrap_or_default()
}

/// Shortest round-trip decimal; scientific notation with a signed two-digit
/// exponent outside `[1e-4, 1e16)`, and `.0` appended to whole numbers.
fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let abs = v.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let sci = format!("{v:e}");
        if let Some((mantissa, exp)) = sci.split_once('e') {
            if let Ok(exp) = exp.parse::<i32>() {
                let sign = if exp < 0 { '-' } else { '+' };
                return format!("{mantissa}e{sign}{:02}", exp.abs());
            }
        }
        return sci;
    }
    let plain = v.to_string();
    if plain.contains('.') {
        plain
    } else {
        format!("{plain}.0")
    }
}

/// Minimal CSV escaping: wrap in quotes if the value contains a comma or quote.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Mode;
    use tempfile::tempdir;

    fn full_row() -> Row {
        Row {
            number: 5,
            mode: Mode::Strings,
            flags: [true, false, true, false, false],
            real: Some(3.0),
            user: Some(1.5),
            sys: Some(0.25),
            peak_mem: Some(2_097_152),
            kib: Some(2048.0),
            mib: Some(2.0),
            gib: Some(0.001953125),
        }
    }

    fn render(rows: &[Row]) -> String {
        let mut buf = Vec::new();
        write_rows(&mut buf, rows).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_only_when_no_rows() {
        assert_eq!(
            render(&[]),
            "number,mode,rep,fast,thrd,low,dfq,real,user,sys,peak mem,kiB,MiB,GiB\r\n"
        );
    }

    #[test]
    fn test_full_row() {
        let out = render(&[full_row()]);
        let line = out.lines().nth(1).unwrap();
        assert_eq!(
            line,
            "5,strings,True,False,True,False,False,3.0,1.5,0.25,2097152,2048.0,2.0,0.001953125"
        );
    }

    #[test]
    fn test_missing_values_are_blank() {
        let row = Row {
            number: 2,
            mode: Mode::Derivations,
            flags: [false, true, false, false, false],
            real: None,
            user: None,
            sys: None,
            ..full_row()
        };
        let out = render(&[row]);
        let cells: Vec<&str> = out.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(cells.len(), HEADER.len());
        assert_eq!(&cells[7..10], &["", "", ""]);
        assert_eq!(cells[10], "2097152");
    }

    #[test]
    fn test_write_csv_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");
        std::fs::write(&path, "stale contents\nmore\nand more\n").unwrap();

        write_csv(&path, &[full_row()]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("number,mode,"));
        assert!(!text.contains("stale"));
    }

    #[test]
    fn test_rows_end_with_crlf() {
        let out = render(&[full_row(), full_row()]);
        assert_eq!(out.matches("\r\n").count(), 3);
        assert_eq!(out.matches('\n').count(), 3);
        assert!(out.ends_with("0.001953125\r\n"));
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(2.0), "2.0");
        assert_eq!(format_float(2048.0), "2048.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(0.001953125), "0.001953125");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(1.5e-5), "1.5e-05");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1024.0 / 1024f64.powi(3)), "9.5367431640625e-07");
        assert_eq!(format_float(9_999_999_999_999_998.0), "9999999999999998.0");
    }

    #[test]
    fn test_bool_cells() {
        assert_eq!(bool_cell(true), "True");
        assert_eq!(bool_cell(false), "False");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
