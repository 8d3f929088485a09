//! Timing extraction from `time` command output.
//!
//! Expects the bash `time` keyword layout, one line each for real, user
//! and sys, with durations written as `<minutes>m<seconds>,<fraction>s`:
//!
//! ```text
//! real    0m1,500s
//! user    0m0,250s
//! sys     1m2,000s
//! ```
use regex::Regex;
use std::sync::LazyLock;

/// `<minutes>m<seconds>[,.]<fraction>s`; minutes may be empty.
static DURATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d*)m(\d*[,.]\d*)s").unwrap());

/// One run's worth of timing values, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSample {
    pub real: f64,
    pub user: f64,
    pub sys: f64,
}

/// Every duration in `text`, in order of appearance.
pub fn durations(text: &str) -> Result<Vec<f64>, TimingError> {
    DURATION_PATTERN
        .captures_iter(text)
        .map(|caps| to_seconds(&caps[1], &caps[2]))
        .collect()
}

/// Parse the first three durations as real, user and sys.
pub fn parse_timing(text: &str) -> Result<TimingSample, TimingError> {
    let values = durations(text)?;
    match values.as_slice() {
        [real, user, sys, rest @ ..] => {
            if !rest.is_empty() {
                tracing::debug!(extra = rest.len(), "ignoring durations past the third");
            }
            Ok(TimingSample {
                real: *real,
                user: *user,
                sys: *sys,
            })
        }
        _ => Err(TimingError::Incomplete {
            found: values.len(),
        }),
    }
}

fn to_seconds(minutes: &str, seconds: &str) -> Result<f64, TimingError> {
    let minutes: f64 = if minutes.is_empty() {
        0.0
    } else {
        minutes
            .parse()
            .map_err(|_| TimingError::BadNumber(minutes.to_string()))?
    };
    let seconds: f64 = seconds
        .replace(',', ".")
        .parse()
        .map_err(|_| TimingError::BadNumber(seconds.to_string()))?;
    Ok(minutes * 60.0 + seconds)
}

#[derive(Debug)]
pub enum TimingError {
    /// Fewer than three durations in the file.
    Incomplete { found: usize },
    /// A duration field that is not a number (e.g. a bare `,`).
    BadNumber(String),
}

impl std::fmt::Display for TimingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimingError::Incomplete { found } => {
                write!(f, "expected real, user and sys durations, found {found}")
            }
            TimingError::BadNumber(s) => write!(f, "malformed duration: {s:?}"),
        }
    }
}

impl std::error::Error for TimingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_three_durations_in_order() {
        let sample = parse_timing("0m1,500s 0m0,250s 1m2,000s").unwrap();
        assert_eq!(
            sample,
            TimingSample {
                real: 1.5,
                user: 0.25,
                sys: 62.0
            }
        );
    }

    #[test]
    fn test_bash_time_layout() {
        let text = "\nreal\t0m3,021s\nuser\t0m2,750s\nsys\t0m0,180s\n";
        let sample = parse_timing(text).unwrap();
        assert!((sample.real - 3.021).abs() < 1e-9);
        assert!((sample.user - 2.75).abs() < 1e-9);
        assert!((sample.sys - 0.18).abs() < 1e-9);
    }

    #[test]
    fn test_multi_digit_minutes() {
        let sample = parse_timing("real 12m0,500s user 10m1,000s sys 0m0,000s").unwrap();
        assert_eq!(sample.real, 720.5);
        assert_eq!(sample.user, 601.0);
        assert_eq!(sample.sys, 0.0);
    }

    #[test]
    fn test_missing_minutes_count_as_zero() {
        let sample = parse_timing("m1,5s m2,0s m0,25s").unwrap();
        assert_eq!(sample.real, 1.5);
        assert_eq!(sample.user, 2.0);
        assert_eq!(sample.sys, 0.25);
    }

    #[test]
    fn test_dot_decimal_separator() {
        let sample = parse_timing("real 0m1.250s\nuser 0m1.000s\nsys 0m0.125s\n").unwrap();
        assert_eq!(sample.real, 1.25);
        assert_eq!(sample.sys, 0.125);
    }

    #[test]
    fn test_program_output_before_timings_is_ignored() {
        let text = "S -> 0A\nA -> 1\n\nreal\t0m0,010s\nuser\t0m0,004s\nsys\t0m0,002s\n";
        let sample = parse_timing(text).unwrap();
        assert_eq!(sample.real, 0.01);
    }

    #[test]
    fn test_extra_durations_ignored() {
        let sample = parse_timing("0m1,0s 0m2,0s 0m3,0s 0m4,0s").unwrap();
        assert_eq!(sample.sys, 3.0);
    }

    #[test]
    fn test_fewer_than_three_is_error() {
        let err = parse_timing("real 0m1,000s\nuser 0m0,500s\n").unwrap_err();
        assert!(matches!(err, TimingError::Incomplete { found: 2 }));
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn test_empty_file_is_error() {
        assert!(matches!(
            parse_timing(""),
            Err(TimingError::Incomplete { found: 0 })
        ));
    }

    #[test]
    fn test_bare_separator_is_error() {
        assert!(matches!(
            parse_timing("0m,s 0m1,0s 0m1,0s"),
            Err(TimingError::BadNumber(_))
        ));
    }

    #[test]
    fn test_durations_returns_all_matches() {
        assert_eq!(durations("0m1,0s 1m0,0s").unwrap(), vec![1.0, 60.0]);
    }
}
