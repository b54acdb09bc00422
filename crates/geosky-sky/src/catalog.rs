//! Star catalog loading.
//!
//! Catalog text is one record per line: `name,right_ascension,declination,magnitude`
//! with right ascension in hours and declination in degrees. Blank lines and
//! lines starting with `#` are skipped. Numeric fields are parsed leniently:
//! anything unparsable reads as zero instead of rejecting the record.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::default_stars::DEFAULT_STAR_DATA;

/// One catalog entry.
#[derive(Clone, Debug, PartialEq)]
pub struct StarRecord {
    pub name: String,
    /// Hours, `[0, 24)`.
    pub right_ascension: f64,
    /// Degrees, `[-90, 90]`.
    pub declination: f64,
    /// Visual magnitude. Lower is brighter.
    pub magnitude: f64,
}

impl StarRecord {
    /// Parse one record. The line is split on its first three commas; the
    /// magnitude field takes the leading number of whatever remains.
    pub fn parse(line: &str) -> Self {
        let mut fields = line.splitn(4, ',');
        let name = fields.next().unwrap_or_default().trim().to_string();
        let right_ascension = lenient_number(fields.next().unwrap_or_default());
        let declination = lenient_number(fields.next().unwrap_or_default());
        let magnitude = lenient_number(fields.next().unwrap_or_default());
        Self {
            name,
            right_ascension,
            declination,
            magnitude,
        }
    }
}

/// Errors opening or reading a catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unable to open star file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed reading star file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Load stars from `path`, falling back to the built-in catalog when no path
/// is given, the file cannot be read, or it yields no records.
///
/// Never fails; problems with the file are logged as warnings.
pub fn load_stars(path: Option<&Path>, min_magnitude: Option<f32>) -> Vec<StarRecord> {
    if let Some(path) = path {
        match parse_star_file(path, min_magnitude) {
            Ok(stars) if !stars.is_empty() => {
                log::info!("Loaded {} stars from {}", stars.len(), path.display());
                return stars;
            }
            Ok(_) => {
                log::warn!(
                    "Star file {} contained no usable stars, using default star data instead",
                    path.display()
                );
            }
            Err(err) => {
                log::warn!("{err}; using default star data instead");
            }
        }
    }
    default_stars(min_magnitude)
}

/// Parse a catalog file strictly: I/O problems are returned to the caller.
pub fn parse_star_file(
    path: &Path,
    min_magnitude: Option<f32>,
) -> Result<Vec<StarRecord>, CatalogError> {
    let file = std::fs::File::open(path).map_err(|source| CatalogError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    // Lines are decoded lossily so a stray non-UTF-8 name keeps its record.
    let mut reader = std::io::BufReader::new(file);
    let mut stars = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| CatalogError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        if let Some(star) = parse_line(&String::from_utf8_lossy(&buf), min_magnitude) {
            stars.push(star);
        }
    }
    Ok(stars)
}

/// Parse catalog text held in memory.
pub fn parse_star_catalog(text: &str, min_magnitude: Option<f32>) -> Vec<StarRecord> {
    text.lines()
        .filter_map(|line| parse_line(line, min_magnitude))
        .collect()
}

/// The built-in catalog, filtered like a file would be.
pub fn default_stars(min_magnitude: Option<f32>) -> Vec<StarRecord> {
    DEFAULT_STAR_DATA
        .iter()
        .filter_map(|line| parse_line(line, min_magnitude))
        .collect()
}

fn parse_line(line: &str, min_magnitude: Option<f32>) -> Option<StarRecord> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let star = StarRecord::parse(line);
    match min_magnitude {
        Some(min) if star.magnitude < min as f64 => None,
        _ => Some(star),
    }
}

/// Read the leading number of `text`, or zero if there is none or it does
/// not fit in an `f64`.
fn lenient_number(text: &str) -> f64 {
    let text = text.trim_start();
    let len = numeric_prefix_len(text.as_bytes());
    text[..len]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Length of the longest prefix of the form `[+-]digits[.digits][(e|E)[+-]digits]`,
/// or zero when there are no mantissa digits.
fn numeric_prefix_len(bytes: &[u8]) -> usize {
    let digits_from = |start: usize| {
        start
            + bytes[start.min(bytes.len())..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - (end + 1);
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    end
}
