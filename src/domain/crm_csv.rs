//! Customer CSV exchanged with the CRM (`sips_pelanggan_YYYYMMDD_HHMM.csv`).

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

const FILENAME_PREFIX: &str = "sips_pelanggan_";
const FILENAME_SUFFIX: &str = ".csv";
/// Output format only; parsing is done field by field.
const STAMP_FORMAT: &str = "%Y%m%d_%H%M";

pub const HEADER: [&str; 4] = ["username", "nama", "email", "no_telepon"];

#[derive(Debug, Error, PartialEq)]
pub enum CrmCsvError {
    #[error("filename must match sips_pelanggan_YYYYMMDD_HHMM.csv, got '{0}'")]
    InvalidFilename(String),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("malformed csv: {0}")]
    Malformed(String),

    #[error("invalid rows: {}", .0.join("; "))]
    InvalidRows(Vec<String>),

    #[error("file contains no customer rows")]
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub username: String,
    pub nama: String,
    pub email: Option<String>,
    pub no_telepon: Option<String>,
}

/// Validates an upload filename and returns the export timestamp it encodes.
pub fn parse_filename(filename: &str) -> Result<NaiveDateTime, CrmCsvError> {
    let invalid = || CrmCsvError::InvalidFilename(filename.to_string());
    let stamp = filename
        .strip_prefix(FILENAME_PREFIX)
        .and_then(|rest| rest.strip_suffix(FILENAME_SUFFIX))
        .ok_or_else(invalid)?;

    let shape_ok = stamp.len() == 13
        && stamp.char_indices().all(|(i, c)| {
            if i == 8 {
                c == '_'
            } else {
                c.is_ascii_digit()
            }
        });
    if !shape_ok {
        return Err(invalid());
    }

    let num = |range: std::ops::Range<usize>| stamp[range].parse::<u32>().ok();
    let (year, month, day) = (num(0..4), num(4..6), num(6..8));
    let (hour, minute) = (num(9..11), num(11..13));
    match (year, month, day, hour, minute) {
        (Some(y), Some(mo), Some(d), Some(h), Some(mi)) => NaiveDate::from_ymd_opt(y as i32, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, 0))
            .ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

pub fn export_filename(at: NaiveDateTime) -> String {
    format!(
        "{FILENAME_PREFIX}{}{FILENAME_SUFFIX}",
        at.format(STAMP_FORMAT)
    )
}

/// Parses the whole file before anything is written, collecting every
/// row-level problem with its 1-based line number (header is line 1).
pub fn parse_customers(data: &[u8]) -> Result<Vec<CustomerRecord>, CrmCsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| CrmCsvError::Malformed(e.to_string()))?
        .clone();
    let columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim_start_matches('\u{feff}').to_ascii_lowercase(), i))
        .collect();

    let username_idx = *columns
        .get("username")
        .ok_or(CrmCsvError::MissingColumn("username"))?;
    let nama_idx = *columns
        .get("nama")
        .ok_or(CrmCsvError::MissingColumn("nama"))?;
    let email_idx = columns.get("email").copied();
    let phone_idx = columns.get("no_telepon").copied();

    let mut records = Vec::new();
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, result) in reader.records().enumerate() {
        let line = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                errors.push(format!("line {line}: {e}"));
                continue;
            }
        };
        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();
        let optional = |idx: Option<usize>| {
            idx.map(&field).filter(|v| !v.is_empty())
        };

        let username = field(username_idx);
        let nama = field(nama_idx);
        if username.is_empty() {
            errors.push(format!("line {line}: username is empty"));
            continue;
        }
        if nama.is_empty() {
            errors.push(format!("line {line}: nama is empty"));
            continue;
        }
        if !seen.insert(username.clone()) {
            errors.push(format!("line {line}: duplicate username '{username}'"));
            continue;
        }

        records.push(CustomerRecord {
            username,
            nama,
            email: optional(email_idx),
            no_telepon: optional(phone_idx),
        });
    }

    if !errors.is_empty() {
        return Err(CrmCsvError::InvalidRows(errors));
    }
    if records.is_empty() {
        return Err(CrmCsvError::Empty);
    }
    Ok(records)
}

pub fn render_customers(records: &[CustomerRecord]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for r in records {
        writer.write_record([
            r.username.as_str(),
            r.nama.as_str(),
            r.email.as_deref().unwrap_or(""),
            r.no_telepon.as_deref().unwrap_or(""),
        ])?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
