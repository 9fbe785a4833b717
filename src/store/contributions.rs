use crate::core::contribution::{self, NormalizationReport, RawRecord};
use anyhow::{Context, Result};
use csv::{ByteRecord, ReaderBuilder};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Header names and raw rows as they appear in a contributions CSV.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

fn column(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Reads CSV rows, mapping `date`, `amount`, `merchant` and `category` by header
/// name. Blank lines are skipped and short rows leave trailing fields empty.
/// Fields that are not valid UTF-8 are decoded lossily so one bad row never
/// stops the import.
pub fn read_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = reader
        .byte_headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(decode)
        .collect();

    let date = column(&headers, "date");
    let amount = column(&headers, "amount");
    let merchant = column(&headers, "merchant");
    let category = column(&headers, "category");
    let field = |record: &ByteRecord, idx: Option<usize>| {
        idx.and_then(|i| record.get(i)).map(decode)
    };

    let mut records = Vec::new();
    for (i, row) in reader.byte_records().enumerate() {
        let row = row.with_context(|| format!("Failed to read CSV row {}", i + 1))?;
        records.push(RawRecord {
            date: field(&row, date),
            amount: field(&row, amount),
            merchant: field(&row, merchant),
            category: field(&row, category),
        });
    }
    debug!("Read {} contribution rows", records.len());

    Ok(RawTable { headers, records })
}

/// Reads and normalizes the contributions file at `path`.
pub fn load_contributions(path: &Path) -> Result<NormalizationReport> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open contributions file: {}", path.display()))?;
    let table = read_table(file)?;
    Ok(contribution::normalize(&table.headers, &table.records)?)
}
