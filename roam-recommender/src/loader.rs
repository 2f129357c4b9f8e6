//! CSV ingestion.
//!
//! Review exports are messy: a couple of title lines above the header,
//! blank header cells (`Unnamed: 0` once round-tripped through a
//! spreadsheet), trailing empty rows, ragged lines. The loader handles the
//! structural mess; column naming is left to the schema normalizer.

use roam_common::config::DataConfig;
use roam_common::error::ResultExt;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::RecommendError;
use crate::schema::normalizer::is_unnamed;
use crate::schema::{CanonicalField, ColumnRules};
use crate::table::{Category, RawTable, RecordSet};

/// Structural options for CSV parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvOptions {
    /// Raw lines to skip before the header row
    pub skip_rows: usize,
    /// Names applied to leading unnamed headers, by position
    pub positional_headers: Option<Vec<String>>,
}

impl CsvOptions {
    pub fn from_config(config: &DataConfig) -> Self {
        Self {
            skip_rows: config.skip_rows,
            positional_headers: config.positional_headers.clone(),
        }
    }
}

/// Read a CSV stream into a raw table.
pub fn read_table<R: Read>(reader: R, options: &CsvOptions) -> roam_common::Result<RawTable> {
    let mut reader = BufReader::new(reader);

    let mut line = String::new();
    for _ in 0..options.skip_rows {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = csv_reader.records();
    let mut columns: Vec<String> = match records.next() {
        Some(header) => header
            .map_err(std::io::Error::from)
            .context("reading CSV header")?
            .iter()
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };

    if let Some(positional) = &options.positional_headers {
        relabel_headers(&mut columns, positional);
    }

    let mut rows = Vec::new();
    for (i, record) in records.enumerate() {
        let record = record
            .map_err(std::io::Error::from)
            .context(format!("reading CSV row {}", i + 1))?;

        let row: Vec<Option<String>> = record
            .iter()
            .map(|cell| {
                let cell = cell.trim();
                (!cell.is_empty()).then(|| cell.to_string())
            })
            .collect();

        if row.iter().all(Option::is_none) {
            continue;
        }
        rows.push(row);
    }

    Ok(RawTable::from_rows(columns, rows))
}

/// Name leading headers positionally when the export left them blank.
fn relabel_headers(columns: &mut [String], positional: &[String]) {
    if !columns.first().is_some_and(|c| is_unnamed(c)) {
        return;
    }
    for (column, name) in columns.iter_mut().zip(positional) {
        if is_unnamed(column) {
            *column = name.clone();
        }
    }
}

/// Read a CSV file, logging a structural report.
pub fn load_csv(path: &Path, options: &CsvOptions, rules: &ColumnRules) -> Result<RawTable, RecommendError> {
    let table = File::open(path)
        .map_err(roam_common::Error::from)
        .and_then(|file| read_table(file, options))
        .map_err(|e| RecommendError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    TableReport::inspect(&table, rules).log(path);
    Ok(table)
}

/// Configured CSV locations for both categories.
#[derive(Debug, Clone, Default)]
pub struct DataSources {
    pub dining: Option<PathBuf>,
    pub attractions: Option<PathBuf>,
    pub options: CsvOptions,
}

impl DataSources {
    pub fn from_config(config: &DataConfig) -> Self {
        Self {
            dining: config.dining_path(),
            attractions: config.attractions_path(),
            options: CsvOptions::from_config(config),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.dining.is_some() || self.attractions.is_some()
    }

    /// Load `(dining, attractions)`. A category without a configured path
    /// yields an empty canonical table.
    pub fn load(&self, rules: &ColumnRules) -> Result<(RawTable, RawTable), RecommendError> {
        Ok((
            self.load_one(Category::Dining, self.dining.as_deref(), rules)?,
            self.load_one(Category::Attraction, self.attractions.as_deref(), rules)?,
        ))
    }

    fn load_one(
        &self,
        category: Category,
        path: Option<&Path>,
        rules: &ColumnRules,
    ) -> Result<RawTable, RecommendError> {
        match path {
            Some(path) => load_csv(path, &self.options, rules),
            None => {
                warn!(%category, "No CSV configured, starting with an empty record set");
                Ok(RecordSet::new(category, Vec::new()).to_table())
            }
        }
    }
}

/// Structural summary of a loaded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub columns: Vec<String>,
    pub rows: usize,
    /// Empty cells per column
    pub empty_counts: Vec<(String, usize)>,
    /// Canonical fields the current rules cannot resolve
    pub missing: Vec<CanonicalField>,
}

impl TableReport {
    pub fn inspect(table: &RawTable, rules: &ColumnRules) -> Self {
        let empty_counts = table
            .columns
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let empty = (0..table.len())
                    .filter(|&row| table.cell(row, col).is_none())
                    .count();
                (name.clone(), empty)
            })
            .collect();

        let kept: Vec<(usize, String)> = table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !is_unnamed(name))
            .map(|(i, name)| (i, name.trim().to_lowercase()))
            .collect();

        Self {
            columns: table.columns.clone(),
            rows: table.len(),
            empty_counts,
            missing: rules.resolve(&kept).missing,
        }
    }

    fn log(&self, path: &Path) {
        info!(
            path = %path.display(),
            columns = ?self.columns,
            rows = self.rows,
            empty = ?self.empty_counts,
            "Loaded CSV"
        );
        if !self.missing.is_empty() {
            warn!(
                path = %path.display(),
                missing = ?self.missing,
                "CSV is missing canonical columns"
            );
        }
    }
}
