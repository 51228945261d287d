// src/table.rs
use anyhow::{bail, ensure, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};
use tracing::debug;

pub const SPELL_ID_COLUMN: &str = "SpellID";
pub const NAME_COLUMN: &str = "FullSpellName";

/// A delimited table held fully in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column names from the header row, in file order.
    pub headers: Vec<String>,
    /// Each data row, one `String` per column.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Open `path` and parse it with `delimiter`. The header row must name a `SpellID` column.
    #[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Self> {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open input table: {:?}", path.as_ref()))?;
        Self::from_reader(BufReader::new(file), delimiter)
            .with_context(|| format!("Failed to load table from {:?}", path.as_ref()))
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true) // short rows are padded below
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .context("CSV parse error in header row")?
            .iter()
            .map(str::to_string)
            .collect();
        if !headers.iter().any(|h| h == SPELL_ID_COLUMN) {
            bail!("missing `{}` column (found {:?})", SPELL_ID_COLUMN, headers);
        }

        let mut rows = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            // rows are numbered from 1 after the header, matching a spreadsheet view
            let record = result.with_context(|| format!("CSV parse error at row {}", idx + 1))?;
            ensure!(
                record.len() <= headers.len(),
                "row {} has {} fields, header has {}",
                idx + 1,
                record.len(),
                headers.len()
            );
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            // missing trailing cells become empty
            row.resize(headers.len(), String::new());
            rows.push(row);
        }
        debug!(columns = headers.len(), rows = rows.len(), "table loaded");

        Ok(Self { headers, rows })
    }

    /// Write headers and rows to `path`, creating or truncating it. No index column is added.
    #[tracing::instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn save<P: AsRef<Path>>(&self, path: P, delimiter: u8) -> Result<()> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output table: {:?}", path.as_ref()))?;
        let mut out = BufWriter::new(file);
        self.to_writer(&mut out, delimiter)
            .with_context(|| format!("Failed to write table to {:?}", path.as_ref()))?;
        out.flush()
            .with_context(|| format!("Failed to flush {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn to_writer<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let mut wtr = WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// The raw `SpellID` cell of every row, in row order.
    pub fn spell_ids(&self) -> Result<Vec<String>> {
        let idx = self
            .column_index(SPELL_ID_COLUMN)
            .with_context(|| format!("missing `{}` column", SPELL_ID_COLUMN))?;
        Ok(self
            .rows
            .iter()
            .map(|r| r.get(idx).cloned().unwrap_or_default())
            .collect())
    }

    /// Replace column `name` with `values`, appending it as the last column if absent.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        ensure!(
            values.len() == self.rows.len(),
            "column `{}` has {} values for {} rows",
            name,
            values.len(),
            self.rows.len()
        );
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    if row.len() <= idx {
                        row.resize(idx + 1, String::new());
                    }
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Header plus the first `n` rows, tab separated, one line each.
    pub fn preview(&self, n: usize) -> String {
        let mut lines = Vec::with_capacity(n + 1);
        lines.push(self.headers.join("\t"));
        for row in self.rows.iter().take(n) {
            lines.push(row.join("\t"));
        }
        if self.rows.len() > n {
            lines.push(format!("... ({} more rows)", self.rows.len() - n));
        }
        lines.join("\n")
    }
}
