//! The submissions log (`results.csv`).
//!
//! Rows are free-form: pairs-mode rows carry `item_id`, ticket-mode rows
//! carry `ticket_id`, and metric columns come and go with the metrics that
//! were available. Each append therefore widens the header to the union of
//! old and new columns and rewrites the whole file.

use std::collections::BTreeMap;

use crate::{DataDir, Result, StoreError};

/// The results log held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsTable {
    pub columns: Vec<String>,
    /// One value per column; missing cells are empty strings.
    pub rows: Vec<Vec<String>>,
}

impl ResultsTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, adding unseen columns at the end.
    pub fn push(&mut self, cells: &[(String, String)]) {
        for (column, _) in cells {
            if !self.columns.contains(column) {
                self.columns.push(column.clone());
                for row in &mut self.rows {
                    row.push(String::new());
                }
            }
        }

        let mut row = vec![String::new(); self.columns.len()];
        for (column, value) in cells {
            if let Some(idx) = self.columns.iter().position(|c| c == column) {
                row[idx] = value.clone();
            }
        }
        self.rows.push(row);
    }

    /// Rows keyed by column name, skipping empty cells.
    pub fn records(&self) -> Vec<BTreeMap<String, String>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .filter(|(_, v)| !v.is_empty())
                    .map(|(c, v)| (c.clone(), v.clone()))
                    .collect()
            })
            .collect()
    }
}

impl DataDir {
    /// Read the whole log. A missing file is an empty log.
    pub fn read_results(&self) -> Result<ResultsTable> {
        let path = self.results_path();
        if !path.exists() {
            return Ok(ResultsTable::default());
        }

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(|e| StoreError::csv(&path, e))?;
        let columns: Vec<String> = rdr
            .headers()
            .map_err(|e| StoreError::csv(&path, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| StoreError::csv(&path, e))?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(columns.len(), String::new());
            rows.push(row);
        }

        Ok(ResultsTable { columns, rows })
    }

    /// Append one submission row and rewrite the log atomically.
    pub fn append_result(&self, cells: &[(String, String)]) -> Result<()> {
        let path = self.results_path();
        let mut table = self.read_results()?;
        table.push(cells);

        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(&table.columns)
            .map_err(|e| StoreError::csv(&path, e))?;
        for row in &table.rows {
            wtr.write_record(row).map_err(|e| StoreError::csv(&path, e))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| StoreError::io(&path, e.into_error()))?;
        self.write_atomic(&path, &bytes)?;

        tracing::debug!(rows = table.len(), columns = table.columns.len(), "appended result");
        Ok(())
    }
}
