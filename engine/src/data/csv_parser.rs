// Reads one sheet of a price workbook (exported as delimited text) into PriceRecords.
use csv::{ReaderBuilder, StringRecord, Trim};
use shared::models::PriceRecord;
use shared::utils::korean_format::{is_blank_cell, parse_amount};
use std::fs::File;
use std::io::{BufReader, Read};

use super::column_resolver::{resolve_columns, ColumnSchema};
use crate::config::rules::ColumnAliases;
use crate::config::settings::EngineSettings;
use crate::error::EngineError;

/// Result of parsing one sheet.
#[derive(Debug, Clone)]
pub struct ParsedSheet {
    pub schema: ColumnSchema,
    pub records: Vec<PriceRecord>,
    /// Rows missing vendor, item or a readable price, or whose required cells are not valid UTF-8.
    pub dropped_rows: usize,
}

pub struct PriceSheetParser {
    aliases: ColumnAliases,
    history_prefix: String,
    delimiter: u8,
}

impl PriceSheetParser {
    pub fn new(aliases: ColumnAliases, history_prefix: impl Into<String>, delimiter: u8) -> Self {
        PriceSheetParser { aliases, history_prefix: history_prefix.into(), delimiter }
    }

    pub fn from_settings(settings: &EngineSettings) -> Result<Self, EngineError> {
        Ok(Self::new(
            settings.rules.columns.clone(),
            settings.data.history_prefix.clone(),
            settings.data.delimiter_byte()?,
        ))
    }

    pub fn load_from_path(&self, file_path: &str) -> Result<ParsedSheet, EngineError> {
        let file = File::open(file_path)?;
        tracing::debug!(path = %file_path, "Opened price sheet");
        self.load_from_reader(BufReader::new(file))
    }

    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<ParsedSheet, EngineError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true) // Spreadsheet exports drop trailing empty cells.
            .trim(Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let header_names: Vec<&str> = headers.iter().collect();
        let schema = resolve_columns(&header_names, &self.aliases, &self.history_prefix)?;

        let mut records = Vec::new();
        let mut dropped_rows = 0usize;

        for (idx, result) in rdr.byte_records().enumerate() {
            let line = idx + 2;
            let row = match StringRecord::from_byte_record(result?) {
                Ok(row) => row,
                Err(err) => {
                    tracing::debug!(line, "Row is not valid UTF-8; undecodable bytes replaced");
                    StringRecord::from_byte_record_lossy(err.into_byte_record())
                }
            };
            match Self::to_record(&row, &schema) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    dropped_rows += 1;
                    tracing::debug!(line, reason = %reason, "Dropping price row");
                }
            }
        }

        tracing::info!(
            records = records.len(),
            dropped = dropped_rows,
            spec_columns = schema.specs.len(),
            history_columns = schema.history.len(),
            "Parsed price sheet"
        );
        Ok(ParsedSheet { schema, records, dropped_rows })
    }

    fn field<'r>(row: &'r StringRecord, index: usize) -> &'r str {
        row.get(index).unwrap_or("")
    }

    /// A vendor, item or price cell that lost bytes in decoding cannot be trusted.
    fn required_field<'r>(row: &'r StringRecord, index: usize, name: &str) -> Result<&'r str, EngineError> {
        let value = Self::field(row, index);
        if value.contains(char::REPLACEMENT_CHARACTER) {
            return Err(EngineError::ParseError(format!("'{}' is not valid UTF-8", name)));
        }
        Ok(value)
    }

    fn optional_field(row: &StringRecord, index: Option<usize>) -> Option<String> {
        index
            .map(|i| Self::field(row, i))
            .filter(|v| !is_blank_cell(v))
            .map(|v| v.to_string())
    }

    /// Converts one row; the error is the reason the row is dropped.
    fn to_record(row: &StringRecord, schema: &ColumnSchema) -> Result<PriceRecord, EngineError> {
        let vendor = Self::required_field(row, schema.vendor.index, &schema.vendor.name)?;
        if is_blank_cell(vendor) {
            return Err(EngineError::MissingData(format!("empty '{}'", schema.vendor.name)));
        }
        let item = Self::required_field(row, schema.item.index, &schema.item.name)?;
        if is_blank_cell(item) {
            return Err(EngineError::MissingData(format!("empty '{}'", schema.item.name)));
        }
        let price = parse_amount(Self::required_field(row, schema.price.index, &schema.price.name)?)
            .map_err(|e| EngineError::ParseError(format!("'{}': {}", schema.price.name, e)))?;

        let specs = schema
            .specs
            .iter()
            .map(|c| Self::field(row, c.index).to_string())
            .collect();

        let history = schema
            .history
            .iter()
            .filter_map(|c| parse_amount(Self::field(row, c.index)).ok().map(|p| (c.date, p)))
            .collect();

        Ok(PriceRecord {
            vendor: vendor.to_string(),
            item: item.to_string(),
            specs,
            price,
            note: Self::optional_field(row, schema.note.as_ref().map(|c| c.index)),
            unit: Self::optional_field(row, schema.unit.as_ref().map(|c| c.index)),
            history,
        })
    }
}
