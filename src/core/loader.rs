//! CSV loader for production event datasets

use crate::core::error::LoadError;
use crate::core::models::RawTable;
use crate::core::schema::columns;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Header spellings of the legacy German export, mapped to canonical names
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("Datum", columns::DATE),
    ("Unternehmen", columns::COMPANY),
    ("Produkt", columns::PRODUCT),
    ("Modifikation", columns::MODIFICATION),
    ("Produktionslinie", columns::LINE),
    ("Schicht", columns::SHIFT),
    ("Auftragsnummer", columns::ORDER_NUMBER),
    ("Fehlercode", columns::ERROR_CODE),
    ("Stueckzahl", columns::QUANTITY),
    ("Stückzahl", columns::QUANTITY),
    ("Ausschuss", columns::SCRAP),
    ("Betriebsstunden", columns::OPERATING_HOURS),
    ("Stillstandszeit_Min", columns::DOWNTIME_MINUTES),
    ("Stillstand_Min", columns::DOWNTIME_MINUTES),
    ("Materialkosten", columns::MATERIAL_COST),
    ("Energieverbrauch_kWh", columns::ENERGY_KWH),
    ("Energie_kWh", columns::ENERGY_KWH),
    ("Mitarbeiter_Produktion", columns::HEADCOUNT),
    ("Softwareversion", columns::SOFTWARE_VERSION),
    ("Firmwareversion", columns::FIRMWARE_VERSION),
    ("MaxTemperatur", columns::MAX_TEMPERATURE),
    ("Durchschnittstemperatur", columns::AVG_TEMPERATURE),
    ("EndOfLine_Test", columns::END_OF_LINE_TEST),
];

/// Canonical column name for a header cell.
///
/// Unknown headers are kept as-is so the schema validator can report them.
#[must_use]
pub fn canonical_header(header: &str) -> &str {
    let header = header.trim().trim_start_matches('\u{feff}');
    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == header)
        .map_or(header, |&(_, canonical)| canonical)
}

/// Load a production CSV file into a raw table
///
/// # Errors
/// Returns [`LoadError::Io`] if the file cannot be opened, [`LoadError::Csv`]
/// on malformed CSV and [`LoadError::EmptySource`] if there is no header row.
pub fn load_production_csv<P: AsRef<Path>>(path: P) -> Result<RawTable, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let table = read_production_csv(file)?;
    info!(path = %path.display(), rows = table.len(), "loaded production data");
    Ok(table)
}

/// Read production CSV content from any reader
///
/// Cells are trimmed and fully blank lines are skipped.
///
/// # Errors
/// Returns [`LoadError::Csv`] on malformed CSV and [`LoadError::EmptySource`]
/// if there is no header row.
pub fn read_production_csv<R: Read>(reader: R) -> Result<RawTable, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| canonical_header(h).to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(LoadError::EmptySource);
    }

    let mut table = RawTable::new(headers);
    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        table.push_row(record.iter().map(str::to_string).collect());
    }

    debug!(columns = table.columns().len(), rows = table.len(), "parsed CSV");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_german_headers() {
        assert_eq!(canonical_header("Datum"), "Date");
        assert_eq!(canonical_header(" Stueckzahl "), "Quantity");
        assert_eq!(canonical_header("Produktionslinie"), "ProductionLine");
        assert_eq!(canonical_header("Quantity"), "Quantity");
        assert_eq!(canonical_header("Whatever"), "Whatever");
    }

    #[test]
    fn reads_rows_and_skips_blank_lines() {
        let data = "Datum,Produktionslinie,Stueckzahl\n2025-01-01, A ,100\n,,\n2025-01-02,B\n";
        let table = read_production_csv(data.as_bytes()).unwrap();

        assert_eq!(table.columns(), ["Date", "ProductionLine", "Quantity"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "ProductionLine"), Some("A"));
        assert_eq!(table.cell(1, "Quantity"), Some(""));
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = read_production_csv("".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::EmptySource));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_production_csv("/definitely/not/here.csv").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }
}
