// ==========================================
// MatShop Catalog Pipeline - spreadsheet reader
// ==========================================
// Supports: Excel (.xlsx) / CSV (.csv)
// Columns are fixed by position (not by header text):
// identifier, name, title, price, description, meta description, image
// ==========================================

use crate::domain::import::RawRow;
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

/// Number of consumed columns per row
pub const SHEET_COLUMNS: usize = 7;

/// Sheet ordinal of the first data row (row 1 is the header)
pub const FIRST_DATA_ROW: usize = 2;

// ==========================================
// SheetReader trait
// ==========================================
pub trait SheetReader: Send + Sync {
    /// Parse the file into raw rows. The header row is skipped
    /// unconditionally; a sheet without data rows is an error. Missing
    /// cells become empty strings, never a parse failure.
    fn read(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}

fn build_row(row_number: usize, cells: &[String]) -> RawRow {
    let cell = |idx: usize| cells.get(idx).map(|s| s.as_str()).unwrap_or("").to_string();
    RawRow {
        row_number,
        identifier: cell(0),
        name: cell(1),
        title: cell(2),
        price: cell(3),
        description: cell(4),
        meta_description: cell(5),
        image: cell(6),
    }
}

// ==========================================
// CSV reader implementation
// ==========================================
pub struct CsvSheetReader;

impl SheetReader for CsvSheetReader {
    fn read(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // tolerate ragged rows
            .from_reader(file);

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            if idx == 0 {
                // header row, skipped by position
                result?;
                continue;
            }
            let record = result?;
            let cells: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
            let row = build_row(idx + 1, &cells);
            // trailing blank rows are a spreadsheet artifact, not data
            if !row.is_blank() {
                rows.push(row);
            }
        }

        if rows.is_empty() {
            return Err(ImportError::EmptySheet);
        }
        Ok(rows)
    }
}

// ==========================================
// Excel reader implementation
// ==========================================
pub struct XlsxSheetReader;

impl SheetReader for XlsxSheetReader {
    fn read(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let mut workbook: Xlsx<_> = open_workbook(file_path)?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::SheetParseError("workbook has no sheets".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::SheetParseError(e.to_string()))?;

        let mut sheet_rows = range.rows();
        // header row, skipped by position
        if sheet_rows.next().is_none() {
            return Err(ImportError::EmptySheet);
        }

        let mut rows = Vec::new();
        for (idx, data_row) in sheet_rows.enumerate() {
            let cells: Vec<String> = data_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect();
            let row = build_row(idx + FIRST_DATA_ROW, &cells);
            if !row.is_blank() {
                rows.push(row);
            }
        }

        if rows.is_empty() {
            return Err(ImportError::EmptySheet);
        }
        Ok(rows)
    }
}

// ==========================================
// Universal reader (dispatch by extension)
// ==========================================
pub struct UniversalSheetReader;

impl UniversalSheetReader {
    pub fn read<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRow>> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvSheetReader.read(path),
            "xlsx" => XlsxSheetReader.read(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(lines: &[&str]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_csv_reads_fixed_columns() {
        let file = csv_file(&[
            "identifier,name,title,price,description,meta,image",
            "1.BMW,BMW mats,BMW title,,Premium mats,,bmw.jpg",
            "10001,Mat X5,,1500,,meta text,10001.jpg",
        ]);

        let rows = CsvSheetReader.read(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].identifier, "1.BMW");
        assert_eq!(rows[0].description, "Premium mats");
        assert_eq!(rows[1].row_number, 3);
        assert_eq!(rows[1].price, "1500");
        assert_eq!(rows[1].image, "10001.jpg");
    }

    #[test]
    fn test_csv_missing_cells_become_empty() {
        let file = csv_file(&[
            "identifier,name,title,price,description,meta,image",
            "10001,Mat", // ragged row, only two cells
        ]);

        let rows = CsvSheetReader.read(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].identifier, "10001");
        assert_eq!(rows[0].name, "Mat");
        assert_eq!(rows[0].title, "");
        assert_eq!(rows[0].image, "");
    }

    #[test]
    fn test_csv_blank_rows_are_dropped() {
        let file = csv_file(&[
            "identifier,name,title,price,description,meta,image",
            "10001,Mat,,,,,",
            ",,,,,,",
            "10002,Mat 2,,,,,",
        ]);

        let rows = CsvSheetReader.read(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        // original sheet ordinals survive the drop
        assert_eq!(rows[1].row_number, 4);
    }

    #[test]
    fn test_csv_header_only_fails_fast() {
        let file = csv_file(&["identifier,name,title,price,description,meta,image"]);
        assert!(matches!(
            CsvSheetReader.read(file.path()),
            Err(ImportError::EmptySheet)
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CsvSheetReader.read(Path::new("no_such_file.csv")),
            Err(ImportError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_universal_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        assert!(matches!(
            UniversalSheetReader.read(file.path()),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_universal_dispatches_csv() {
        let file = csv_file(&[
            "identifier,name,title,price,description,meta,image",
            "10001,Mat,,,,,",
        ]);
        let rows = UniversalSheetReader.read(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
