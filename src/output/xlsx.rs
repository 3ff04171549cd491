use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Default workbook path next to the CSV: `data.csv` -> `data.xlsx`
pub fn default_xlsx_path(csv_path: &Path) -> PathBuf {
    csv_path.with_extension("xlsx")
}

/// Header plus raw cells of a CSV file, column count taken from the header
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Columns whose non-empty cells all parse as numbers
    ///
    /// A column with no values at all stays text.
    pub fn numeric_columns(&self) -> Vec<bool> {
        (0..self.header.len())
            .map(|col| {
                let mut values = self
                    .rows
                    .iter()
                    .filter_map(|r| r.get(col))
                    .filter(|v| !v.is_empty())
                    .peekable();
                values.peek().is_some() && values.all(|v| v.parse::<f64>().is_ok())
            })
            .collect()
    }
}

pub fn read_sheet(path: &Path) -> Result<Sheet> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new().from_reader(file);

    let header: Vec<String> = rdr
        .headers()
        .with_context(|| format!("Failed to read CSV header: {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let rows: Vec<Vec<String>> = rdr
        .records()
        .enumerate()
        .map(|(i, record)| {
            record
                .map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
                .with_context(|| format!("Invalid row {} in {}", i + 1, path.display()))
        })
        .collect::<Result<_>>()?;

    Ok(Sheet { header, rows })
}

/// Write the sheet as a single-worksheet workbook; numeric columns become number cells
pub fn write_xlsx(path: &Path, sheet: &Sheet) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let numeric = sheet.numeric_columns();

    for (col, name) in sheet.header.iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }

    for (i, row) in sheet.rows.iter().enumerate() {
        let r = i as u32 + 1;
        for (col, value) in row.iter().enumerate().take(sheet.header.len()) {
            if value.is_empty() {
                continue;
            }
            match value.parse::<f64>() {
                Ok(number) if numeric[col] => worksheet.write_number(r, col as u16, number)?,
                _ => worksheet.write_string(r, col as u16, value)?,
            };
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write workbook: {}", path.display()))
}

/// Convert an exported CSV file to `.xlsx`, returning the number of data rows
pub fn export_xlsx(input: &Path, output: &Path) -> Result<usize> {
    let sheet = read_sheet(input)?;
    write_xlsx(output, &sheet)?;
    Ok(sheet.rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx, open_workbook};
    use std::fs;
    use tempfile::tempdir;

    const EXPORTED: &str = "\
ID,Name,Category,Subcategory,lat,lng,Nearest Station,Distance (m)
KA0001,\"Kopi, Bar & Co\",Food,Cafe,3.1425,101.6961,Pasar Seni,92.0
KA0002,7,Other,General,3.15,101.7,Merdeka,310.4
";

    #[test]
    fn test_default_xlsx_path() {
        assert_eq!(
            default_xlsx_path(Path::new("out/kajang.csv")),
            PathBuf::from("out/kajang.xlsx")
        );
    }

    #[test]
    fn test_numeric_columns() {
        let sheet = Sheet {
            header: vec!["Name".into(), "lat".into(), "Note".into()],
            rows: vec![
                vec!["7".into(), "3.1".into(), "".into()],
                vec!["Kopi".into(), "".into(), "".into()],
            ],
        };
        assert_eq!(sheet.numeric_columns(), vec![false, true, false]);
    }

    #[test]
    fn test_export_writes_header_and_numbers() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("kajang.csv");
        fs::write(&input, EXPORTED).unwrap();
        let output = default_xlsx_path(&input);

        assert_eq!(export_xlsx(&input, &output).unwrap(), 2);

        let mut workbook: Xlsx<_> = open_workbook(&output).unwrap();
        let range = workbook.worksheet_range("Sheet1").unwrap();
        let rows: Vec<_> = range.rows().collect();
        assert_eq!(rows.len(), 3);

        let header: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
        assert_eq!(
            header,
            [
                "ID",
                "Name",
                "Category",
                "Subcategory",
                "lat",
                "lng",
                "Nearest Station",
                "Distance (m)"
            ]
        );

        assert_eq!(rows[1][0], Data::String("KA0001".to_string()));
        assert_eq!(rows[1][1], Data::String("Kopi, Bar & Co".to_string()));
        assert_eq!(rows[1][4], Data::Float(3.1425));
        assert_eq!(rows[1][7], Data::Float(92.0));
        // Name column is mixed, so a numeric-looking name stays text
        assert_eq!(rows[2][1], Data::String("7".to_string()));
    }

    #[test]
    fn test_export_missing_input() {
        let dir = tempdir().unwrap();
        let err = export_xlsx(&dir.path().join("nope.csv"), &dir.path().join("nope.xlsx"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to open CSV file"));
    }
}
