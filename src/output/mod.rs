pub mod csv;
pub mod map;
pub mod table;
pub mod xlsx;

pub use self::csv::{CsvRow, read_csv, with_csv_extension, write_csv, write_csv_or_dump};
pub use map::{default_map_path, write_map};
pub use table::ResultTable;
pub use xlsx::{default_xlsx_path, export_xlsx};
