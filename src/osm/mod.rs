pub mod parser;

pub use parser::{Extraction, ExtractError, MissingCoordinates, parse_elements};
