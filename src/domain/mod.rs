pub mod category;
pub mod line;
pub mod poi;
pub mod station;

pub use category::Category;
pub use line::{LineCatalog, MetroLine};
pub use poi::{PoiCandidate, PoiRecord, PoiTags};
pub use station::Station;
