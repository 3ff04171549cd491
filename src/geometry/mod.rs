pub mod distance;
pub mod nearest;

pub use distance::{haversine_m, round_decimeters};
pub use nearest::nearest_station;
