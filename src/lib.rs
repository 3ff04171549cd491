//! mrt-amenities - Points of interest around metro stations from OpenStreetMap data

pub mod api;
pub mod config;
pub mod domain;
pub mod geometry;
pub mod osm;
pub mod output;
pub mod pipeline;
