pub mod overpass;

pub use overpass::{
    Element, Endpoint, FetchError, HttpEndpoint, OverpassResponse, build_query,
    fetch_with_fallback,
};
