use serde::Deserialize;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;
use thiserror::Error;

use crate::config::OverpassConfig;
use crate::domain::MetroLine;

const USER_AGENT: &str = "mrt-amenities/0.1.0";

const AMENITY_TAGS: &str =
    "restaurant|cafe|fast_food|food_court|cinema|theatre|arts_centre|nightclub|community_centre";
const TOURISM_TAGS: &str = "museum|gallery|attraction|theme_park|viewpoint";
const LEISURE_TAGS: &str = "bowling_alley|amusement_arcade|water_park";

/// Raw Overpass API response
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    pub elements: Vec<Element>,
    /// Set by the server when the query hit a runtime error (timeout, memory)
    #[serde(default)]
    pub remark: Option<String>,
}

impl OverpassResponse {
    /// Reject responses carrying a server remark; their elements are partial
    pub fn into_complete(self) -> Result<Self, FetchError> {
        match self.remark {
            Some(remark) => Err(FetchError::Remark(remark)),
            None => Ok(self),
        }
    }
}

/// Centroid reported for ways and relations by `out center`
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

/// A single element from Overpass (node, way or relation)
#[derive(Debug, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: u64,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<Center>,
}

impl Element {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.as_ref()?.get(key).map(String::as_str)
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("server returned status {0}")]
    Status(u16),
    #[error("failed to parse response: {0}")]
    Parse(#[source] reqwest::Error),
    #[error("server reported: {0}")]
    Remark(String),
    #[error("no Overpass endpoints configured")]
    NoEndpoints,
    #[error("could not fetch data from any endpoint ({})", .0.join("; "))]
    AllFailed(Vec<String>),
}

/// Build the station + amenity query for a metro line
///
/// Stations are matched by name against the line's alternation, then every
/// node/way/relation with an interesting amenity, tourism or leisure tag within
/// `radius_m` of any station is returned alongside the stations themselves.
pub fn build_query(line: &MetroLine, radius_m: u32, timeout_secs: u64) -> String {
    let names = line.station_pattern();

    format!(
        r#"[out:json][timeout:{timeout}];
(
  node["railway"~"station|halt"]["name"~"{names}"];
  way["railway"~"station|halt"]["name"~"{names}"];
)->.stations;
(
  nwr(around.stations:{radius})["amenity"~"{amenity}"];
  nwr(around.stations:{radius})["tourism"~"{tourism}"];
  nwr(around.stations:{radius})["leisure"~"{leisure}"];
)->.pois;
(.stations; .pois;);
out center;"#,
        timeout = timeout_secs,
        names = names,
        radius = radius_m,
        amenity = AMENITY_TAGS,
        tourism = TOURISM_TAGS,
        leisure = LEISURE_TAGS,
    )
}

/// Something that can answer an Overpass query
pub trait Endpoint {
    fn name(&self) -> &str;
    fn query(&self, query: &str) -> Result<OverpassResponse, FetchError>;
}

/// An Overpass interpreter reachable over HTTP
pub struct HttpEndpoint {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpEndpoint {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self::with_client(url, client))
    }

    pub fn with_client(url: impl Into<String>, client: reqwest::blocking::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// One endpoint per configured mirror URL
    pub fn from_config(config: &OverpassConfig) -> Result<Vec<Self>, FetchError> {
        config
            .urls
            .iter()
            .map(|url| Self::new(url.clone(), config.client_timeout()))
            .collect()
    }
}

impl Endpoint for HttpEndpoint {
    fn name(&self) -> &str {
        &self.url
    }

    fn query(&self, query: &str) -> Result<OverpassResponse, FetchError> {
        // Overpass expects form-encoded POST data: data=<query>
        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query)])
            .send()
            .map_err(FetchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: OverpassResponse = response.json().map_err(FetchError::Parse)?;
        body.into_complete()
    }
}

/// Try each endpoint in order and return the first successful response
///
/// After a failure the fetcher sleeps `delay` before moving on to the next
/// endpoint. There is no second pass over the list.
pub fn fetch_with_fallback<E: Endpoint>(
    endpoints: &[E],
    query: &str,
    delay: Duration,
) -> Result<OverpassResponse, FetchError> {
    if endpoints.is_empty() {
        return Err(FetchError::NoEndpoints);
    }

    let mut failures = Vec::new();

    for (i, endpoint) in endpoints.iter().enumerate() {
        match endpoint.query(query) {
            Ok(response) => return Ok(response),
            Err(e) => {
                eprintln!("Server {} busy or unreachable: {}", endpoint.name(), e);
                failures.push(format!("{}: {}", endpoint.name(), e));
                if i + 1 < endpoints.len() {
                    thread::sleep(delay);
                }
            }
        }
    }

    Err(FetchError::AllFailed(failures))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::time::Instant;

    struct FakeEndpoint {
        name: String,
        succeed: bool,
        calls: Cell<u32>,
    }

    impl FakeEndpoint {
        fn new(name: &str, succeed: bool) -> Self {
            Self {
                name: name.to_string(),
                succeed,
                calls: Cell::new(0),
            }
        }
    }

    impl Endpoint for FakeEndpoint {
        fn name(&self) -> &str {
            &self.name
        }

        fn query(&self, _query: &str) -> Result<OverpassResponse, FetchError> {
            self.calls.set(self.calls.get() + 1);
            if self.succeed {
                Ok(serde_json::from_str(r#"{"elements": [{"type": "node", "id": 7}]}"#).unwrap())
            } else {
                Err(FetchError::Status(504))
            }
        }
    }

    #[test]
    fn test_build_query() {
        let line = MetroLine::new("Test Line", vec!["Alpha".into(), "Beta".into()]);
        let query = build_query(&line, 500, 180);

        assert!(query.starts_with("[out:json][timeout:180];"));
        assert!(query.contains(r#"node["railway"~"station|halt"]["name"~"Alpha|Beta"];"#));
        assert!(query.contains(r#"way["railway"~"station|halt"]["name"~"Alpha|Beta"];"#));
        assert!(query.contains("nwr(around.stations:500)[\"amenity\"~\"restaurant|cafe"));
        assert!(query.contains("[\"tourism\"~\"museum|gallery|attraction|theme_park|viewpoint\"]"));
        assert!(query.contains("[\"leisure\"~\"bowling_alley|amusement_arcade|water_park\"]"));
        assert!(query.trim_end().ends_with("out center;"));
    }

    #[test]
    fn test_fallback_uses_first_success() {
        let endpoints = vec![
            FakeEndpoint::new("down", false),
            FakeEndpoint::new("up", true),
            FakeEndpoint::new("spare", true),
        ];

        let response = fetch_with_fallback(&endpoints, "q", Duration::ZERO).unwrap();
        assert_eq!(response.elements.len(), 1);
        assert_eq!(endpoints[0].calls.get(), 1);
        assert_eq!(endpoints[1].calls.get(), 1);
        assert_eq!(endpoints[2].calls.get(), 0);
    }

    #[test]
    fn test_fallback_all_fail() {
        let endpoints = vec![FakeEndpoint::new("a", false), FakeEndpoint::new("b", false)];

        match fetch_with_fallback(&endpoints, "q", Duration::ZERO) {
            Err(FetchError::AllFailed(failures)) => {
                assert_eq!(failures.len(), 2);
                assert!(failures[0].starts_with("a:"));
            }
            other => panic!("expected AllFailed, got {:?}", other.map(|r| r.elements.len())),
        }
    }

    #[test]
    fn test_fallback_no_endpoints() {
        let endpoints: Vec<FakeEndpoint> = Vec::new();
        assert!(matches!(
            fetch_with_fallback(&endpoints, "q", Duration::ZERO),
            Err(FetchError::NoEndpoints)
        ));
    }

    #[test]
    fn test_parse_overpass_response() {
        let json = r#"{
            "elements": [
                {"type": "node", "id": 1, "lat": 3.14, "lon": 101.69,
                 "tags": {"railway": "station", "name": "Pasar Seni"}},
                {"type": "way", "id": 2, "center": {"lat": 3.15, "lon": 101.70},
                 "tags": {"amenity": "cafe"}}
            ]
        }"#;

        let response: OverpassResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.elements.len(), 2);
        assert_eq!(response.elements[0].tag("railway"), Some("station"));
        assert_eq!(response.elements[1].type_, "way");
        assert_eq!(
            response.elements[1].center,
            Some(Center {
                lat: 3.15,
                lon: 101.70
            })
        );
        assert_eq!(response.elements[1].tag("name"), None);
    }

    #[test]
    fn test_remark_rejects_partial_response() {
        let json = r#"{
            "elements": [{"type": "node", "id": 1, "lat": 3.14, "lon": 101.69}],
            "remark": "runtime error: Query timed out after 180 seconds."
        }"#;

        let response: OverpassResponse = serde_json::from_str(json).unwrap();
        match response.into_complete() {
            Err(FetchError::Remark(remark)) => assert!(remark.starts_with("runtime error")),
            other => panic!("expected Remark, got {:?}", other.map(|r| r.elements.len())),
        }

        let response: OverpassResponse = serde_json::from_str(r#"{"elements": []}"#).unwrap();
        assert!(response.into_complete().is_ok());
    }

    #[test]
    fn test_fallback_delay_only_between_attempts() {
        let endpoints = vec![
            FakeEndpoint::new("a", false),
            FakeEndpoint::new("b", false),
            FakeEndpoint::new("c", false),
        ];
        let delay = Duration::from_millis(200);

        let start = Instant::now();
        assert!(fetch_with_fallback(&endpoints, "q", delay).is_err());
        let elapsed = start.elapsed();

        assert!(elapsed >= delay * 2, "elapsed {:?}", elapsed);
        assert!(elapsed < delay * 3, "elapsed {:?}", elapsed);
    }

    /// Read one HTTP request (headers plus Content-Length body)
    fn read_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len {
                    return;
                }
            }
        }
    }

    /// Serve a single canned reply on a local port, returning its URL
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            read_request(&mut stream);
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(reply.as_bytes()).unwrap();
        });

        format!("http://{}/api/interpreter", addr)
    }

    fn local_endpoint(url: String) -> HttpEndpoint {
        let client = reqwest::blocking::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpEndpoint::with_client(url, client)
    }

    #[test]
    fn test_http_endpoint_success() {
        let url = serve_once(
            "200 OK",
            r#"{"elements": [{"type": "node", "id": 1, "lat": 3.1, "lon": 101.7}]}"#,
        );
        let response = local_endpoint(url).query("q").unwrap();
        assert_eq!(response.elements.len(), 1);
    }

    #[test]
    fn test_http_endpoint_error_status() {
        let url = serve_once("504 Gateway Timeout", "");
        assert!(matches!(
            local_endpoint(url).query("q"),
            Err(FetchError::Status(504))
        ));
    }

    #[test]
    fn test_http_endpoint_unparseable_body() {
        let url = serve_once("200 OK", "<html>rate limited</html>");
        assert!(matches!(
            local_endpoint(url).query("q"),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_http_endpoint_runtime_error_remark() {
        let url = serve_once(
            "200 OK",
            r#"{"elements": [], "remark": "runtime error: Query timed out after 180 seconds."}"#,
        );
        assert!(matches!(
            local_endpoint(url).query("q"),
            Err(FetchError::Remark(_))
        ));
    }

    #[test]
    fn test_http_endpoint_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = local_endpoint(format!("http://{}/api/interpreter", addr));
        assert!(matches!(endpoint.query("q"), Err(FetchError::Request(_))));
    }

    #[test]
    fn test_fallback_moves_past_remark_to_mirror() {
        let endpoints = vec![
            local_endpoint(serve_once(
                "200 OK",
                r#"{"elements": [], "remark": "runtime error: out of memory"}"#,
            )),
            local_endpoint(serve_once(
                "200 OK",
                r#"{"elements": [{"type": "node", "id": 2, "lat": 3.0, "lon": 101.0}]}"#,
            )),
        ];

        let response = fetch_with_fallback(&endpoints, "q", Duration::ZERO).unwrap();
        assert_eq!(response.elements.len(), 1);
        assert_eq!(response.elements[0].id, 2);
    }
}
