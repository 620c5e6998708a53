use http::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use tracing::debug;

/// Collect gateway headers into lowercase name -> values
///
/// Values that are not valid UTF-8 are skipped.
pub fn headers_to_map(headers: &HeaderMap) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();

    for (name, value) in headers.iter() {
        match value.to_str() {
            Ok(val) => map
                .entry(name.as_str().to_ascii_lowercase())
                .or_default()
                .push(val.to_string()),
            Err(_) => debug!("Skipping non-UTF8 value for header {}", name),
        }
    }

    map
}

/// Convert response headers back into a [`HeaderMap`]
///
/// Names or values the `http` crate rejects are dropped.
pub fn map_to_headers(map: &HashMap<String, Vec<String>>) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (name, values) in map.iter() {
        let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) else {
            debug!("Dropping invalid header name {:?}", name);
            continue;
        };
        for value in values {
            if let Ok(header_value) = HeaderValue::from_str(value) {
                headers.append(header_name.clone(), header_value);
            }
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_to_map() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("authorization", "Bearer token123".parse().unwrap());
        headers.insert("accept", "text/html".parse().unwrap());
        headers.append("accept", "application/json".parse().unwrap());

        let map = headers_to_map(&headers);
        assert_eq!(map.len(), 3);
        assert_eq!(map["authorization"], vec!["Bearer token123"]);
        assert_eq!(map["accept"], vec!["text/html", "application/json"]);
    }

    #[test]
    fn test_headers_to_map_skips_non_utf8() {
        let mut headers = HeaderMap::new();
        headers.insert("x-binary-header", HeaderValue::from_bytes(&[0xFF, 0xFE]).unwrap());
        headers.insert("x-helper-signature", "abc".parse().unwrap());

        let map = headers_to_map(&headers);
        assert!(!map.contains_key("x-binary-header"));
        assert_eq!(map["x-helper-signature"], vec!["abc"]);
    }

    #[test]
    fn test_map_to_headers() {
        let map = HashMap::from([
            ("content-type".to_string(), vec!["application/json".to_string()]),
            ("access-control-allow-origin".to_string(), vec!["*".to_string()]),
            ("invalid header".to_string(), vec!["value".to_string()]),
            ("x-bad-value".to_string(), vec!["a\nb".to_string()]),
        ]);

        let headers = map_to_headers(&map);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
    }
}
