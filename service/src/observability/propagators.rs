use hyper::HeaderMap;
use opentelemetry::propagation::Extractor;

/// Read-only view of request headers for pulling out a `traceparent`.
pub struct HyperHeaderExtractor<'a>(pub &'a HeaderMap);

impl Extractor for HyperHeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}
