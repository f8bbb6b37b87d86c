//! Transport envelopes the ingress binder reads from.

use std::collections::{BTreeMap, HashMap};

use http::HeaderMap;

/// Read access to the metadata of one inbound message.
///
/// Implemented for HTTP headers and for string maps of message properties
/// (queue or event-bus attributes). Names passed to [`get`](Self::get) are
/// the lowercase constants of [`ariadne_core::headers`].
pub trait Envelope {
    /// Returns the value stored under `name`, if present and textual.
    fn get(&self, name: &str) -> Option<&str>;
}

impl Envelope for HeaderMap {
    fn get(&self, name: &str) -> Option<&str> {
        HeaderMap::get(self, name).and_then(|value| value.to_str().ok())
    }
}

impl<B> Envelope for http::Request<B> {
    fn get(&self, name: &str) -> Option<&str> {
        Envelope::get(self.headers(), name)
    }
}

impl Envelope for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<&str> {
        HashMap::get(self, name)
            .or_else(|| {
                self.iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }
}

impl Envelope for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<&str> {
        BTreeMap::get(self, name)
            .or_else(|| {
                self.iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }
}
