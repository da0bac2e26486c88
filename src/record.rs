//! Transaction record types.
//!
//! A transaction record is one recorded HTTP exchange: the request that was
//! sent, the response that came back, and a free-form `meta` object describing
//! where the exchange was observed.

use serde::{Deserialize, Serialize};

/// Opaque metadata object attached to every record.
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// A name/value pair. Used for both headers and query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Case-insensitive header name comparison.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Query parameters share the header shape.
pub type Parameter = Header;

/// Target of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Url {
    pub host: String,
    pub path: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub url: Url,
    #[serde(default)]
    pub headers: Vec<Header>,
    pub method: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: String,
}

/// One synthetic request/response pair plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub request: Request,
    pub response: Response,
    #[serde(default)]
    pub meta: Meta,
}

/// Returns true if the headers declare a JSON body.
pub fn declares_json(headers: &[Header]) -> bool {
    headers
        .iter()
        .filter(|h| h.is("content-type"))
        .any(|h| is_json_content_type(&h.value))
}

/// Matches `application/json` and `+json` structured suffixes, ignoring parameters.
pub fn is_json_content_type(value: &str) -> bool {
    let mime = value
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}
