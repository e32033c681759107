//! RESTCONF protocol types
//!
//! HTTP-side vocabulary for the gateway: methods, YANG media types, status
//! codes and the RFC 8040 query parameters. These abstractions keep the
//! library independent of any particular HTTP server.

use std::fmt;

use crate::error::{RestconfError, Result};
use crate::kv_vec::QueryVec;
use crate::tokenize::split_pairs;

/// YANG data media types (RFC 8040 section 11.3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// application/yang-data+xml
    Xml,
    /// application/yang-data+json
    Json,
}

impl MediaType {
    /// Parse a Content-Type or Accept header value.
    /// Parameters such as `; charset=utf-8` are ignored.
    pub fn from_header(value: &str) -> Option<Self> {
        let essence = value.split(';').next().unwrap_or("").trim();
        match essence {
            "application/yang-data+xml" | "application/xml" => Some(Self::Xml),
            "application/yang-data+json" | "application/json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Parse a configured encoding name ("xml" or "json")
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "xml" => Some(Self::Xml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// The header value for this media type
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xml => "application/yang-data+xml",
            Self::Json => "application/yang-data+json",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP methods accepted on RESTCONF resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Options,
    Head,
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Parse a request method name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "OPTIONS" => Some(Self::Options),
            "HEAD" => Some(Self::Head),
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// The method name as sent on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP status codes produced by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    // Success codes
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 204 No Content
    NoContent,

    // Client error codes
    /// 400 Bad Request
    BadRequest,
    /// 401 Unauthorized
    Unauthorized,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 406 Not Acceptable
    NotAcceptable,
    /// 409 Conflict
    Conflict,
    /// 412 Precondition Failed
    PreconditionFailed,
    /// 413 Payload Too Large
    PayloadTooLarge,
    /// 415 Unsupported Media Type
    UnsupportedMediaType,

    // Server error codes
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Numeric status code
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::NoContent => 204,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::NotAcceptable => 406,
            Self::Conflict => 409,
            Self::PreconditionFailed => 412,
            Self::PayloadTooLarge => 413,
            Self::UnsupportedMediaType => 415,
            Self::InternalServerError => 500,
            Self::NotImplemented => 501,
        }
    }

    /// Reason phrase for this status
    pub fn reason(self) -> &'static str {
        reason_phrase(self.as_u16()).unwrap_or("")
    }

    /// Check if this is a 2xx code
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.as_u16())
    }

    /// Check if this is a 4xx code
    pub fn is_client_error(self) -> bool {
        (400..500).contains(&self.as_u16())
    }

    /// Map a NETCONF `<error-tag>` to the HTTP status RFC 8040 section 7 assigns it
    pub fn from_error_tag(tag: &str) -> Self {
        match tag {
            "in-use" | "lock-denied" | "resource-denied" | "data-exists" | "data-missing" => {
                Self::Conflict
            }
            "too-big" => Self::PayloadTooLarge,
            "access-denied" => Self::Unauthorized,
            "rollback-failed" => Self::InternalServerError,
            "operation-not-supported" => Self::MethodNotAllowed,
            "operation-failed" => Self::PreconditionFailed,
            _ => Self::BadRequest,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason())
    }
}

/// RFC 7231 section 6.1 reason phrases
const REASON_PHRASES: &[(u16, &str)] = &[
    (100, "Continue"),
    (101, "Switching Protocols"),
    (200, "OK"),
    (201, "Created"),
    (202, "Accepted"),
    (203, "Non-Authoritative Information"),
    (204, "No Content"),
    (205, "Reset Content"),
    (206, "Partial Content"),
    (300, "Multiple Choices"),
    (301, "Moved Permanently"),
    (302, "Found"),
    (303, "See Other"),
    (304, "Not Modified"),
    (305, "Use Proxy"),
    (307, "Temporary Redirect"),
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (402, "Payment Required"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (405, "Method Not Allowed"),
    (406, "Not Acceptable"),
    (407, "Proxy Authentication Required"),
    (408, "Request Timeout"),
    (409, "Conflict"),
    (410, "Gone"),
    (411, "Length Required"),
    (412, "Precondition Failed"),
    (413, "Payload Too Large"),
    (414, "URI Too Long"),
    (415, "Unsupported Media Type"),
    (416, "Range Not Satisfiable"),
    (417, "Expectation Failed"),
    (426, "Upgrade Required"),
    (500, "Internal Server Error"),
    (501, "Not Implemented"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
    (505, "HTTP Version Not Supported"),
];

/// Reason phrase for a numeric HTTP status
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    REASON_PHRASES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, phrase)| *phrase)
}

/// Query parameter `content`
/// Controls which descendant nodes are returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentParam {
    /// Return all descendant data nodes
    #[default]
    All,
    /// Return only configuration data nodes
    Config,
    /// Return only non-configuration data nodes
    Nonconfig,
}

impl ContentParam {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "config" => Some(Self::Config),
            "nonconfig" => Some(Self::Nonconfig),
            _ => None,
        }
    }
}

/// Query parameter `depth`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthParam {
    #[default]
    Unbounded,
    /// Number of levels, 1..=65535
    Levels(u16),
}

impl DepthParam {
    pub fn parse(s: &str) -> Option<Self> {
        if s == "unbounded" {
            return Some(Self::Unbounded);
        }
        match s.parse::<u16>() {
            Ok(0) | Err(_) => None,
            Ok(n) => Some(Self::Levels(n)),
        }
    }
}

/// Query parameter `with-defaults` (RFC 6243 modes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithDefaultsParam {
    ReportAll,
    Trim,
    Explicit,
    ReportAllTagged,
}

impl WithDefaultsParam {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "report-all" => Some(Self::ReportAll),
            "trim" => Some(Self::Trim),
            "explicit" => Some(Self::Explicit),
            "report-all-tagged" => Some(Self::ReportAllTagged),
            _ => None,
        }
    }
}

/// Query parameter `insert`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertParam {
    First,
    Last,
    Before,
    After,
}

impl InsertParam {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "first" => Some(Self::First),
            "last" => Some(Self::Last),
            "before" => Some(Self::Before),
            "after" => Some(Self::After),
            _ => None,
        }
    }
}

/// Parsed RFC 8040 query parameters of a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub content: ContentParam,
    pub depth: DepthParam,
    pub with_defaults: Option<WithDefaultsParam>,
    pub fields: Option<String>,
    pub filter: Option<String>,
    pub insert: Option<InsertParam>,
    pub point: Option<String>,
}

impl QueryParams {
    /// Parse query parameters from a raw query string
    pub fn parse(query: &str) -> Result<Self> {
        Self::from_vec(&split_pairs(query, '&', '='))
    }

    /// Interpret an already-split query vector
    pub fn from_vec(vec: &QueryVec) -> Result<Self> {
        let mut params = Self::default();
        for entry in vec {
            let value = entry.value();
            let invalid = || RestconfError::InvalidQuery(entry.to_string());
            match entry.name() {
                "content" => params.content = ContentParam::parse(value).ok_or_else(invalid)?,
                "depth" => params.depth = DepthParam::parse(value).ok_or_else(invalid)?,
                "with-defaults" => {
                    params.with_defaults =
                        Some(WithDefaultsParam::parse(value).ok_or_else(invalid)?)
                }
                "insert" => params.insert = Some(InsertParam::parse(value).ok_or_else(invalid)?),
                "fields" => params.fields = Some(value.to_owned()),
                "filter" => params.filter = Some(value.to_owned()),
                "point" => params.point = Some(value.to_owned()),
                _ => return Err(invalid()),
            }
        }
        Ok(params)
    }
}

/// A RESTCONF request as handed over by the transport layer
#[derive(Debug, Clone)]
pub struct Request {
    /// The request method
    pub method: Method,
    /// Request URI path. A query string after `?` is accepted only when
    /// `query` is empty.
    pub uri: String,
    /// Raw query string (without the leading `?`)
    pub query: String,
    /// Accept header, if any
    pub accept: Option<String>,
    /// Content-Type header, if any
    pub content_type: Option<String>,
    /// Request body
    pub body: String,
}

impl Request {
    /// Create a new request
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            query: String::new(),
            accept: None,
            content_type: None,
            body: String::new(),
        }
    }

    /// Set the body and its content type
    pub fn with_body(mut self, body: impl Into<String>, format: MediaType) -> Self {
        self.body = body.into();
        self.content_type = Some(format.as_str().to_owned());
        self
    }

    /// Set the raw query string
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Set the Accept header
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }
}
