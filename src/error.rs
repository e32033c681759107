//! Error types for restconf-path

use thiserror::Error;

use crate::restconf_types::{MediaType, StatusCode};

/// Main error type for api-path translation and request dispatch
#[derive(Debug, Error)]
pub enum RestconfError {
    /// The request URI or api-path could not be interpreted
    #[error("Malformed api-path: {0}")]
    MalformedPath(String),

    /// No module (or no namespace) is known for the given name
    #[error("Unknown module: {0}")]
    UnknownModule(String),

    /// The schema has no list with this path, so its keys cannot be bound
    #[error("Schema lookup failed for list: {0}")]
    SchemaMiss(String),

    /// Fewer comma-separated key values than the list declares
    #[error("List {list} expects {expected} key value(s), got {found}")]
    KeyCountMismatch {
        list: String,
        expected: usize,
        found: usize,
    },

    /// The request body is not a single well-formed XML element or JSON object
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Resource not found (maps to 404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Method not allowed (maps to 405)
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Unsupported body media type (maps to 415)
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Unknown query parameter or invalid parameter value
    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Result type alias for restconf-path operations
pub type Result<T> = std::result::Result<T, RestconfError>;

impl RestconfError {
    /// HTTP status the gateway answers with for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedPath(_)
            | Self::UnknownModule(_)
            | Self::SchemaMiss(_)
            | Self::KeyCountMismatch { .. }
            | Self::MalformedPayload(_)
            | Self::InvalidQuery(_)
            | Self::Json(_)
            | Self::Xml(_) => StatusCode::BadRequest,
            Self::NotFound(_) => StatusCode::NotFound,
            Self::MethodNotAllowed(_) => StatusCode::MethodNotAllowed,
            Self::UnsupportedMediaType(_) => StatusCode::UnsupportedMediaType,
            Self::Io(_) => StatusCode::InternalServerError,
        }
    }

    /// RFC 8040 section 7 error-tag
    pub fn error_tag(&self) -> &'static str {
        match self {
            Self::MalformedPath(_) | Self::SchemaMiss(_) | Self::InvalidQuery(_) => "invalid-value",
            Self::UnknownModule(_) => "unknown-namespace",
            Self::KeyCountMismatch { .. } => "missing-attribute",
            Self::MalformedPayload(_) | Self::Json(_) | Self::Xml(_) => "malformed-message",
            Self::NotFound(_) => "invalid-value",
            Self::MethodNotAllowed(_) => "operation-not-supported",
            Self::UnsupportedMediaType(_) => "invalid-value",
            Self::Io(_) => "operation-failed",
        }
    }

    /// True for failures caused by the client's input rather than the gateway
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    /// Render an `ietf-restconf:errors` body in the requested media type
    pub fn to_error_body(&self, media: MediaType) -> String {
        let message = self.to_string();
        match media {
            MediaType::Json => serde_json::json!({
                "ietf-restconf:errors": {
                    "error": [{
                        "error-type": "protocol",
                        "error-tag": self.error_tag(),
                        "error-message": message,
                    }]
                }
            })
            .to_string(),
            MediaType::Xml => format!(
                "<errors xmlns=\"urn:ietf:params:xml:ns:yang:ietf-restconf\">\
                 <error><error-type>protocol</error-type>\
                 <error-tag>{}</error-tag>\
                 <error-message>{}</error-message></error></errors>",
                self.error_tag(),
                quick_xml::escape::escape(message.as_str())
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_4xx() {
        let err = RestconfError::KeyCountMismatch {
            list: "route".into(),
            expected: 2,
            found: 1,
        };
        assert_eq!(err.status(), StatusCode::BadRequest);
        assert!(err.is_client_error());
        assert!(RestconfError::SchemaMiss("/a/b".into()).is_client_error());
        assert!(RestconfError::UnknownModule("x".into()).is_client_error());
    }

    #[test]
    fn test_lookup_miss_and_malformed_input_are_distinguishable() {
        let miss = RestconfError::SchemaMiss("/jukebox/library/artist".into());
        let malformed = RestconfError::MalformedPath("empty api-path".into());
        assert_ne!(miss.error_tag(), "");
        assert!(matches!(miss, RestconfError::SchemaMiss(_)));
        assert!(matches!(malformed, RestconfError::MalformedPath(_)));
    }

    #[test]
    fn test_json_error_body() {
        let err = RestconfError::NotFound("/restconf/nope".into());
        let body: serde_json::Value =
            serde_json::from_str(&err.to_error_body(MediaType::Json)).unwrap();
        let error = &body["ietf-restconf:errors"]["error"][0];
        assert_eq!(error["error-tag"], "invalid-value");
        assert_eq!(error["error-message"], "Resource not found: /restconf/nope");
    }

    #[test]
    fn test_xml_error_body_escapes_message() {
        let err = RestconfError::MalformedPath("a<b".into());
        let body = err.to_error_body(MediaType::Xml);
        assert!(body.contains("Malformed api-path: a&lt;b"));
        assert!(body.starts_with("<errors xmlns=\"urn:ietf:params:xml:ns:yang:ietf-restconf\">"));
    }
}
