//! RESTCONF request dispatch
//!
//! Server-agnostic routing of RESTCONF requests to the path translator.
//! The handler turns a [`Request`] into a [`Translation`]: the selector or
//! edit document the datastore layer executes. Executing it, and building
//! the NETCONF operation around it, is left to the caller.

use tracing::debug;

use crate::config::GatewayConfig;
use crate::error::{RestconfError, Result};
use crate::kv_vec::PathVec;
use crate::restconf_types::{MediaType, Method, QueryParams, Request, StatusCode};
use crate::schema::SchemaLookup;
use crate::tokenize::split_pairs;
use crate::translate::{PathTranslator, WriteMethod};

/// Methods allowed on the data resource
pub const DATA_METHODS: &[Method] = &[
    Method::Options,
    Method::Head,
    Method::Get,
    Method::Post,
    Method::Put,
    Method::Patch,
    Method::Delete,
];

/// Edit operation requested by a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOperation {
    /// POST: the resource must not exist yet
    Create,
    /// PUT: create or replace the resource
    Replace,
    /// PATCH: merge into the resource
    Merge,
}

/// What a request translates to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// The API root resource (`/restconf`)
    ApiRoot { encoding: MediaType },
    /// The `yang-library-version` leaf
    YangLibraryVersion { encoding: MediaType },
    /// Allowed methods for an OPTIONS request
    Options { allow: &'static [Method] },
    /// GET, HEAD or DELETE of the data nodes selected by `xpath`
    Select {
        method: Method,
        xpath: String,
        query: QueryParams,
        encoding: MediaType,
    },
    /// POST, PUT or PATCH of `document`
    Edit {
        operation: EditOperation,
        document: String,
        /// Encoding of `document`
        format: MediaType,
        query: QueryParams,
        encoding: MediaType,
    },
    /// List of the operations the server supports
    ListOperations { encoding: MediaType },
    /// Invocation of the RPC named `rpc` (`module:name`)
    Rpc {
        rpc: String,
        input: String,
        format: MediaType,
        encoding: MediaType,
    },
}

/// An error rendered for the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReply {
    pub status: StatusCode,
    pub media_type: MediaType,
    pub body: String,
}

/// Main RESTCONF request handler
///
/// # Example
/// ```
/// use restconf_path::{GatewayConfig, RequestHandler, SchemaFile};
/// use restconf_path::handler::Translation;
/// use restconf_path::restconf_types::{Method, Request};
///
/// let schema: SchemaFile = r#"{"modules": [{
///     "module-name": "ietf-interfaces",
///     "namespace": "urn:ietf:params:xml:ns:yang:ietf-interfaces",
///     "lists": {"/interfaces/interface": ["name"]}
/// }]}"#.parse().unwrap();
/// let handler = RequestHandler::new(GatewayConfig::default(), &schema);
///
/// let request = Request::new(
///     Method::Get,
///     "/restconf/data/ietf-interfaces:interfaces/interface=eth0",
/// );
/// match handler.handle(&request).unwrap() {
///     Translation::Select { xpath, .. } => {
///         assert_eq!(xpath, "/ietf-interfaces:interfaces/interface[name='eth0']")
///     }
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
#[derive(Debug)]
pub struct RequestHandler<'s> {
    config: GatewayConfig,
    translator: PathTranslator<'s>,
}

impl<'s> RequestHandler<'s> {
    /// Create a handler translating against `schema`
    pub fn new(config: GatewayConfig, schema: &'s dyn SchemaLookup) -> Self {
        let translator = PathTranslator::new(schema).with_buffer_capacity(config.buffer_capacity);
        Self { config, translator }
    }

    /// Get the configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Get the path translator
    pub fn translator(&self) -> &PathTranslator<'s> {
        &self.translator
    }

    /// Translate an incoming RESTCONF request
    pub fn handle(&self, request: &Request) -> Result<Translation> {
        debug!(method = %request.method, uri = request.uri.as_str(), "handling request");

        let (uri, query) = match request.uri.split_once('?') {
            None => (request.uri.as_str(), request.query.as_str()),
            Some((uri, query)) if request.query.is_empty() => (uri, query),
            Some(_) => {
                return Err(RestconfError::MalformedPath(format!(
                    "query string given both in the URI and separately: {}",
                    request.uri
                )));
            }
        };
        if !uri.starts_with('/') {
            return Err(RestconfError::NotFound(request.uri.clone()));
        }
        let path = split_pairs(uri, '/', '=');
        match path.get(0) {
            Some(root) if root.name() == self.config.api_root && !root.has_value() => {}
            _ => return Err(RestconfError::NotFound(request.uri.clone())),
        }

        let encoding = self.response_encoding(request);
        let Some(resource) = path.get(1) else {
            return match request.method {
                Method::Get | Method::Head => Ok(Translation::ApiRoot { encoding }),
                Method::Options => Ok(Translation::Options {
                    allow: &[Method::Options, Method::Head, Method::Get],
                }),
                other => Err(RestconfError::MethodNotAllowed(other.to_string())),
            };
        };

        match resource.name() {
            name if name == self.config.data_resource => {
                self.handle_data(request, &path, query, encoding)
            }
            name if name == self.config.operations_resource => {
                self.handle_operations(request, &path, encoding)
            }
            "yang-library-version" if path.len() == 2 => match request.method {
                Method::Get | Method::Head => Ok(Translation::YangLibraryVersion { encoding }),
                other => Err(RestconfError::MethodNotAllowed(other.to_string())),
            },
            _ => Err(RestconfError::NotFound(request.uri.clone())),
        }
    }

    /// Render `err` as an `ietf-restconf:errors` reply in the encoding the client accepts
    pub fn error_reply(&self, request: &Request, err: &RestconfError) -> ErrorReply {
        let media_type = self.response_encoding(request);
        ErrorReply {
            status: err.status(),
            media_type,
            body: err.to_error_body(media_type),
        }
    }

    /// Handle the data resource: `{+restconf}/data[/api-path]`
    fn handle_data(
        &self,
        request: &Request,
        path: &PathVec,
        query: &str,
        encoding: MediaType,
    ) -> Result<Translation> {
        let offset = self.config.path_offset();
        let at_datastore = path.len() <= offset;

        match request.method {
            Method::Options => Ok(Translation::Options {
                allow: DATA_METHODS,
            }),
            Method::Delete if at_datastore => Err(RestconfError::MethodNotAllowed(
                "DELETE on the datastore resource".into(),
            )),
            method @ (Method::Get | Method::Head | Method::Delete) => {
                let query = QueryParams::parse(query)?;
                let xpath = if at_datastore {
                    "/".to_owned()
                } else {
                    self.translator.api_path_to_xpath(path, offset)?
                };
                debug!(%method, xpath = xpath.as_str(), "translated selector");
                Ok(Translation::Select {
                    method,
                    xpath,
                    query,
                    encoding,
                })
            }
            method @ (Method::Post | Method::Put | Method::Patch) => {
                let query = QueryParams::parse(query)?;
                let format = self.body_encoding(request)?;
                if request.body.trim().is_empty() {
                    return Err(RestconfError::MalformedPayload("empty request body".into()));
                }
                let (write, operation) = match method {
                    Method::Post => (WriteMethod::Post, EditOperation::Create),
                    Method::Put => (WriteMethod::Put, EditOperation::Replace),
                    _ => (WriteMethod::Patch, EditOperation::Merge),
                };
                let document = if at_datastore {
                    request.body.clone()
                } else {
                    self.translator
                        .api_path_to_document(path, offset, &request.body, write, format)?
                };
                debug!(%method, ?operation, %format, "translated edit document");
                Ok(Translation::Edit {
                    operation,
                    document,
                    format,
                    query,
                    encoding,
                })
            }
        }
    }

    /// Handle the operations resource: `{+restconf}/operations[/module:rpc]`
    fn handle_operations(
        &self,
        request: &Request,
        path: &PathVec,
        encoding: MediaType,
    ) -> Result<Translation> {
        match (request.method, path.get(2), path.len()) {
            (Method::Get | Method::Head, None, _) => Ok(Translation::ListOperations { encoding }),
            (Method::Options, _, _) => Ok(Translation::Options {
                allow: &[Method::Options, Method::Head, Method::Get, Method::Post],
            }),
            (Method::Post, Some(rpc), 3) if !rpc.has_value() && rpc.name().contains(':') => {
                Ok(Translation::Rpc {
                    rpc: rpc.name().to_owned(),
                    input: request.body.clone(),
                    format: self.body_encoding(request)?,
                    encoding,
                })
            }
            (Method::Post, _, _) => Err(RestconfError::NotFound(request.uri.clone())),
            (other, _, _) => Err(RestconfError::MethodNotAllowed(other.to_string())),
        }
    }

    /// Encoding for the reply, from the Accept header
    fn response_encoding(&self, request: &Request) -> MediaType {
        let default = self.config.default_media_type().unwrap_or(MediaType::Json);
        request
            .accept
            .as_deref()
            .and_then(|accept| accept.split(',').find_map(MediaType::from_header))
            .unwrap_or(default)
    }

    /// Encoding of the request body, from the Content-Type header
    fn body_encoding(&self, request: &Request) -> Result<MediaType> {
        match request.content_type.as_deref() {
            None => self.config.default_media_type(),
            Some(value) => MediaType::from_header(value)
                .ok_or_else(|| RestconfError::UnsupportedMediaType(value.to_owned())),
        }
    }
}
