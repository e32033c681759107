//! restconf-path - RESTCONF api-path translation
//!
//! This library turns RFC 8040 request URIs into what a NETCONF/YANG
//! datastore understands: XPath selectors for reads and deletes, and XML or
//! JSON edit documents for writes. List keys are bound to the comma-separated
//! values of the api-path through a YANG schema lookup.
//!
//! # Example
//!
//! ```
//! use restconf_path::{MediaType, PathTranslator, SchemaFile, WriteMethod};
//! use restconf_path::tokenize::split_pairs;
//!
//! let schema: SchemaFile = r#"{"modules": [{
//!     "module-name": "example-jukebox",
//!     "namespace": "http://example.com/ns/example-jukebox",
//!     "lists": {"/jukebox/library/artist": ["name"]}
//! }]}"#.parse().unwrap();
//! let translator = PathTranslator::new(&schema);
//!
//! let path = split_pairs(
//!     "/restconf/data/example-jukebox:jukebox/library/artist=Foo%20Fighters",
//!     '/',
//!     '=',
//! );
//! let xpath = translator.api_path_to_xpath(&path, 2).unwrap();
//! assert_eq!(xpath, "/example-jukebox:jukebox/library/artist[name='Foo Fighters']");
//!
//! let document = translator
//!     .api_path_to_document(&path, 2, "<album><name>Wasting Light</name></album>",
//!                           WriteMethod::Post, MediaType::Xml)
//!     .unwrap();
//! assert!(document.starts_with(r#"<jukebox xmlns="http://example.com/ns/example-jukebox">"#));
//! ```

pub mod buffer;
pub mod config;
mod error;
pub mod handler;
pub mod kv_vec;
mod payload;
pub mod restconf_types;
mod schema;
pub mod tokenize;
mod translate;

pub use buffer::TextBuffer;
pub use config::GatewayConfig;
pub use error::{RestconfError, Result};
pub use handler::{RequestHandler, Translation};
pub use kv_vec::{KeyValue, KeyValueVec, PathVec, QueryVec};
pub use restconf_types::MediaType;
pub use schema::{ModuleSchema, SchemaFile, SchemaLookup};
pub use translate::{PathTranslator, WriteMethod};
