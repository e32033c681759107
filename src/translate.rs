//! api-path translation
//!
//! Turns a parsed api-path ([`PathVec`]) into either an XPath instance
//! selector, for reads and deletes, or a nested XML/JSON document wrapping
//! a write payload, for POST/PUT/PATCH. List segments (`artist=Foo`) are
//! bound to their schema key leaves through [`SchemaLookup`].
//!
//! Each call is a single left-to-right pass over the segments and keeps no
//! state afterwards, so one [`PathTranslator`] can serve concurrent requests.

use tracing::{debug, trace, warn};

use crate::buffer::{DEFAULT_CAPACITY, TextBuffer};
use crate::error::{RestconfError, Result};
use crate::kv_vec::{KeyValue, PathVec};
use crate::payload::{self, Resource};
use crate::restconf_types::MediaType;
use crate::schema::SchemaLookup;
use crate::tokenize::split_qualified;

/// The write method a document is being built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMethod {
    /// Create a child of the addressed resource; the payload is the new child
    Post,
    /// Replace the addressed resource; the payload is that resource
    Put,
    /// Merge into the addressed resource; the payload is that resource
    Patch,
}

impl WriteMethod {
    /// Whether the payload's outer node is the addressed resource itself
    pub fn targets_resource(self) -> bool {
        !matches!(self, Self::Post)
    }
}

/// Translates api-paths against a schema
pub struct PathTranslator<'s> {
    schema: &'s dyn SchemaLookup,
    buffer_capacity: usize,
}

impl std::fmt::Debug for PathTranslator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathTranslator")
            .field("buffer_capacity", &self.buffer_capacity)
            .finish_non_exhaustive()
    }
}

/// Resolves and caches list keys for the duration of one translation
struct KeyResolver<'s> {
    schema: &'s dyn SchemaLookup,
    module: Option<String>,
    cache: Vec<(String, Vec<String>)>,
}

impl<'s> KeyResolver<'s> {
    fn new(schema: &'s dyn SchemaLookup, module: Option<&str>) -> Self {
        Self {
            schema,
            module: module.map(str::to_owned),
            cache: Vec::new(),
        }
    }

    fn keys(&mut self, keypath: &str) -> Result<Vec<String>> {
        if let Some((_, keys)) = self.cache.iter().find(|(path, _)| path == keypath) {
            return Ok(keys.clone());
        }
        let module = self
            .module
            .as_deref()
            .ok_or_else(|| RestconfError::UnknownModule(keypath.to_owned()))?;
        let Some(keys) = self.schema.list_keys(module, keypath) else {
            if self.schema.namespace(module).is_none() {
                return Err(RestconfError::UnknownModule(module.to_owned()));
            }
            return Err(RestconfError::SchemaMiss(keypath.to_owned()));
        };
        trace!(module, keypath, ?keys, "resolved list keys");
        self.cache.push((keypath.to_owned(), keys.clone()));
        Ok(keys)
    }
}

/// Pair each declared key with its comma-separated component, in order.
/// Missing components are an error; surplus ones are ignored.
fn bind_keys<'k, 'v>(
    segment: &KeyValue,
    keys: &'k [String],
    value: &'v str,
) -> Result<Vec<(&'k str, &'v str)>> {
    let components: Vec<&str> = value.split(',').collect();
    if components.len() < keys.len() {
        return Err(RestconfError::KeyCountMismatch {
            list: segment.name().to_owned(),
            expected: keys.len(),
            found: components.len(),
        });
    }
    if components.len() > keys.len() {
        warn!(
            list = segment.name(),
            expected = keys.len(),
            found = components.len(),
            "ignoring surplus key values"
        );
    }
    Ok(keys
        .iter()
        .map(String::as_str)
        .zip(components)
        .collect())
}

/// XPath string literal for `value`
fn xpath_literal(value: &str) -> Result<String> {
    match (value.contains('\''), value.contains('"')) {
        (false, _) => Ok(format!("'{}'", value)),
        (true, false) => Ok(format!("\"{}\"", value)),
        (true, true) => Err(RestconfError::MalformedPath(format!(
            "key value cannot be quoted in XPath: {}",
            value
        ))),
    }
}

/// YANG identifier: `[A-Za-z_][A-Za-z0-9_.-]*`
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// `identifier` or `module:identifier`
fn is_node_name(name: &str) -> bool {
    match split_qualified(name) {
        (Some(prefix), local) => is_identifier(prefix) && is_identifier(local),
        (None, local) => is_identifier(local),
    }
}

fn segments(path: &PathVec, offset: usize) -> Result<Vec<&KeyValue>> {
    let segments: Vec<&KeyValue> = path.iter().skip(offset).collect();
    if segments.is_empty() {
        return Err(RestconfError::MalformedPath("empty api-path".into()));
    }
    if let Some(bad) = segments.iter().find(|s| !is_node_name(s.name())) {
        return Err(RestconfError::MalformedPath(format!(
            "invalid node name: {:?}",
            bad.name()
        )));
    }
    Ok(segments)
}

/// Module of the last module-qualified segment
fn innermost_module<'a>(segments: &[&'a KeyValue], module: &'a str) -> &'a str {
    segments
        .iter()
        .rev()
        .find_map(|s| split_qualified(s.name()).0)
        .unwrap_or(module)
}

/// Check that a PUT/PATCH payload wraps the resource the path addresses
fn check_wrapper(resource: &Resource<'_>, segments: &[&KeyValue], module: &str) -> Result<()> {
    let target = segments[segments.len() - 1].name();
    let (_, expected) = split_qualified(target);
    let expected_module = innermost_module(segments, module);
    match split_qualified(&resource.name) {
        (prefix, local) if local == expected && prefix.is_none_or(|p| p == expected_module) => {
            Ok(())
        }
        _ => Err(RestconfError::MalformedPayload(format!(
            "payload carries {} but the path addresses {}",
            resource.name, target
        ))),
    }
}

/// Whether the payload already carries list key `key`.
/// A payload value that differs from the path's is an error.
fn payload_has_key(resource: Option<&Resource<'_>>, key: &str, value: &str) -> Result<bool> {
    match resource.and_then(|r| r.leaf(key)) {
        None => Ok(false),
        Some(carried) if carried == value => Ok(true),
        Some(carried) => Err(RestconfError::MalformedPayload(format!(
            "key {} is {:?} in the payload but {:?} in the path",
            key, carried, value
        ))),
    }
}

/// Closing token for a construct opened in a JSON document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closer {
    /// `{ ... }`
    Object,
    /// `[{ ... }]`, one list entry
    ListEntry,
}

impl Closer {
    fn token(self) -> &'static str {
        match self {
            Self::Object => "}",
            Self::ListEntry => "}]",
        }
    }
}

/// JSON document under construction
struct JsonDoc {
    out: TextBuffer,
    closers: Vec<Closer>,
    has_members: bool,
}

impl JsonDoc {
    fn new(capacity: usize) -> Self {
        let mut out = TextBuffer::with_capacity(capacity);
        out.append_char('{');
        Self {
            out,
            closers: vec![Closer::Object],
            has_members: false,
        }
    }

    fn begin_member(&mut self, name: &str) -> Result<()> {
        if self.has_members {
            self.out.append_str(", ");
        }
        self.has_members = true;
        self.out.append_str(&serde_json::to_string(name)?);
        self.out.append_str(": ");
        Ok(())
    }

    fn open(&mut self, name: &str, closer: Closer) -> Result<()> {
        self.begin_member(name)?;
        self.out.append_str(match closer {
            Closer::Object => "{",
            Closer::ListEntry => "[{",
        });
        self.closers.push(closer);
        self.has_members = false;
        Ok(())
    }

    fn leaf(&mut self, name: &str, value: &str) -> Result<()> {
        self.begin_member(name)?;
        self.out.append_str(&serde_json::to_string(value)?);
        Ok(())
    }

    fn raw_members(&mut self, members: &str) {
        if members.is_empty() {
            return;
        }
        if self.has_members {
            self.out.append_str(", ");
        }
        self.has_members = true;
        self.out.append_str(members);
    }

    fn finish(mut self) -> String {
        while let Some(closer) = self.closers.pop() {
            self.out.append_str(closer.token());
        }
        self.out.into_string()
    }
}

impl<'s> PathTranslator<'s> {
    /// Create a translator backed by `schema`
    pub fn new(schema: &'s dyn SchemaLookup) -> Self {
        Self {
            schema,
            buffer_capacity: DEFAULT_CAPACITY,
        }
    }

    /// Set the initial capacity of the buffers each translation allocates
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Translate the api-path starting at `offset` into an XPath selector.
    ///
    /// `ietf-interfaces:interfaces/interface=eth0`, with `name` as the key
    /// of `interface`, yields
    /// `/ietf-interfaces:interfaces/interface[name='eth0']`.
    pub fn api_path_to_xpath(&self, path: &PathVec, offset: usize) -> Result<String> {
        let segments = segments(path, offset)?;
        let (module, _) = split_qualified(segments[0].name());
        debug!(?module, segments = segments.len(), "api-path to xpath");

        let mut resolver = KeyResolver::new(self.schema, module);
        let mut xpath = TextBuffer::with_capacity(self.buffer_capacity);
        let mut keypath = TextBuffer::with_capacity(self.buffer_capacity);

        for segment in &segments {
            let name = segment.name();
            keypath.append_fmt(format_args!("/{}", split_qualified(name).1));
            xpath.append_fmt(format_args!("/{}", name));

            if segment.has_value() {
                let keys = resolver.keys(keypath.as_str())?;
                for (key, component) in bind_keys(segment, &keys, segment.value())? {
                    xpath.append_fmt(format_args!("[{}={}]", key, xpath_literal(component)?));
                }
            }
            trace!(segment = %segment, xpath = xpath.as_str(), "xpath segment");
        }

        Ok(xpath.into_string())
    }

    /// Build the document a write to the api-path at `offset` submits.
    ///
    /// The document nests one level per path segment and splices `payload`
    /// at the innermost level. For [`WriteMethod::Put`] and
    /// [`WriteMethod::Patch`] the payload's outer node must name the final
    /// segment and is removed first. Keys of the final segment are emitted
    /// only when the payload lacks them; a payload key that differs from the
    /// path is a [`RestconfError::MalformedPayload`].
    pub fn api_path_to_document(
        &self,
        path: &PathVec,
        offset: usize,
        payload: &str,
        method: WriteMethod,
        encoding: MediaType,
    ) -> Result<String> {
        let segments = segments(path, offset)?;
        let first = segments[0].name();
        let (module, _) = split_qualified(first);
        let module = module.ok_or_else(|| RestconfError::UnknownModule(first.to_owned()))?;
        debug!(module, ?method, %encoding, segments = segments.len(), "api-path to document");

        match encoding {
            MediaType::Xml => self.xml_document(&segments, module, payload, method),
            MediaType::Json => self.json_document(&segments, module, payload, method),
        }
    }

    fn namespace(&self, module: &str) -> Result<String> {
        self.schema
            .namespace(module)
            .ok_or_else(|| RestconfError::UnknownModule(module.to_owned()))
    }

    fn xml_document(
        &self,
        segments: &[&KeyValue],
        module: &str,
        payload: &str,
        method: WriteMethod,
    ) -> Result<String> {
        let resource = if method.targets_resource() {
            let resource = payload::xml_resource(payload)?;
            check_wrapper(&resource, segments, module)?;
            Some(resource)
        } else {
            None
        };
        let body = match &resource {
            Some(resource) => resource.body.as_ref(),
            None => payload::xml_element(payload)?,
        };
        trace!(body, "stripped payload");

        let mut resolver = KeyResolver::new(self.schema, Some(module));
        let mut cxml = TextBuffer::with_capacity(self.buffer_capacity);
        let mut keypath = TextBuffer::with_capacity(self.buffer_capacity);
        let mut current_module = module;
        let last = segments.len() - 1;

        for (i, segment) in segments.iter().enumerate() {
            let (prefix, local) = split_qualified(segment.name());
            keypath.append_fmt(format_args!("/{}", local));

            match prefix {
                _ if i == 0 => {
                    let ns = self.namespace(module)?;
                    cxml.append_fmt(format_args!(
                        "<{} xmlns=\"{}\">",
                        local,
                        quick_xml::escape::escape(ns.as_str())
                    ));
                }
                Some(p) if p != current_module => {
                    let ns = self.namespace(p)?;
                    cxml.append_fmt(format_args!(
                        "<{} xmlns=\"{}\">",
                        local,
                        quick_xml::escape::escape(ns.as_str())
                    ));
                    current_module = p;
                }
                _ => cxml.append_fmt(format_args!("<{}>", local)),
            }

            if segment.has_value() {
                let carried = if i == last { resource.as_ref() } else { None };
                let keys = resolver.keys(keypath.as_str())?;
                for (key, component) in bind_keys(segment, &keys, segment.value())? {
                    if payload_has_key(carried, key, component)? {
                        trace!(key, "key carried by payload");
                        continue;
                    }
                    cxml.append_fmt(format_args!(
                        "<{key}>{}</{key}>",
                        quick_xml::escape::escape(component)
                    ));
                }
            }
        }

        cxml.append_str(body);
        for segment in segments.iter().rev() {
            cxml.append_fmt(format_args!("</{}>", split_qualified(segment.name()).1));
        }
        Ok(cxml.into_string())
    }

    fn json_document(
        &self,
        segments: &[&KeyValue],
        module: &str,
        payload: &str,
        method: WriteMethod,
    ) -> Result<String> {
        let (body, resource) = if method.targets_resource() {
            let resource = payload::json_resource(payload)?;
            check_wrapper(&resource, segments, module)?;
            (resource.body.to_string(), Some(resource))
        } else {
            let innermost = innermost_module(segments, module);
            (payload::json_members(payload, Some(innermost))?, None)
        };
        trace!(body = body.as_str(), "stripped payload");

        // Fail on an unknown module before emitting anything.
        self.namespace(module)?;

        let mut resolver = KeyResolver::new(self.schema, Some(module));
        let mut doc = JsonDoc::new(self.buffer_capacity);
        let mut keypath = TextBuffer::with_capacity(self.buffer_capacity);
        let last = segments.len() - 1;

        for (i, segment) in segments.iter().enumerate() {
            let name = segment.name();
            keypath.append_fmt(format_args!("/{}", split_qualified(name).1));

            if !segment.has_value() {
                doc.open(name, Closer::Object)?;
                continue;
            }
            doc.open(name, Closer::ListEntry)?;
            let carried = if i == last { resource.as_ref() } else { None };
            let keys = resolver.keys(keypath.as_str())?;
            for (key, component) in bind_keys(segment, &keys, segment.value())? {
                if payload_has_key(carried, key, component)? {
                    trace!(key, "key carried by payload");
                    continue;
                }
                doc.leaf(key, component)?;
            }
        }

        doc.raw_members(&body);
        Ok(doc.finish())
    }
}
