//! Integration tests using an embedded schema
//!
//! Requests go through the public handler API the way a server front end
//! would drive it, from raw URI to selector or edit document.

use std::io::Write;

use restconf_path::handler::{EditOperation, Translation};
use restconf_path::restconf_types::{DepthParam, Method, Request, StatusCode};
use restconf_path::tokenize::split_pairs;
use restconf_path::{
    GatewayConfig, MediaType, PathTranslator, RequestHandler, RestconfError, SchemaFile,
    WriteMethod,
};

const SAMPLE_SCHEMA: &str = r#"{
    "modules": [
        {
            "module-name": "example-jukebox",
            "namespace": "http://example.com/ns/example-jukebox",
            "lists": {
                "/jukebox/library/artist": ["name"],
                "/jukebox/library/artist/album": ["name"],
                "/jukebox/playlist": ["name"],
                "/jukebox/playlist/song": ["index"]
            }
        },
        {
            "module-name": "example-routing",
            "namespace": "urn:example:routing",
            "lists": {
                "/routing/route": ["destination", "prefix-length"]
            }
        }
    ]
}"#;

fn schema() -> SchemaFile {
    SAMPLE_SCHEMA.parse().expect("Failed to parse schema")
}

fn select(handler: &RequestHandler<'_>, request: &Request) -> String {
    match handler.handle(request).expect("Failed to translate") {
        Translation::Select { xpath, .. } => xpath,
        other => panic!("expected a selector, got {:?}", other),
    }
}

fn edit(handler: &RequestHandler<'_>, request: &Request) -> (EditOperation, String) {
    match handler.handle(request).expect("Failed to translate") {
        Translation::Edit {
            operation,
            document,
            ..
        } => (operation, document),
        other => panic!("expected an edit, got {:?}", other),
    }
}

#[test]
fn test_get_nested_lists() {
    let schema = schema();
    let handler = RequestHandler::new(GatewayConfig::default(), &schema);

    let request = Request::new(
        Method::Get,
        "/restconf/data/example-jukebox:jukebox/library/artist=Foo%20Fighters/album=Wasting%20Light/year",
    );
    assert_eq!(
        select(&handler, &request),
        "/example-jukebox:jukebox/library/artist[name='Foo Fighters']/album[name='Wasting Light']/year"
    );
}

#[test]
fn test_get_multi_key_list_with_query() {
    let schema = schema();
    let handler = RequestHandler::new(GatewayConfig::default(), &schema);

    let request = Request::new(
        Method::Get,
        "/restconf/data/example-routing:routing/route=10.0.0.0,24",
    )
    .with_query("depth=3&with-defaults=report-all");

    match handler.handle(&request).unwrap() {
        Translation::Select { xpath, query, .. } => {
            assert_eq!(
                xpath,
                "/example-routing:routing/route[destination='10.0.0.0'][prefix-length='24']"
            );
            assert_eq!(query.depth, DepthParam::Levels(3));
            assert!(query.with_defaults.is_some());
        }
        other => panic!("expected a selector, got {:?}", other),
    }
}

#[test]
fn test_head_and_delete_select() {
    let schema = schema();
    let handler = RequestHandler::new(GatewayConfig::default(), &schema);
    let uri = "/restconf/data/example-jukebox:jukebox/playlist=Road%20Trip/song=1";

    for method in [Method::Head, Method::Delete] {
        match handler.handle(&Request::new(method, uri)).unwrap() {
            Translation::Select {
                method: selected,
                xpath,
                ..
            } => {
                assert_eq!(selected, method);
                assert_eq!(
                    xpath,
                    "/example-jukebox:jukebox/playlist[name='Road Trip']/song[index='1']"
                );
            }
            other => panic!("expected a selector, got {:?}", other),
        }
    }
}

#[test]
fn test_put_xml_album() {
    let schema = schema();
    let handler = RequestHandler::new(GatewayConfig::default(), &schema);

    let request = Request::new(
        Method::Put,
        "/restconf/data/example-jukebox:jukebox/library/artist=Foo%20Fighters/album=Wasting%20Light",
    )
    .with_body(
        r#"<album xmlns="http://example.com/ns/example-jukebox"><name>Wasting Light</name><year>2011</year></album>"#,
        MediaType::Xml,
    );

    let (operation, document) = edit(&handler, &request);
    assert_eq!(operation, EditOperation::Replace);
    assert_eq!(
        document,
        "<jukebox xmlns=\"http://example.com/ns/example-jukebox\"><library><artist>\
         <name>Foo Fighters</name><album><name>Wasting Light</name><year>2011</year>\
         </album></artist></library></jukebox>"
    );
    assert_eq!(document.matches("<name>Wasting Light</name>").count(), 1);
}

#[test]
fn test_post_json_playlist_song() {
    let schema = schema();
    let handler = RequestHandler::new(GatewayConfig::default(), &schema);

    let request = Request::new(
        Method::Post,
        "/restconf/data/example-jukebox:jukebox/playlist=Road%20Trip",
    )
    .with_body(
        r#"{"example-jukebox:song": [{"index": 1, "id": "/example-jukebox:jukebox/library/artist[name='Foo Fighters']"}]}"#,
        MediaType::Json,
    );

    let (operation, document) = edit(&handler, &request);
    assert_eq!(operation, EditOperation::Create);

    let value: serde_json::Value = serde_json::from_str(&document).unwrap();
    let playlist = &value["example-jukebox:jukebox"]["playlist"][0];
    assert_eq!(playlist["name"], "Road Trip");
    assert_eq!(playlist["song"][0]["index"], 1);
}

#[test]
fn test_patch_datastore_root_passes_body_through() {
    let schema = schema();
    let handler = RequestHandler::new(GatewayConfig::default(), &schema);
    let body = r#"{"example-jukebox:jukebox": {"library": {}}}"#;

    let request = Request::new(Method::Patch, "/restconf/data").with_body(body, MediaType::Json);
    let (operation, document) = edit(&handler, &request);
    assert_eq!(operation, EditOperation::Merge);
    assert_eq!(document, body);
}

#[test]
fn test_translator_direct() {
    let schema = schema();
    let translator = PathTranslator::new(&schema).with_buffer_capacity(8);
    let path = split_pairs("example-routing:routing/route=192.0.2.0,24", '/', '=');

    assert_eq!(
        translator.api_path_to_xpath(&path, 0).unwrap(),
        "/example-routing:routing/route[destination='192.0.2.0'][prefix-length='24']"
    );
    let document = translator
        .api_path_to_document(
            &path,
            0,
            "<route><metric>10</metric></route>",
            WriteMethod::Patch,
            MediaType::Xml,
        )
        .unwrap();
    assert_eq!(
        document,
        "<routing xmlns=\"urn:example:routing\"><route><destination>192.0.2.0</destination>\
         <prefix-length>24</prefix-length><metric>10</metric></route></routing>"
    );
}

#[test]
fn test_put_rejects_payload_for_other_resource() {
    let schema = schema();
    let handler = RequestHandler::new(GatewayConfig::default(), &schema);
    let uri = "/restconf/data/example-jukebox:jukebox/library/artist=Foo%20Fighters";

    for body in [
        r#"{"example-jukebox:artist": [{"name": "Nirvana"}]}"#,
        r#"{"example-jukebox:album": {"name": "Foo Fighters"}}"#,
    ] {
        let request = Request::new(Method::Put, uri).with_body(body, MediaType::Json);
        let err = handler.handle(&request).unwrap_err();
        assert!(matches!(err, RestconfError::MalformedPayload(_)), "{}", body);
        assert_eq!(err.status(), StatusCode::BadRequest);
    }
}

#[test]
fn test_delete_rejects_selector_injection() {
    let schema = schema();
    let handler = RequestHandler::new(GatewayConfig::default(), &schema);

    let err = handler
        .handle(&Request::new(
            Method::Delete,
            "/restconf/data/example-jukebox:jukebox/library|*",
        ))
        .unwrap_err();
    assert!(matches!(err, RestconfError::MalformedPath(_)));
}

#[test]
fn test_client_errors() {
    let schema = schema();
    let handler = RequestHandler::new(GatewayConfig::default(), &schema);

    let cases = [
        (
            Request::new(Method::Get, "/restconf/data/example-routing:routing/route=10.0.0.0"),
            StatusCode::BadRequest,
        ),
        (
            Request::new(Method::Get, "/restconf/data/nope:thing/item=1"),
            StatusCode::BadRequest,
        ),
        (
            Request::new(Method::Get, "/restconf/data/example-jukebox:jukebox").with_query("bogus=1"),
            StatusCode::BadRequest,
        ),
        (
            Request::new(Method::Get, "/api/data/example-jukebox:jukebox"),
            StatusCode::NotFound,
        ),
        (
            Request::new(Method::Put, "/restconf/operations/example-jukebox:play"),
            StatusCode::MethodNotAllowed,
        ),
    ];

    for (request, status) in cases {
        let err = handler.handle(&request).unwrap_err();
        assert_eq!(err.status(), status, "{} {}", request.method, request.uri);
        let reply = handler.error_reply(&request, &err);
        let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert!(body["ietf-restconf:errors"]["error"][0]["error-tag"].is_string());
    }
}

#[test]
fn test_unknown_module_reported() {
    let schema = schema();
    let handler = RequestHandler::new(GatewayConfig::default(), &schema);

    let err = handler
        .handle(&Request::new(Method::Get, "/restconf/data/nope:thing/item=1"))
        .unwrap_err();
    assert!(matches!(err, RestconfError::UnknownModule(ref m) if m == "nope"));
}

#[test]
fn test_config_and_schema_from_files() {
    let mut schema_file = tempfile::NamedTempFile::new().unwrap();
    schema_file.write_all(SAMPLE_SCHEMA.as_bytes()).unwrap();
    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    config_file
        .write_all(br#"{"api-root": "rc", "default-encoding": "xml"}"#)
        .unwrap();

    let schema = SchemaFile::from_file(schema_file.path()).unwrap();
    let config = GatewayConfig::from_file(config_file.path()).unwrap();
    let handler = RequestHandler::new(config, &schema);

    match handler
        .handle(&Request::new(Method::Get, "/rc/data/example-jukebox:jukebox/library"))
        .unwrap()
    {
        Translation::Select { xpath, encoding, .. } => {
            assert_eq!(xpath, "/example-jukebox:jukebox/library");
            assert_eq!(encoding, MediaType::Xml);
        }
        other => panic!("expected a selector, got {:?}", other),
    }
    assert!(handler
        .handle(&Request::new(Method::Get, "/restconf/data"))
        .is_err());
}
