//! Integration tests for the mapping engine
//!
//! Tests the full end-to-end flow: mapping/action YAML → compile → resolve → validated payloads

use mapkit::action::{Action, CachedField, ExecuteInput};
use mapkit::cache::RequestContext;
use mapkit::loader::{load_action, load_action_from_str, parse_events};
use mapkit::mapping::{CompileOptions, Mapping, ResolveOptions};
use mapkit::schema::{resolve_field, FieldSchema};
use mapkit::{resolve_mapping, resolve_mapping_with, resolve_path, Error};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::NamedTempFile;

fn page_event() -> Value {
    json!({
        "type": "page",
        "name": "Home",
        "userId": "user-1234",
        "anonymousId": null,
        "properties": {
            "title": "",
            "products": [{"price": 100, "sku": "P-1"}, {"price": 250, "sku": "P-2"}]
        },
        "context": {"page": {"url": "https://example.com/?q=1"}}
    })
}

// ============================================================================
// Core Property Tests
// ============================================================================

#[test]
fn test_resolution_is_pure_and_deterministic() {
    let mapping = json!({
        "title": {"@template": "Page: {{ name }}"},
        "first": {"@path": "$.properties.products[0]"},
        "skus": {"@arrayPath": ["$.properties.products", {"sku": {"@path": "$.sku"}}]}
    });
    let event = page_event();
    let before = event.clone();

    let first = resolve_mapping(&mapping, &event).unwrap();
    let second = resolve_mapping(&mapping, &event).unwrap();

    assert_eq!(first, second);
    assert_eq!(event, before);
}

#[test]
fn test_missing_paths_are_absent() {
    let event = page_event();
    for path in [
        "$.nope",
        "$.properties.nope.deeper",
        "$.properties.products[9].price",
        "$.name.length",
        "$.anonymousId.id",
    ] {
        assert_eq!(resolve_path(&event, path), None, "path {path}");
    }
}

#[test]
fn test_if_existence_semantics() {
    let event = page_event();
    let mapping = |test: &str| {
        json!({"@if": {
            "exists": {"@path": test},
            "then": "yes",
            "else": "no"
        }})
    };

    assert_eq!(resolve_mapping(&mapping("$.userId"), &event).unwrap(), Some(json!("yes")));
    // Empty string exists
    assert_eq!(
        resolve_mapping(&mapping("$.properties.title"), &event).unwrap(),
        Some(json!("yes"))
    );
    assert_eq!(resolve_mapping(&mapping("$.anonymousId"), &event).unwrap(), Some(json!("no")));
    assert_eq!(resolve_mapping(&mapping("$.missing"), &event).unwrap(), Some(json!("no")));

    let no_else = json!({"@if": {"exists": {"@path": "$.missing"}, "then": "yes"}});
    assert_eq!(resolve_mapping(&no_else, &event).unwrap(), None);
}

#[test]
fn test_template_substitution() {
    assert_eq!(
        resolve_mapping(&json!({"@template": "Viewed {{name}}"}), &json!({"name": "Home"})).unwrap(),
        Some(json!("Viewed Home"))
    );
    assert_eq!(
        resolve_mapping(&json!({"@template": "Viewed {{missing}}!"}), &json!({})).unwrap(),
        Some(json!("Viewed !"))
    );
}

#[test]
fn test_array_element_wise() {
    let mapping = json!([{"@path": "$.a"}, {"@path": "$.b"}]);
    assert_eq!(
        resolve_mapping(&mapping, &json!({"a": 1, "b": 2})).unwrap(),
        Some(json!([1, 2]))
    );
}

#[test]
fn test_non_directive_object_recursion() {
    let mapping = json!({"x": {"@path": "$.a"}, "y": 5});
    assert_eq!(
        resolve_mapping(&mapping, &json!({"a": 1})).unwrap(),
        Some(json!({"x": 1, "y": 5}))
    );

    let siblings = json!({"@path": "$.a", "note": {"@path": "$.a"}});
    assert_eq!(
        resolve_mapping(&siblings, &json!({"a": 1})).unwrap(),
        Some(json!({"@path": "$.a", "note": 1}))
    );
}

#[test]
fn test_default_fallback() {
    let field = FieldSchema::string().with_default(json!({"@path": "$.event"}));
    let event = json!({"event": "Order Completed"});
    assert_eq!(
        resolve_field(&field, None, &event).unwrap(),
        Some(json!("Order Completed"))
    );
}

#[test]
fn test_end_to_end_fixtures() {
    assert_eq!(
        resolve_mapping(&json!({"@template": "Page: {{ name }}"}), &json!({"name": "Home"})).unwrap(),
        Some(json!("Page: Home"))
    );
    assert_eq!(
        resolve_mapping(
            &json!({"@path": "$.properties.products.0.price"}),
            &json!({"properties": {"products": [{"price": 100}]}})
        )
        .unwrap(),
        Some(json!(100))
    );
}

#[test]
fn test_compiled_mapping_shared_across_threads() {
    let mapping = Arc::new(
        Mapping::compile(&json!({"id": {"@path": "$.id"}, "label": {"@template": "#{{ id }}"}}))
            .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let mapping = Arc::clone(&mapping);
            thread::spawn(move || mapping.resolve(&json!({"id": i})))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(
            handle.join().unwrap(),
            Some(json!({"id": i, "label": format!("#{i}")}))
        );
    }
}

#[test]
fn test_options_together() {
    let mapping = json!({"@template": "{{ a }}", "@extra": 1});
    let event = json!({"a": "<x>"});

    let err = resolve_mapping_with(
        &mapping,
        &event,
        &CompileOptions::strict(),
        &ResolveOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::MalformedDirective { .. }));

    let escaped = resolve_mapping_with(
        &json!({"@template": "{{ a }} {{{ a }}}"}),
        &event,
        &CompileOptions::default(),
        &ResolveOptions::escape_html(),
    )
    .unwrap();
    assert_eq!(escaped, Some(json!("&lt;x&gt; <x>")));
}

#[test]
fn test_malformed_directives_collected() {
    let mapping = json!({
        "a": {"@path": 1},
        "b": [{"@if": {"then": 1}}],
        "c": {"@arrayPath": "nope"}
    });
    let err = Mapping::compile(&mapping).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Invalid mapping: "));
    assert!(message.contains("/a/@path should be a string or a mapping directive"));
    assert!(message.contains("/b/0/@if should have field \"exists\" or \"blank\""));
    assert!(message.contains("/c/@arrayPath should be an array but it is a string"));
}

// ============================================================================
// Action Pipeline Tests
// ============================================================================

const IDENTIFY_ACTION: &str = r#"
name: identifyUser
title: Identify User
defaultSubscription: type = "identify"
fields:
  user_id:
    type: string
    required: true
    default:
      "@if":
        exists: { "@path": "$.userId" }
        then: { "@path": "$.userId" }
        else: { "@path": "$.anonymousId" }
  email:
    type: string
    allowNull: true
    default: { "@path": "$.traits.email" }
  age:
    type: integer
    default: { "@path": "$.traits.age" }
  created_at:
    type: datetime
    default: { "@path": "$.traits.createdAt" }
  address:
    type: object
    default: { "@path": "$.traits.address" }
    properties:
      city:
        type: string
      zip:
        type: string
"#;

#[test]
fn test_action_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(IDENTIFY_ACTION.as_bytes()).unwrap();

    let action = Action::new(load_action(file.path()).unwrap()).unwrap();
    let event = json!({
        "type": "identify",
        "anonymousId": "anon-7",
        "traits": {
            "email": null,
            "age": "42",
            "createdAt": "2024-03-01T12:00:00Z",
            "address": {"city": "Lisbon", "zip": 1100, "country": "PT"}
        }
    });

    let payload = action.map_input(&event, None).unwrap();
    assert_eq!(
        Value::Object(payload),
        json!({
            "user_id": "anon-7",
            "email": null,
            "age": 42,
            "created_at": "2024-03-01T12:00:00Z",
            "address": {"city": "Lisbon", "zip": "1100"}
        })
    );
}

#[test]
fn test_action_batch_with_partial_failures() {
    let action = Action::new(load_action_from_str(IDENTIFY_ACTION).unwrap()).unwrap();
    let events = parse_events(
        r#"{"userId": "u1", "traits": {"age": 30}}
{"traits": {"age": 30}}
{"userId": "u3", "traits": {"createdAt": "yesterday-ish"}}
{"userId": "u4"}
"#,
    )
    .unwrap();

    let report = action.map_batch(&events, None).unwrap();
    assert_eq!(report.items.len(), 4);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(
        report.payloads(),
        vec![&json!({"user_id": "u1", "age": 30}), &json!({"user_id": "u4"})]
    );
    assert!(report.items.iter().all(|item| !matches!(
        item,
        mapkit::ItemResult::Failure { retryable: true, .. }
    )));
}

#[test]
fn test_action_execute_with_cached_field() {
    let definition = load_action_from_str(IDENTIFY_ACTION).unwrap();
    let action = Action::new(definition).unwrap().with_cached_field(CachedField::new(
        "profile_url",
        Duration::from_secs(300),
        |input: &ExecuteInput| input.payload["user_id"].as_str().unwrap_or_default().to_string(),
        |input: &ExecuteInput| {
            let base = input.settings["baseUrl"].as_str().unwrap_or_default();
            Ok(Some(json!(format!("{base}/users/{}", input.payload["user_id"].as_str().unwrap_or_default()))))
        },
    ));

    let ctx = RequestContext::new(json!({"baseUrl": "https://crm.example.com"}));
    let input = action.execute(&json!({"userId": "u9"}), None, &ctx).unwrap();

    assert_eq!(
        input.cached_fields["profile_url"],
        "https://crm.example.com/users/u9"
    );
    assert_eq!(ctx.cache().len(), 1);
}
