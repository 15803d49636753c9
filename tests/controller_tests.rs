#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Tests for controllers declared through the builder API
//!
//! # Test Coverage
//!
//! - One descriptor per recorded binding, in append order
//! - Snapshot timing of payload declarations
//! - Raw base-path concatenation
//! - Class-level default auth and per-route overrides
//! - Determinism across instances and threads
//! - `RouteProvider` as a trait object
//! - Extension verbs and option keys naming typed slots

use std::sync::Arc;
use std::thread;

use controller_routes::{
    AuthMode, AuthSettings, AuthStrategy, BasePathPolicy, Controller, ControllerDef,
    ControllerHandle, HandlerRequest, HandlerResponse, MetadataError, PayloadOptions, PayloadSpec,
    RouteOptions, RouteProvider, RouteVerb, RoutesConfig, ValidateOptions,
};
use http::Method;
use serde_json::json;

struct Uploads {
    owner: String,
}

impl Uploads {
    fn list(&self, _req: HandlerRequest) -> HandlerResponse {
        HandlerResponse::ok_json(json!({ "owner": self.owner }))
    }

    fn store(&self, req: HandlerRequest) -> HandlerResponse {
        HandlerResponse::json(201, req.body.unwrap_or_default())
    }

    fn chunk(&self, _req: HandlerRequest) -> HandlerResponse {
        HandlerResponse::ok_json(json!("chunk"))
    }

    fn not_a_route(&self, _req: HandlerRequest) -> HandlerResponse {
        HandlerResponse::error(500, "helper")
    }
}

impl Controller for Uploads {
    fn declare(def: &mut ControllerDef<'_, Self>) -> Result<(), MetadataError> {
        def.base_path("/basePath")?;
        def.method("list", Self::list).get("/test");
        def.method("store", Self::store)
            .payload(PayloadSpec::Multipart)
            .post("/test2");
        def.method("chunk", Self::chunk)
            .payload(PayloadOptions::new().max_bytes(1_000_000))
            .put("/test3")
            .payload(PayloadOptions::new().max_bytes(500))
            .patch("/test3")
            .payload(PayloadSpec::Multipart)
            .options("/test3");
        def.method("not_a_route", Self::not_a_route);
        Ok(())
    }
}

fn uploads(owner: &str) -> ControllerHandle<Uploads> {
    Uploads {
        owner: owner.to_string(),
    }
    .mount()
    .unwrap()
}

#[test]
fn test_one_descriptor_per_binding_in_order() {
    let routes = uploads("a").routes();
    let summary: Vec<_> = routes
        .iter()
        .map(|r| (r.method.as_str(), r.path.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("GET", "/basePath/test"),
            ("POST", "/basePath/test2"),
            ("PUT", "/basePath/test3"),
            ("PATCH", "/basePath/test3"),
            ("OPTIONS", "/basePath/test3"),
        ]
    );
}

#[test]
fn test_plain_get_has_empty_options() {
    let routes = uploads("a").routes();
    assert!(routes[0].options.is_empty());
    assert_eq!(routes[0].options.to_value(), json!({}));
}

#[test]
fn test_multipart_marker() {
    let routes = uploads("a").routes();
    assert_eq!(routes[1].options.to_value(), json!({"payload": {"multipart": true}}));
}

#[test]
fn test_payload_snapshots_keep_their_own_limit() {
    let routes = uploads("a").routes();
    let limits: Vec<_> = routes[2..]
        .iter()
        .map(|r| r.options.payload.as_ref().and_then(PayloadOptions::get_max_bytes))
        .collect();
    assert_eq!(limits, vec![Some(1_000_000), Some(500), None]);
    assert!(routes[4].options.is_multipart());
}

#[test]
fn test_handlers_see_their_instance() {
    let routes = uploads("alice").routes();
    let response = routes[0].call(HandlerRequest::new(Method::GET, "/basePath/test"));
    assert_eq!(response.body, json!({"owner": "alice"}));

    let response = routes[1].call(
        HandlerRequest::new(Method::POST, "/basePath/test2").with_body(json!({"file": "x"})),
    );
    assert_eq!(response.status, 201);
    assert_eq!(response.body, json!({"file": "x"}));
}

#[test]
fn test_instances_are_structurally_identical() {
    let a: Vec<_> = uploads("a").routes().iter().map(|r| r.to_value()).collect();
    let b: Vec<_> = uploads("b").routes().iter().map(|r| r.to_value()).collect();
    assert_eq!(a, b);
}

#[test]
fn test_concurrent_resolution() {
    let handle = uploads("shared");
    let expected: Vec<_> = handle.routes().iter().map(|r| r.to_value()).collect();
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let handle = handle.clone();
            thread::spawn(move || {
                handle
                    .routes()
                    .iter()
                    .map(|r| r.to_value())
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    for worker in workers {
        assert_eq!(worker.join().unwrap(), expected);
    }
}

#[test]
fn test_route_provider_trait_object() {
    let providers: Vec<Box<dyn RouteProvider>> = vec![Box::new(uploads("a"))];
    let total: usize = providers.iter().map(|p| p.routes().len()).sum();
    assert_eq!(total, 5);
}

struct Joined;

impl Joined {
    fn run(&self, _req: HandlerRequest) -> HandlerResponse {
        HandlerResponse::ok_json(json!(null))
    }
}

impl Controller for Joined {
    fn declare(def: &mut ControllerDef<'_, Self>) -> Result<(), MetadataError> {
        def.base_path("/a")?;
        def.method("run", Self::run)
            .get("/b")
            .get("b")
            .route(RouteVerb::Any, "");
        Ok(())
    }
}

#[test]
fn test_paths_are_not_normalized() {
    let routes = Joined.mount().unwrap().routes();
    let paths: Vec<_> = routes.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["/a/b", "/ab", "/a"]);
    assert_eq!(routes[2].method, "*");
}

struct Secured;

impl Secured {
    fn open(&self, _req: HandlerRequest) -> HandlerResponse {
        HandlerResponse::ok_json(json!("open"))
    }

    fn admin(&self, _req: HandlerRequest) -> HandlerResponse {
        HandlerResponse::ok_json(json!("admin"))
    }
}

impl Controller for Secured {
    fn declare(def: &mut ControllerDef<'_, Self>) -> Result<(), MetadataError> {
        def.base_path("/secure")?;
        def.default_auth("session");
        def.method("open", Self::open)
            .get("/me")
            .route_with(RouteVerb::GET, "/public", RouteOptions::new().with_auth(false));
        def.method("admin", Self::admin)
            .auth(
                AuthSettings::strategies(["jwt"])
                    .mode(AuthMode::Required)
                    .scope(["admin"]),
            )
            .validate(ValidateOptions::new().with("headers", true))
            .option("description", "Admin only")
            .delete("/users/{id}");
        Ok(())
    }
}

#[test]
fn test_class_default_auth_is_overridable() {
    let routes = Secured.mount().unwrap().routes();
    assert_eq!(routes[0].options.to_value(), json!({"auth": "session"}));
    assert_eq!(routes[1].options.to_value(), json!({"auth": false}));
    assert_eq!(
        routes[2].to_value(),
        json!({
            "method": "DELETE",
            "path": "/secure/users/{id}",
            "options": {
                "auth": {"strategies": ["jwt"], "mode": "required", "scope": ["admin"]},
                "validate": {"headers": true},
                "description": "Admin only"
            }
        })
    );
}

struct DoubleBase;

impl Controller for DoubleBase {
    fn declare(def: &mut ControllerDef<'_, Self>) -> Result<(), MetadataError> {
        def.base_path("/one")?.base_path("/two")?;
        Ok(())
    }
}

#[test]
fn test_reject_policy_surfaces_redefinition() {
    let config = RoutesConfig {
        base_path_policy: BasePathPolicy::Reject,
        ..RoutesConfig::default()
    };
    let err = ControllerHandle::with_config(DoubleBase, &config).unwrap_err();
    assert!(matches!(err, MetadataError::BasePathRedefined { .. }));
    assert!(err.to_string().contains("'/one'"));

    let handle = ControllerHandle::with_config(DoubleBase, &RoutesConfig::default()).unwrap();
    assert_eq!(handle.base_path(), "/two");
    assert!(handle.routes().is_empty());
}

#[test]
fn test_shared_handles_reuse_blueprint() {
    let first = uploads("a");
    let second = ControllerHandle::from_arc(Arc::new(Uploads {
        owner: "b".into(),
    }))
    .unwrap();
    assert!(Arc::ptr_eq(first.blueprint(), second.blueprint()));
}

struct Cache;

impl Cache {
    fn run(&self, _req: HandlerRequest) -> HandlerResponse {
        HandlerResponse::ok_json(json!("purged"))
    }

    fn lookup(&self, _req: HandlerRequest) -> HandlerResponse {
        HandlerResponse::ok_json(json!("hit"))
    }
}

impl Controller for Cache {
    fn declare(def: &mut ControllerDef<'_, Self>) -> Result<(), MetadataError> {
        def.base_path("/cache")?;
        def.default_auth("session");
        def.method("run", Self::run)
            .route(RouteVerb::from(Method::from_bytes(b"purge").unwrap()), "/x")
            .route(RouteVerb::Method(Method::from_bytes(b"Ban").unwrap()), "/x");
        def.method("lookup", Self::lookup)
            .option("auth", false)
            .option("payload", json!({"multipart": true}))
            .option("validate", json!({"query": true}))
            .option("description", "cache lookup")
            .get("/y");
        Ok(())
    }
}

#[test]
fn test_extension_verbs_are_uppercase() {
    let routes = Cache.mount().unwrap().routes();
    let methods: Vec<_> = routes.iter().map(|r| r.method.as_str()).collect();
    assert_eq!(methods, vec!["PURGE", "BAN", "GET"]);
}

#[test]
fn test_option_keys_for_typed_slots() {
    let routes = Cache.mount().unwrap().routes();
    let lookup = &routes[2];
    assert_eq!(lookup.options.auth, Some(AuthStrategy::disabled()));
    assert!(lookup.options.is_multipart());

    let text = serde_json::to_string(&lookup.options).unwrap();
    assert_eq!(text.matches("\"auth\"").count(), 1);
    assert_eq!(
        lookup.to_value()["options"],
        json!({
            "auth": false,
            "payload": {"multipart": true},
            "validate": {"query": true},
            "description": "cache lookup"
        })
    );
}
