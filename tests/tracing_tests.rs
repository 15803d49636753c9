#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Tests for the diagnostics emitted during declaration and resolution

mod common;

use common::log_capture::capture;
use controller_routes::{
    Controller, ControllerDef, ControllerHandle, HandlerRequest, HandlerResponse, MetadataError,
    PayloadSpec, RoutesConfig,
};
use serde_json::json;

struct Traced;

impl Traced {
    fn upload(&self, _req: HandlerRequest) -> HandlerResponse {
        HandlerResponse::ok_json(json!(null))
    }
}

impl Controller for Traced {
    fn declare(def: &mut ControllerDef<'_, Self>) -> Result<(), MetadataError> {
        def.base_path("/old")?;
        def.base_path("/basePath")?;
        def.method("upload", Self::upload)
            .get("/test")
            .payload(PayloadSpec::Multipart)
            .post("/test2");
        Ok(())
    }
}

#[test]
fn test_one_line_per_resolved_route() {
    let handle = ControllerHandle::with_config(Traced, &RoutesConfig::default()).unwrap();
    let (routes, logs) = capture(|| handle.routes());
    assert_eq!(routes.len(), 2);

    let lines: Vec<_> = logs.lines().filter(|l| l.contains("Route resolved")).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("method=GET"));
    assert!(lines[0].contains("path=/basePath/test"));
    assert!(lines[0].contains("multipart=false"));
    assert!(lines[1].contains("method=POST"));
    assert!(lines[1].contains("multipart=true"));
}

#[test]
fn test_route_trace_can_be_disabled() {
    let config = RoutesConfig {
        trace_routes: false,
        ..RoutesConfig::default()
    };
    let handle = ControllerHandle::with_config(Traced, &config).unwrap();
    let (_, logs) = capture(|| handle.routes());
    assert!(!logs.contains("Route resolved"));
}

#[test]
fn test_base_path_overwrite_warns() {
    let (handle, logs) =
        capture(|| ControllerHandle::with_config(Traced, &RoutesConfig::default()).unwrap());
    assert_eq!(handle.base_path(), "/basePath");
    assert!(logs.contains("WARN"));
    assert!(logs.contains("previous=/old"));
}

#[test]
fn test_declaration_is_logged() {
    let (_, logs) =
        capture(|| ControllerHandle::with_config(Traced, &RoutesConfig::default()).unwrap());
    assert!(logs.contains("Controller declared"));
    assert!(logs.contains("Creating class metadata"));
}
