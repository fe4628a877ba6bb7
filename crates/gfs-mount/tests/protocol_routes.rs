//! Integration tests for the plugin protocol routes.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use gfs_common::{PluginError, PluginResult};
use gfs_mount::{
    CreateRequest, DriverConfig, MountHooks, MountRequest, MountRunner, MountedVolumeDriver,
    router,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

struct RequireServers;

impl MountHooks for RequireServers {
    fn validate(&self, request: &CreateRequest) -> PluginResult<()> {
        if request.options.contains("servers") {
            Ok(())
        } else {
            Err(PluginError::MissingSource)
        }
    }

    fn mount_options(&self, _request: &CreateRequest) -> Vec<String> {
        Vec::new()
    }

    fn pre_mount(&self, _request: &MountRequest) -> PluginResult<()> {
        Ok(())
    }

    fn post_mount(&self, _request: &MountRequest) {}
}

struct NoopRunner;

#[async_trait]
impl MountRunner for NoopRunner {
    async fn mount(&self, _program: &str, _args: &[String], _mountpoint: &Path) -> PluginResult<()> {
        Ok(())
    }

    async fn unmount(&self, _mountpoint: &Path) -> PluginResult<()> {
        Ok(())
    }
}

type TestDriver = MountedVolumeDriver<RequireServers, NoopRunner>;

fn driver(temp: &TempDir) -> Arc<TestDriver> {
    let config = DriverConfig::new("glusterfs", "gfs").with_mount_root(temp.path());
    Arc::new(MountedVolumeDriver::with_runner(
        config,
        RequireServers,
        NoopRunner,
    ))
}

async fn call(driver: &Arc<TestDriver>, uri: &str, body: &str) -> Value {
    let request = Request::post(uri)
        .header("content-type", "application/vnd.docker.plugins.v1.2+json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router(Arc::clone(driver)).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn activate_advertises_volume_driver() {
    let temp = TempDir::new().unwrap();
    let driver = driver(&temp);
    let response = call(&driver, "/Plugin.Activate", "").await;
    assert_eq!(response, json!({ "Implements": ["VolumeDriver"] }));
}

#[tokio::test]
async fn capabilities_report_scope() {
    let temp = TempDir::new().unwrap();
    let driver = driver(&temp);
    let response = call(&driver, "/VolumeDriver.Capabilities", "{}").await;
    assert_eq!(response, json!({ "Capabilities": { "Scope": "local" } }));
}

#[tokio::test]
async fn validation_errors_are_reported_in_band() {
    let temp = TempDir::new().unwrap();
    let driver = driver(&temp);
    let response = call(&driver, "/VolumeDriver.Create", r#"{"Name":"vol","Opts":null}"#).await;
    assert_eq!(response["Err"], PluginError::MissingSource.to_string());
}

#[tokio::test]
async fn malformed_body_is_reported_in_band() {
    let temp = TempDir::new().unwrap();
    let driver = driver(&temp);
    let response = call(&driver, "/VolumeDriver.Create", "{not json").await;
    assert!(
        response["Err"]
            .as_str()
            .unwrap()
            .starts_with("Serialization error")
    );
}

#[tokio::test]
async fn full_volume_lifecycle() {
    let temp = TempDir::new().unwrap();
    let driver = driver(&temp);

    let response = call(
        &driver,
        "/VolumeDriver.Create",
        r#"{"Name":"vol","Opts":{"servers":"h1,h2"}}"#,
    )
    .await;
    assert_eq!(response, json!({ "Err": "" }));

    let response = call(&driver, "/VolumeDriver.Get", r#"{"Name":"vol"}"#).await;
    assert_eq!(response, json!({ "Volume": { "Name": "vol" }, "Err": "" }));

    let response = call(&driver, "/VolumeDriver.Mount", r#"{"Name":"vol","ID":"c1"}"#).await;
    let mountpoint = driver.mountpoint_for("vol").display().to_string();
    assert_eq!(response, json!({ "Mountpoint": mountpoint, "Err": "" }));

    let response = call(&driver, "/VolumeDriver.Path", r#"{"Name":"vol"}"#).await;
    assert_eq!(response["Mountpoint"], mountpoint);

    let response = call(&driver, "/VolumeDriver.List", "").await;
    assert_eq!(
        response,
        json!({ "Volumes": [{ "Name": "vol", "Mountpoint": mountpoint }], "Err": "" })
    );

    let response = call(&driver, "/VolumeDriver.Remove", r#"{"Name":"vol"}"#).await;
    assert!(response["Err"].as_str().unwrap().contains("in use"));

    let response = call(&driver, "/VolumeDriver.Unmount", r#"{"Name":"vol","ID":"c1"}"#).await;
    assert_eq!(response, json!({ "Err": "" }));

    let response = call(&driver, "/VolumeDriver.Remove", r#"{"Name":"vol"}"#).await;
    assert_eq!(response, json!({ "Err": "" }));

    let response = call(&driver, "/VolumeDriver.Get", r#"{"Name":"vol"}"#).await;
    assert_eq!(response, json!({ "Err": "Volume not found: vol" }));
}
