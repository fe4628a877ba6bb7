//! Volume plugin protocol server.
//!
//! Every endpoint is a POST with a JSON body, which may be empty. Failures
//! are reported in-band through the `Err` field with status 200.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use gfs_common::PluginResult;
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;

use crate::driver::{MountedVolumeDriver, VolumeInfo};
use crate::hooks::MountHooks;
use crate::protocol::{
    ActivateResponse, CapabilitiesResponse, Capability, CreateRequest, ErrorResponse,
    GetResponse, ListResponse, MountRequest, MountResponse, NameRequest, VolumeEntry,
};
use crate::runner::MountRunner;

type SharedDriver<H, R> = Arc<MountedVolumeDriver<H, R>>;

/// Build the protocol router for `driver`.
pub fn router<H: MountHooks, R: MountRunner>(driver: SharedDriver<H, R>) -> Router {
    Router::new()
        .route("/Plugin.Activate", post(activate))
        .route("/VolumeDriver.Create", post(create::<H, R>))
        .route("/VolumeDriver.Remove", post(remove::<H, R>))
        .route("/VolumeDriver.Mount", post(mount::<H, R>))
        .route("/VolumeDriver.Path", post(path::<H, R>))
        .route("/VolumeDriver.Unmount", post(unmount::<H, R>))
        .route("/VolumeDriver.Get", post(get::<H, R>))
        .route("/VolumeDriver.List", post(list::<H, R>))
        .route("/VolumeDriver.Capabilities", post(capabilities::<H, R>))
        .layer(TraceLayer::new_for_http())
        .with_state(driver)
}

/// Serve `driver` on a Unix socket until `shutdown` resolves.
///
/// A stale socket file at `socket` is replaced, and removed again on exit.
///
/// # Errors
///
/// Fails if the socket cannot be bound or the server stops with an I/O error.
pub async fn serve_unix<H, R, F>(
    driver: SharedDriver<H, R>,
    socket: &Path,
    shutdown: F,
) -> PluginResult<()>
where
    H: MountHooks,
    R: MountRunner,
    F: Future<Output = ()> + Send + 'static,
{
    if let Some(parent) = socket.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    remove_socket(socket).await?;

    let listener = tokio::net::UnixListener::bind(socket)?;
    tracing::info!(socket = %socket.display(), "Plugin listening");

    let served = axum::serve(listener, router(driver))
        .with_graceful_shutdown(shutdown)
        .await;

    finish_serving(socket, served).await
}

/// Remove the socket whatever the outcome, then report the server's error first.
async fn finish_serving(socket: &Path, served: std::io::Result<()>) -> PluginResult<()> {
    let removed = remove_socket(socket).await;
    if let Err(err) = served {
        tracing::error!(error = %err, "Plugin server failed");
        return Err(err.into());
    }
    removed?;
    tracing::info!("Plugin stopped");
    Ok(())
}

async fn remove_socket(socket: &Path) -> PluginResult<()> {
    match tokio::fs::remove_file(socket).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn decode<T: DeserializeOwned + Default>(body: &Bytes) -> PluginResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

fn entry(info: VolumeInfo) -> VolumeEntry {
    VolumeEntry {
        name: info.name,
        mountpoint: info
            .mountpoint
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
    }
}

async fn activate() -> Json<ActivateResponse> {
    Json(ActivateResponse {
        implements: vec!["VolumeDriver".to_string()],
    })
}

async fn create<H: MountHooks, R: MountRunner>(
    State(driver): State<SharedDriver<H, R>>,
    body: Bytes,
) -> Json<ErrorResponse> {
    let result = match decode::<CreateRequest>(&body) {
        Ok(request) => driver.create(request).await,
        Err(err) => Err(err),
    };
    Json(result.map_or_else(ErrorResponse::err, |()| ErrorResponse::ok()))
}

async fn remove<H: MountHooks, R: MountRunner>(
    State(driver): State<SharedDriver<H, R>>,
    body: Bytes,
) -> Json<ErrorResponse> {
    let result = match decode::<NameRequest>(&body) {
        Ok(request) => driver.remove(&request.name).await,
        Err(err) => Err(err),
    };
    Json(result.map_or_else(ErrorResponse::err, |()| ErrorResponse::ok()))
}

async fn mount<H: MountHooks, R: MountRunner>(
    State(driver): State<SharedDriver<H, R>>,
    body: Bytes,
) -> Json<MountResponse> {
    let result = match decode::<MountRequest>(&body) {
        Ok(request) => driver.mount(&request).await.map(Some),
        Err(err) => Err(err),
    };
    Json(mount_response(result))
}

async fn path<H: MountHooks, R: MountRunner>(
    State(driver): State<SharedDriver<H, R>>,
    body: Bytes,
) -> Json<MountResponse> {
    let result = match decode::<NameRequest>(&body) {
        Ok(request) => driver.path(&request.name).await,
        Err(err) => Err(err),
    };
    Json(mount_response(result))
}

fn mount_response(result: PluginResult<Option<std::path::PathBuf>>) -> MountResponse {
    match result {
        Ok(mountpoint) => MountResponse {
            mountpoint: mountpoint
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            err: String::new(),
        },
        Err(err) => MountResponse {
            mountpoint: String::new(),
            err: err.to_string(),
        },
    }
}

async fn unmount<H: MountHooks, R: MountRunner>(
    State(driver): State<SharedDriver<H, R>>,
    body: Bytes,
) -> Json<ErrorResponse> {
    let result = match decode::<MountRequest>(&body) {
        Ok(request) => driver.unmount(&request).await,
        Err(err) => Err(err),
    };
    Json(result.map_or_else(ErrorResponse::err, |()| ErrorResponse::ok()))
}

async fn get<H: MountHooks, R: MountRunner>(
    State(driver): State<SharedDriver<H, R>>,
    body: Bytes,
) -> Json<GetResponse> {
    let result = match decode::<NameRequest>(&body) {
        Ok(request) => driver.get(&request.name).await,
        Err(err) => Err(err),
    };
    Json(match result {
        Ok(info) => GetResponse {
            volume: Some(entry(info)),
            err: String::new(),
        },
        Err(err) => GetResponse {
            volume: None,
            err: err.to_string(),
        },
    })
}

async fn list<H: MountHooks, R: MountRunner>(
    State(driver): State<SharedDriver<H, R>>,
) -> Json<ListResponse> {
    let volumes = driver.list().await.into_iter().map(entry).collect();
    Json(ListResponse {
        volumes,
        err: String::new(),
    })
}

async fn capabilities<H: MountHooks, R: MountRunner>(
    State(driver): State<SharedDriver<H, R>>,
) -> Json<CapabilitiesResponse> {
    Json(CapabilitiesResponse {
        capabilities: Capability {
            scope: driver.scope().to_string(),
        },
    })
}
