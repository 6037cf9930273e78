use crate::backup::BackupManager;
use crate::config::AppConfig;
use crate::error::BackupError;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use std::convert::Infallible;
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// State shared by every request handler.
pub struct ServerState {
    pub config: AppConfig,
    pub manager: BackupManager,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest {
    backup_name: String,
    save_slot: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestoreRequest {
    folder_name: String,
    save_slot: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenameRequest {
    folder_name: String,
    new_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest {
    folder_name: String,
}

/// Accept loop; each connection is served on its own task.
pub async fn run(listener: TcpListener, state: Arc<ServerState>) -> anyhow::Result<()> {
    loop {
        let (stream, _addr) = listener.accept().await?;
        let state = state.clone();
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |req| handle_request(state.clone(), req));
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                error!("Connection error: {}", e);
            }
        });
    }
}

async fn handle_request(
    state: Arc<ServerState>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    info!("{} {}", method, path);

    let response = match (method, path.as_str()) {
        (Method::GET, "/backups") => handle_list(state).await,
        (Method::GET, "/config") => handle_config(state),
        (Method::POST, "/create-backup") => handle_create(state, req).await,
        (Method::POST, "/restore-backup") => handle_restore(state, req).await,
        (Method::PUT, "/rename-backup") => handle_rename(state, req).await,
        (Method::DELETE, "/delete-backup") => handle_delete(state, req).await,
        _ => json_response(
            StatusCode::NOT_FOUND,
            &serde_json::json!({ "error": "Not found" }),
        ),
    };

    Ok(response)
}

async fn handle_list(state: Arc<ServerState>) -> Response<Full<Bytes>> {
    match run_blocking(move || state.manager.get_backups()).await {
        Ok(backups) => json_response(StatusCode::OK, &serde_json::json!({ "backups": backups })),
        Err(e) => backup_error_response(&e),
    }
}

fn handle_config(state: Arc<ServerState>) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "sourceFolder": state.config.source_folder,
            "backupFolder": state.config.backup_folder,
            "port": state.config.port,
        }),
    )
}

async fn handle_create(state: Arc<ServerState>, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let body: CreateRequest = match read_json(req).await {
        Ok(body) => body,
        Err(response) => return response,
    };

    match run_blocking(move || state.manager.create_backup(&body.backup_name, &body.save_slot))
        .await
    {
        Ok(created) => {
            let message = with_items(
                format!("Successfully created the backup \"{}\"", created.folder_name),
                "Copied",
                &created.items_copied,
                &created.warnings,
            );
            json_response(
                StatusCode::OK,
                &serde_json::json!({
                    "success": true,
                    "message": message,
                    "backupCreated": created.folder_name,
                    "originalName": created.original_name,
                    "itemsCopied": created.items_copied,
                }),
            )
        }
        Err(e) => backup_error_response(&e),
    }
}

async fn handle_restore(state: Arc<ServerState>, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let body: RestoreRequest = match read_json(req).await {
        Ok(body) => body,
        Err(response) => return response,
    };
    let slot = body.save_slot.clone();

    match run_blocking(move || state.manager.restore_backup(&body.folder_name, &body.save_slot))
        .await
    {
        Ok(restored) => {
            let message = with_items(
                format!("Successfully restored the backup to slot {}", slot),
                "Restored",
                &restored.items_restored,
                &restored.warnings,
            );
            json_response(
                StatusCode::OK,
                &serde_json::json!({
                    "success": true,
                    "message": message,
                    "itemsRestored": restored.items_restored,
                }),
            )
        }
        Err(e) => backup_error_response(&e),
    }
}

async fn handle_rename(state: Arc<ServerState>, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let body: RenameRequest = match read_json(req).await {
        Ok(body) => body,
        Err(response) => return response,
    };

    match run_blocking(move || state.manager.rename_backup(&body.folder_name, &body.new_name))
        .await
    {
        Ok(renamed) => json_response(
            StatusCode::OK,
            &serde_json::json!({
                "success": true,
                "message": format!(
                    "Successfully renamed the backup to \"{}\"",
                    renamed.new_display_name
                ),
                "newDisplayName": renamed.new_display_name,
                "newFolderName": renamed.new_folder_name,
            }),
        ),
        Err(e) => backup_error_response(&e),
    }
}

async fn handle_delete(state: Arc<ServerState>, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let body: DeleteRequest = match read_json(req).await {
        Ok(body) => body,
        Err(response) => return response,
    };
    let folder_name = body.folder_name.clone();

    match run_blocking(move || state.manager.delete_backup(&body.folder_name)).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &serde_json::json!({
                "success": true,
                "message": format!("Successfully deleted the backup \"{}\"", folder_name),
                "deletedBackup": folder_name,
            }),
        ),
        Err(e) => backup_error_response(&e),
    }
}

/// Runs blocking filesystem work off the async executor.
async fn run_blocking<T, F>(task: F) -> Result<T, BackupError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, BackupError> + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(result) => result,
        Err(e) => Err(BackupError::Io {
            context: "Blocking task join error".to_string(),
            source: io::Error::new(io::ErrorKind::Other, e),
        }),
    }
}

/// Reads and deserializes a JSON request body, or produces the 400 response.
async fn read_json<T: serde::de::DeserializeOwned>(
    req: Request<Incoming>,
) -> Result<T, Response<Full<Bytes>>> {
    let bytes = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return Err(json_response(
                StatusCode::BAD_REQUEST,
                &serde_json::json!({ "error": format!("Failed to read request body: {}", e) }),
            ))
        }
    };
    serde_json::from_slice(&bytes).map_err(|e| {
        json_response(
            StatusCode::BAD_REQUEST,
            &serde_json::json!({ "error": format!("Invalid request body: {}", e) }),
        )
    })
}

/// Appends the item list and any warnings to a base message.
fn with_items(mut message: String, verb: &str, items: &[String], warnings: &[String]) -> String {
    if !items.is_empty() {
        message.push_str(&format!("\n{}: {}", verb, items.join(", ")));
    }
    if !warnings.is_empty() {
        message.push_str(&format!("\nWarnings: {}", warnings.join("; ")));
    }
    message
}

fn backup_error_response(error: &BackupError) -> Response<Full<Bytes>> {
    let status =
        StatusCode::from_u16(error.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!("Request failed: {}", error);
    }
    json_response(status, &serde_json::json!({ "error": error.to_string() }))
}

fn json_response<T: serde::Serialize>(status: StatusCode, data: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .expect("valid response")
}
