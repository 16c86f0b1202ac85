use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpResponse, HttpServer};
use log::{error, info};
use std::sync::Arc;

use crate::config::Config;
use crate::ledger::{ErrorKind, Ledger};
use crate::persistence::{AuctionLog, InMemoryLog, JsonFileLog};
use crate::rpc::{AuctionRpc, RpcError};
use crate::StartupError;
use super::types::{ApiError, AppState, ServerIdentity};

// Initialize application state
pub fn init_app_state(ledger: Arc<Ledger>, identity: ServerIdentity) -> web::Data<AppState> {
    web::Data::new(AppState {
        rpc: AuctionRpc::new(ledger),
        identity,
    })
}

pub fn error_status(err: &RpcError) -> StatusCode {
    match err.kind() {
        Some(ErrorKind::Validation) => StatusCode::BAD_REQUEST,
        Some(ErrorKind::NotFound) => StatusCode::NOT_FOUND,
        Some(ErrorKind::Conflict) => StatusCode::CONFLICT,
        Some(ErrorKind::Append) | Some(ErrorKind::Storage) => StatusCode::INTERNAL_SERVER_ERROR,
        None => match err {
            RpcError::UnknownMethod(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

// Dispatch a named operation; the body is the raw request payload
async fn call(
    path: web::Path<String>,
    body: web::Bytes,
    data: web::Data<AppState>,
) -> HttpResponse {
    let method = path.into_inner();

    match data.rpc.respond(&method, &body).await {
        Ok(payload) => HttpResponse::Ok()
            .content_type("application/json")
            .body(payload),
        Err(err) => {
            let status = error_status(&err);
            if status.is_server_error() {
                error!("{} failed: {}", method, err);
            }
            HttpResponse::build(status).json(ApiError {
                message: err.to_string(),
            })
        }
    }
}

async fn identity(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&data.identity)
}

// Configure routes
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .route("/identity", web::get().to(identity))
            .route("/rpc/{method}", web::post().to(call)),
    );
}

pub async fn open_log(config: &Config) -> Result<Arc<dyn AuctionLog>, StartupError> {
    let log: Arc<dyn AuctionLog> = match &config.log_file {
        Some(path) => Arc::new(JsonFileLog::open(path).await?),
        None => {
            info!("No log file configured, auctions are kept in memory");
            Arc::new(InMemoryLog::new())
        }
    };
    Ok(log)
}

// Main application
pub async fn run_app(config: Config) -> Result<(), StartupError> {
    let ledger = Arc::new(Ledger::new(open_log(&config).await?));
    let identity = ServerIdentity::generate(config.public_address());
    let app_state = init_app_state(ledger, identity.clone());

    info!("Starting coordinator {} on {}", identity.node_id, identity.address);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(Logger::default())
            .configure(configure_app)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
