use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use answer_core::GatewayError;
use std::io;

use crate::error::AppError;
use crate::handlers;
use crate::middleware::SharedSecret;
use crate::state::AppState;

/// Routes and extractor settings, shared by the server and the HTTP tests.
pub fn app_config(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected request body: {}", err);
        AppError::from(GatewayError::Validation(err.to_string())).into()
    });

    cfg.app_data(json_config)
        .route("/answer", web::post().to(handlers::answer::handler))
        .route("/answer2", web::post().to(handlers::answer::stream_handler))
        .route("/health", web::get().to(handlers::health::handler));
}

pub async fn run_server(
    port: u16,
    state: AppState,
    shared_secret: Option<String>,
) -> io::Result<()> {
    if shared_secret.as_deref().is_some_and(|secret| !secret.is_empty()) {
        log::info!("Shared secret check enabled");
    } else {
        log::warn!("No shared secret configured; all requests are accepted");
    }

    let state = web::Data::new(state);
    let shared_secret = SharedSecret::new(shared_secret);

    log::info!("Listening on 0.0.0.0:{}", port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(shared_secret.clone())
            .wrap(Cors::permissive())
            .configure(app_config)
    })
    .bind(format!("0.0.0.0:{}", port))?
    .run()
    .await
}
