mod board;
mod config;
mod entities;
mod entur;
mod error;
mod geo;

#[cfg(test)]
mod test_utils;

use std::env;
use std::sync::Arc;

use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use serde_json::json;
use tokio::select;
use tokio::sync::watch;

use board::routes::unique_by_route;
use board::view::board_view;
use board::{BoardSnapshot, RefreshOrchestrator};
use config::{BoardConfig, BoardSettings};
use entur::client::{EnturClient, DEFAULT_API_URL};
use error::{TavlaError, TavlaResult};

#[derive(Clone)]
pub struct ContextData {
    board: watch::Receiver<Arc<BoardSnapshot>>,
    settings: Arc<BoardSettings>,
}

impl ContextData {
    fn snapshot(&self) -> Arc<BoardSnapshot> {
        self.board.borrow().clone()
    }
}

#[get("/ok")]
async fn ok() -> TavlaResult<impl Responder> {
    Ok(HttpResponse::Ok().finish())
}

#[get("/board")]
async fn get_board(ctx: web::Data<ContextData>) -> TavlaResult<impl Responder> {
    let snapshot = ctx.snapshot();
    Ok(HttpResponse::Ok().json(&*snapshot))
}

#[get("/board/view")]
async fn get_board_view(ctx: web::Data<ContextData>) -> TavlaResult<impl Responder> {
    let view = board_view(&ctx.snapshot(), &ctx.settings);
    Ok(web::Json(view))
}

#[get("/stops/{stop_id}/routes")]
async fn get_stop_routes(
    params: web::Path<(String,)>,
    ctx: web::Data<ContextData>,
) -> TavlaResult<impl Responder> {
    let (stop_id,) = params.into_inner();

    let snapshot = ctx.snapshot();
    let stop = snapshot
        .stops_data
        .iter()
        .find(|stop| stop.id == stop_id)
        .ok_or_else(|| TavlaError::NotFound(format!("Stop place {}", stop_id)))?;

    let response = web::Json(json!({
        "routes": unique_by_route(&stop.departures),
    }));
    Ok(response)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::try_init().ok();

    log::debug!("Debug logging enabled");

    dotenvy::from_filename(".env").ok();

    let config = BoardConfig::from_env().map_err(TavlaError::Config)?;
    log::info!(
        "Board at {},{} within {} m",
        config.position.latitude,
        config.position.longitude,
        config.settings.distance_meters
    );

    let client_name = env::var("ENTUR_CLIENT_NAME").unwrap_or("tavla-rs".to_string());
    let api_url = env::var("ENTUR_API_URL").unwrap_or(DEFAULT_API_URL.to_string());
    let client = EnturClient::new(&client_name, &api_url).map_err(TavlaError::Entur)?;

    let settings = Arc::new(config.settings.clone());
    let mut scheduler = RefreshOrchestrator::new(client, config).start();

    let ctx = ContextData {
        board: scheduler.subscribe(),
        settings,
    };

    let listen_address = env::var("LISTEN_ADDRESS").unwrap_or("127.0.0.1:8080".to_string());

    log::info!("Starting server at {}", listen_address);

    let server = HttpServer::new(move || {
        let logger = Logger::default();

        let mut cors = actix_cors::Cors::default()
            .allowed_methods(vec!["GET"])
            .allowed_headers(vec!["accept"]);

        if let Ok(allowed_origin) = env::var("ALLOW_ORIGIN") {
            if allowed_origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(&allowed_origin);
            }
        }

        App::new()
            .wrap(logger)
            .wrap(cors)
            .app_data(web::Data::new(ctx.clone()))
            .service(ok)
            .service(get_board)
            .service(get_board_view)
            .service(get_stop_routes)
    })
    .bind(listen_address)?
    .run();

    select! {
        res = server => {
            log::info!("Server stopped");
            scheduler.stop().await;
            res
        },
        res = scheduler.finished() => {
            log::info!("Board refresh stopped");
            res.map_err(std::io::Error::from)
        }
    }
}
