use actix_web::web;
use crate::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health_check))
        .route("/verify", web::post().to(handlers::verify_artifact))
        .route("/public-key", web::get().to(handlers::get_public_key));
}
