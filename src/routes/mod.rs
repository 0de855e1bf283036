use actix_web::web;

mod verification_routes;

pub use verification_routes::configure as configure_verification_routes;

pub fn configure(cfg: &mut web::ServiceConfig) {
    configure_verification_routes(cfg);
}

/// Registers all routes and caps request bodies at `max_upload_bytes`.
/// Larger uploads are rejected with 413 before reaching a handler.
pub fn configure_with_upload_limit(max_upload_bytes: usize) -> impl Fn(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::PayloadConfig::new(max_upload_bytes));
        configure(cfg);
    }
}
