use actix_web::{
    App,
    HttpServer,
    web,
    middleware::Logger,
};
use actix_cors::Cors;
use log::{info, error};
use dotenv::dotenv;

use docseal::{routes, Settings, VerificationService};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    docseal::config::init_logging();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    let verification_service = match VerificationService::from_settings(&settings) {
        Ok(service) => web::Data::new(service),
        Err(e) => {
            error!("Cannot start verification service: {}", e);
            return Err(e.into());
        }
    };

    let host = settings.host.clone();
    let port = settings.port;
    let max_upload_bytes = settings.max_upload_bytes;

    info!("Starting verification server at http://{}:{}", host, port);
    info!("Maximum upload size: {} bytes", max_upload_bytes);

    HttpServer::new(move || {
        // Configure CORS middleware
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .expose_headers(vec!["content-type", "content-length", "accept"])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(verification_service.clone())
            .configure(routes::configure_with_upload_limit(max_upload_bytes))
    })
    .bind(format!("{host}:{port}"))?
    .run()
    .await?;

    info!("Server shutting down");
    Ok(())
}
