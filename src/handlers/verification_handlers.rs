use actix_web::{web, HttpResponse, Responder};
use log::{info, warn};

use crate::models::ApiError;
use crate::services::VerificationService;

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

/// Verifies an uploaded artifact. The raw file is the request body.
pub async fn verify_artifact(
    service: web::Data<VerificationService>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    if body.is_empty() {
        warn!("Verification request without a file");
        return Err(ApiError::EmptyUpload);
    }

    info!("Verifying uploaded artifact ({} bytes)", body.len());
    let service = service.into_inner();
    let result = web::block(move || service.verify(&body))
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    if result.valid {
        Ok(HttpResponse::Ok().json(result))
    } else {
        Ok(HttpResponse::UnprocessableEntity().json(result))
    }
}

pub async fn get_public_key(service: web::Data<VerificationService>) -> impl Responder {
    HttpResponse::Ok()
        .content_type("application/x-pem-file")
        .body(service.public_key_pem().to_string())
}
