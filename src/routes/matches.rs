use actix_web::{web, HttpResponse, Responder};

use crate::error::AppError;
use crate::models::{HealthResponse, UserId};
use crate::routes::AppState;

/// Configure health and match routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/users/{id}/matches", web::get().to(find_matches))
        .route("/users/{id}/matches/{other_id}", web::get().to(match_details));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = match state.store.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Storage health check failed: {}", e);
            false
        }
    };

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.store.backend().to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// GET /api/users/{id}/matches
///
/// Returns `[]` when the user exists but nobody can exchange with them, and
/// a 404 error object when the user does not exist.
async fn find_matches(
    state: web::Data<AppState>,
    path: web::Path<UserId>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let population = state.store.list_users().await?;
    let matches = state.matcher.find_matches(user_id, &population)?;

    tracing::info!(
        "Returning {} matches for user {} (from {} users)",
        matches.len(),
        user_id,
        population.len()
    );

    Ok(HttpResponse::Ok().json(matches))
}

/// Exchange details for one pair of users
///
/// GET /api/users/{id}/matches/{other_id}
async fn match_details(
    state: web::Data<AppState>,
    path: web::Path<(UserId, UserId)>,
) -> Result<HttpResponse, AppError> {
    let (user_id, other_id) = path.into_inner();

    let population = state.store.list_users().await?;
    let details = state.matcher.match_details(user_id, other_id, &population)?;

    Ok(HttpResponse::Ok().json(details))
}
