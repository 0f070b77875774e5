use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::models::{validation_message, CreateUserRequest, User, UserId};
use crate::routes::AppState;
use crate::services::{CacheError, CacheKey};

/// Configure user directory routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/users", web::get().to(list_users))
        .route("/users", web::post().to(create_user))
        .route("/users/{id}", web::get().to(get_user))
        .route("/users/{id}", web::put().to(replace_user));
}

/// List every user
///
/// GET /api/users
async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let users = state.store.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Create a user
///
/// POST /api/users
///
/// Request body:
/// ```json
/// {
///   "name": "string",
///   "email": "string",
///   "skills_offered": "rust, go",
///   "skills_needed": ["python"]
/// }
/// ```
async fn create_user(
    state: web::Data<AppState>,
    req: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let new_user = req.into_inner().into_new_user().map_err(|errors| {
        tracing::info!("Validation failed for create_user request: {}", errors);
        AppError::Validation(validation_message(&errors))
    })?;

    let user = state.store.create_user(new_user).await?;

    tracing::info!(
        "Created user {} ({} offered, {} needed)",
        user.user_id,
        user.skills_offered.len(),
        user.skills_needed.len()
    );

    Ok(HttpResponse::Created().json(user))
}

/// Fetch one user, served from cache when possible
///
/// GET /api/users/{id}
async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<UserId>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let cache_key = CacheKey::user(user_id);

    match state.cache.get::<User>(&cache_key).await {
        Ok(user) => return Ok(HttpResponse::Ok().json(user)),
        Err(CacheError::CacheMiss(_)) => {}
        Err(e) => tracing::warn!("Cache read failed for {}: {}", cache_key, e),
    }

    // Taken before the store read so a replacement landing in between wins.
    let generation = match state.cache.generation(&cache_key).await {
        Ok(generation) => Some(generation),
        Err(e) => {
            tracing::warn!("Cache generation read failed for {}: {}", cache_key, e);
            None
        }
    };

    let user = state
        .store
        .get_user(user_id)
        .await?
        .ok_or(AppError::UserNotFound(user_id))?;

    if let Some(generation) = generation {
        if let Err(e) = state.cache.set_if_current(&cache_key, generation, &user).await {
            tracing::warn!("Failed to cache user {}: {}", user_id, e);
        }
    }

    Ok(HttpResponse::Ok().json(user))
}

/// Replace every field of a user
///
/// PUT /api/users/{id}
async fn replace_user(
    state: web::Data<AppState>,
    path: web::Path<UserId>,
    req: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let new_user = req.into_inner().into_new_user().map_err(|errors| {
        tracing::info!("Validation failed for replace_user {}: {}", user_id, errors);
        AppError::Validation(validation_message(&errors))
    })?;

    let user = state.store.replace_user(user_id, new_user).await?;

    if let Err(e) = state.cache.invalidate(&CacheKey::user(user_id)).await {
        tracing::warn!("Failed to invalidate cache for user {}: {}", user_id, e);
    }

    tracing::info!("Replaced user {}", user_id);
    Ok(HttpResponse::Ok().json(user))
}
