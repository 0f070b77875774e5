// Route exports
pub mod matches;
pub mod users;

use actix_web::web;
use std::sync::Arc;

use crate::core::Matcher;
use crate::error::{handle_json_payload_error, handle_path_error};
use crate::services::{CacheManager, UserStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub cache: Arc<CacheManager>,
    pub matcher: Matcher,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
        .app_data(web::PathConfig::default().error_handler(handle_path_error))
        .service(
            web::scope("/api")
                .configure(matches::configure)
                .configure(users::configure),
        );
}
