use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::PaginationConfig;
use crate::cursor::CursorCodec;
use crate::storage::Storage;

use super::check_ins::{
    create_check_in, delete_check_in, disc_distance, disc_stats, get_check_in, list_check_ins,
    list_disc_check_ins, list_user_check_ins, update_check_in,
};
use super::handlers::{
    create_disc, delete_disc, get_disc, health_check, list_courses, list_discs, update_disc,
    AppState,
};

pub fn create_api_router(storage: Arc<dyn Storage>, pagination: PaginationConfig) -> Router {
    let pagination = pagination.normalized();
    let state = Arc::new(AppState {
        storage,
        cursors: CursorCodec::new(pagination.cursor_hmac_secret.as_deref()),
        pagination,
    });

    let disc_routes = Router::new()
        .route("/discs", get(list_discs).post(create_disc))
        .route(
            "/discs/{id}",
            get(get_disc).patch(update_disc).delete(delete_disc),
        );

    let check_in_routes = Router::new()
        .route("/checkin", get(list_check_ins))
        .route(
            "/checkin/{disc_id}",
            get(list_disc_check_ins).post(create_check_in),
        )
        .route("/checkin/{disc_id}/stats", get(disc_stats))
        .route("/checkin/distance/{disc_id}", get(disc_distance))
        .route(
            "/checkin/id/{id}",
            get(get_check_in)
                .patch(update_check_in)
                .delete(delete_check_in),
        )
        .route("/checkin/user/{username}", get(list_user_check_ins));

    Router::new()
        .route("/health", get(health_check))
        .route("/courses", get(list_courses))
        .merge(disc_routes)
        .merge(check_in_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
