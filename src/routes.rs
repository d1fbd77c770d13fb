use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::docs;
use crate::handlers::{admin, protected, public};
use crate::middleware::session_middleware;
use crate::state::AppState;

/// Full application router with its global layers
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .merge(system_routes())
        .merge(auth_routes())
        .merge(curriculum_routes())
        .merge(relationship_routes())
        .merge(progress_routes())
        .merge(user_routes())
        .fallback(public::system::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes))
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match HeaderValue::from_str(&config.security.cors_origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!("CORS_ORIGIN {:?} is not a valid origin; cross-origin requests disabled", config.security.cors_origin);
            layer
        }
    }
}

fn system_routes() -> Router<AppState> {
    use public::system;

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(docs::swagger_ui())
}

fn auth_routes() -> Router<AppState> {
    use protected::session;
    use public::auth;

    Router::new()
        .route("/auth/self", get(auth::current))
        .route("/auth/signin", post(auth::signin))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signout", post(session::signout))
}

fn curriculum_routes() -> Router<AppState> {
    use admin::curriculum as write;
    use public::curriculum as read;

    Router::new()
        // Subjects
        .route("/subjects", get(read::list_subjects).post(write::create_subject))
        .route("/subjects/:id", get(read::get_subject).put(write::update_subject))
        .route("/subjects/soft/:id", delete(write::soft_delete_subject))
        .route("/subjects/hard/:id", delete(write::hard_delete_subject))
        // Topics
        .route("/topics", get(read::list_topics).post(write::create_topic))
        .route("/topics/:id", get(read::get_topic).put(write::update_topic))
        .route("/topics/soft/:id", delete(write::soft_delete_topic))
        .route("/topics/hard/:id", delete(write::hard_delete_topic))
        // Subtopics
        .route("/subtopics", get(read::list_subtopics).post(write::create_subtopic))
        .route("/subtopics/:id", get(read::get_subtopic).put(write::update_subtopic))
        .route("/subtopics/hard/:id", delete(write::hard_delete_subtopic))
        // Modules
        .route("/modules", get(read::list_modules).post(write::create_module))
        .route("/modules/:id", get(read::get_module).put(write::update_module))
        .route("/modules/hard/:id", delete(write::hard_delete_module))
        // Concepts
        .route("/concepts", get(read::list_concepts).post(write::create_concept))
        .route("/concepts/:id", get(read::get_concept).put(write::update_concept))
        .route("/concepts/hard/:id", delete(write::hard_delete_concept))
        // Formulas
        .route("/formulas", get(read::list_formulas).post(write::create_formula))
        .route("/formulas/:id", get(read::get_formula).put(write::update_formula))
        .route("/formulas/hard/:id", delete(write::hard_delete_formula))
        // Exercises
        .route("/exercises", get(read::list_exercises).post(write::create_exercise))
        .route("/exercises/:id", get(read::get_exercise).put(write::update_exercise))
        .route("/exercises/hard/:id", delete(write::hard_delete_exercise))
}

fn relationship_routes() -> Router<AppState> {
    use admin::relationships;
    use public::curriculum;

    Router::new()
        .route(
            "/concepts/:id/relationships",
            get(curriculum::list_relationships).post(relationships::create_relationship),
        )
        .route("/concept-relationships/:id", delete(relationships::delete_relationship))
}

fn progress_routes() -> Router<AppState> {
    use protected::progress;

    Router::new()
        .route("/exercises/:id/attempts", post(progress::record_attempt))
        .route("/progress", get(progress::report))
}

fn user_routes() -> Router<AppState> {
    use admin::users as admin_users;
    use protected::users;

    Router::new()
        .route("/users", get(admin_users::list_users))
        .route("/users/profile", put(users::update_profile))
        .route("/users/profile/password", patch(users::change_password))
}
