use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{elevated, protected, public, service};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        .merge(public_routes())
        .merge(application_routes())
        .merge(kingdom_routes())
        .route("/async/application", put(service::async_callback::put_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::{auth, kingdoms, root};

    Router::new()
        .route("/", get(root::root))
        .route("/health", get(root::health))
        .route("/kingdoms", get(kingdoms::feed))
        .route("/kingdom", get(kingdoms::get))
        .route("/login", get(protected::session::check_login).post(auth::login))
        .route("/signup", post(auth::signup))
        .route("/logout", delete(protected::session::logout))
}

fn kingdom_routes() -> Router<AppState> {
    use elevated::kingdoms;

    Router::new()
        .route("/kingdom/create", post(kingdoms::create))
        .route("/kingdom/update", put(kingdoms::update))
        .route("/kingdom/update/status", put(kingdoms::update_status))
        .route("/kingdom/delete", delete(kingdoms::delete))
}

fn application_routes() -> Router<AppState> {
    use protected::applications;

    Router::new()
        .route("/applications", get(applications::list))
        .route("/application/with_kingdoms", get(applications::with_kingdoms))
        .route("/application/create", post(applications::create))
        .route("/application/update", put(applications::update))
        .route("/application/add_kingdom", put(applications::add_kingdom))
        .route("/application/update_kingdom", put(applications::update_kingdom))
        .route("/application/delete_kingdom", delete(applications::delete_kingdom))
        .route("/application/delete", delete(applications::delete))
        .route("/application/status/user", put(applications::change_status))
        .route(
            "/application/status/moderator",
            put(elevated::applications::change_status),
        )
}

/// Empty origin list allows any origin without credentials; otherwise only
/// the listed origins, with cookies.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
