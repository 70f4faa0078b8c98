use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service information
pub async fn root() -> Json<Value> {
    Json(json!({
        "Code": 200,
        "Status": "ok",
        "Message": "kingdoms api",
        "Body": {
            "Name": "Kingdoms API",
            "Version": env!("CARGO_PKG_VERSION"),
            "Endpoints": {
                "kingdoms": "/kingdoms, /kingdom (public)",
                "kingdom": "/kingdom/create, /kingdom/update, /kingdom/update/status, /kingdom/delete (moderator)",
                "applications": "/applications, /application/* (session)",
                "moderation": "/application/status/moderator (moderator)",
                "auth": "/login, /signup, /logout",
                "async": "/async/application (AsyncKey header)",
            }
        }
    }))
}

/// GET /health - database and blacklist connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let database = crate::database::health_check(&state.pool).await;
    let blacklist = state.blacklist.health_check().await;

    if let Err(e) = &database {
        tracing::warn!("Health check: database unavailable: {}", e);
    }
    if let Err(e) = &blacklist {
        tracing::warn!("Health check: token blacklist unavailable: {}", e);
    }

    let describe = |ok: bool| if ok { "ok" } else { "unavailable" };
    let healthy = database.is_ok() && blacklist.is_ok();
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "Code": status.as_u16(),
            "Status": if healthy { "ok" } else { "error" },
            "Message": if healthy { "service healthy" } else { "service degraded" },
            "Body": {
                "status": if healthy { "ok" } else { "degraded" },
                "timestamp": now,
                "database": describe(database.is_ok()),
                "blacklist": describe(blacklist.is_ok()),
            }
        })),
    )
}
