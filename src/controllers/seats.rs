//! seats.rs
//!
//! Справочник мест: выборка с фильтром по статусу (форма регистрации
//! запрашивает только `available`) и перевод места в обслуживание и обратно.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::middleware::AdminUser;
use crate::models::Seat;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seats", get(get_seats))
        .route("/seats/{id}/status", patch(set_seat_status))
}

#[derive(Debug, Deserialize)]
pub struct SeatsQuery {
    pub status: Option<String>,
}

// GET /api/seats?status=available
async fn get_seats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<SeatsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(ref st) = params.status {
        let ok = matches!(st.as_str(), "available" | "occupied" | "maintenance");
        if !ok {
            return Err(ApiError::BadRequest(
                "status должен быть available | occupied | maintenance".to_string(),
            ));
        }
    }

    let mut q = String::from("SELECT * FROM seats");
    if params.status.is_some() {
        q.push_str(" WHERE status = $1");
    }
    q.push_str(" ORDER BY seat_number");

    let mut dbq = sqlx::query_as::<_, Seat>(&q);
    if let Some(st) = params.status {
        dbq = dbq.bind(st);
    }

    let seats = dbq.fetch_all(&state.db.pool).await?;
    Ok(Json(seats))
}

#[derive(Debug, Deserialize)]
pub struct SeatStatusRequest {
    pub status: String,
}

// PATCH /api/seats/{id}/status
//
// Только `available` и `maintenance`: статусом `occupied` владеют потоки
// регистрации и удаления студента.
async fn set_seat_status(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SeatStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !matches!(req.status.as_str(), "available" | "maintenance") {
        return Err(ApiError::BadRequest(
            "status должен быть available | maintenance".to_string(),
        ));
    }

    // место с занимающим его студентом в обслуживание не переводится
    let occupied: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE seat_id = $1)")
            .bind(id)
            .fetch_one(&state.db.pool)
            .await?;

    if occupied {
        return Err(ApiError::Conflict("Место занято студентом".to_string()));
    }

    let updated = sqlx::query("UPDATE seats SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(&req.status)
        .bind(id)
        .execute(&state.db.pool)
        .await?
        .rows_affected();

    if updated == 0 {
        return Err(ApiError::NotFound("Место не найдено"));
    }

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Статус места обновлен" })),
    ))
}
