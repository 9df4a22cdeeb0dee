//! dashboard.rs
//!
//! Единая точка загрузки данных панели: три таблицы целиком одним запросом.
//! Каждый вызов читает базу заново - клиент перезапрашивает панель после
//! любой мутации вместо инкрементальных обновлений.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::errors::ApiError;
use crate::middleware::AdminUser;
use crate::models::{Fee, FeeWithStudent, Seat, Student, StudentWithSeat};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(get_dashboard))
}

#[derive(Debug, Serialize)]
struct DashboardResponse {
    seats: Vec<Seat>,
    students: Vec<StudentWithSeat>,
    fees: Vec<FeeWithStudent>,
}

// GET /api/dashboard
async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    // Места по номерам, студенты по алфавиту, платежи свежими сроками вперед
    let (seats, students, fees) = futures::try_join!(
        Seat::fetch_all(&state.db),
        Student::fetch_with_seats(&state.db),
        Fee::fetch_with_students(&state.db),
    )?;

    Ok(Json(DashboardResponse {
        seats,
        students,
        fees,
    }))
}
