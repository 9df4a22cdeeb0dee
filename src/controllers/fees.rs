//! fees.rs
//!
//! Управление платежами: список с фильтром и сводными суммами, отметка об
//! оплате, ручное добавление платежа.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::middleware::AdminUser;
use crate::models::{Fee, FeeWithStudent};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/fees", get(list_fees))
        .route("/fees", post(create_fee))
        .route("/fees/{id}/paid", patch(mark_fee_paid))
}

/* ---------- фильтр и сводка ---------- */

// Сводные суммы считаются по amount, не по amount_paid:
// total по отфильтрованному набору, остальные три - по полному набору
#[derive(Debug, PartialEq, Serialize)]
struct FeeSummary {
    total_amount: f64,
    paid_amount: f64,
    pending_amount: f64,
    overdue_amount: f64,
}

#[derive(Debug, Serialize)]
struct FeesResponse {
    fees: Vec<FeeWithStudent>,
    summary: FeeSummary,
}

fn sum_by_status(fees: &[FeeWithStudent], status: &str) -> f64 {
    fees.iter()
        .filter(|f| f.fee.status == status)
        .map(|f| f.fee.amount)
        .sum()
}

fn apply_filter(all: Vec<FeeWithStudent>, filter: &str) -> FeesResponse {
    let summary_base = FeeSummary {
        total_amount: 0.0,
        paid_amount: sum_by_status(&all, "paid"),
        pending_amount: sum_by_status(&all, "pending"),
        overdue_amount: sum_by_status(&all, "overdue"),
    };

    let fees: Vec<FeeWithStudent> = all
        .into_iter()
        .filter(|f| filter == "all" || f.fee.status == filter)
        .collect();

    let summary = FeeSummary {
        total_amount: fees.iter().map(|f| f.fee.amount).sum(),
        ..summary_base
    };

    FeesResponse { fees, summary }
}

/* ---------- ПЛАТЕЖИ ---------- */

#[derive(Debug, Deserialize)]
pub struct FeesQuery {
    pub status: Option<String>,
}

// GET /api/fees?status=all|pending|paid|overdue
async fn list_fees(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<FeesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = params.status.as_deref().unwrap_or("all");
    if !matches!(filter, "all" | "pending" | "paid" | "overdue") {
        return Err(ApiError::BadRequest(
            "status должен быть all | pending | paid | overdue".to_string(),
        ));
    }

    // полный набор читается каждый раз; фильтр и суммы - поверх него
    let all = Fee::fetch_with_students(&state.db).await?;
    Ok(Json(apply_filter(all, filter)))
}

// PATCH /api/fees/{id}/paid
//
// Доступно для любого текущего статуса; повторная отметка уже оплаченного
// платежа просто обновляет дату оплаты.
async fn mark_fee_paid(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let today = Utc::now().date_naive();

    let updated = sqlx::query(
        "UPDATE fees SET status = 'paid', paid_date = $1, updated_at = NOW() WHERE id = $2",
    )
    .bind(today)
    .bind(id)
    .execute(&state.db.pool)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(ApiError::NotFound("Платеж не найден"));
    }

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Платеж отмечен как оплаченный", "paid_date": today })),
    ))
}

/* ---------- ручное добавление ---------- */

fn default_fee_type() -> String {
    "monthly".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateFeeRequest {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default = "default_fee_type")]
    pub fee_type: String,
    #[serde(default)]
    pub due_date: String,
}

#[derive(Debug, PartialEq)]
struct NewFee {
    student_id: Uuid,
    amount: f64,
    fee_type: String,
    due_date: NaiveDate,
}

fn validate_new_fee(req: &CreateFeeRequest) -> Result<NewFee, BTreeMap<&'static str, String>> {
    let mut errors: BTreeMap<&'static str, String> = BTreeMap::new();

    let student_id = match Uuid::parse_str(req.student_id.trim()) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.insert("student_id", "Student is required".to_string());
            None
        }
    };

    let amount = match req.amount.trim().parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.insert("amount", "Amount must be a number".to_string());
            None
        }
    };

    if !matches!(req.fee_type.as_str(), "registration" | "monthly" | "penalty") {
        errors.insert("fee_type", "Unknown fee type".to_string());
    }

    let due_date = match NaiveDate::parse_from_str(req.due_date.trim(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.insert("due_date", "Due date is required".to_string());
            None
        }
    };

    match (student_id, amount, due_date) {
        (Some(student_id), Some(amount), Some(due_date)) if errors.is_empty() => Ok(NewFee {
            student_id,
            amount,
            fee_type: req.fee_type.clone(),
            due_date,
        }),
        _ => Err(errors),
    }
}

// POST /api/fees
//
// Новый платеж всегда вставляется со статусом `pending`, независимо от суммы.
async fn create_fee(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(req): Json<CreateFeeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new_fee = validate_new_fee(&req).map_err(ApiError::Validation)?;

    let fee = sqlx::query_as::<_, Fee>(
        r#"
        INSERT INTO fees (student_id, amount, fee_type, due_date, status)
        VALUES ($1, $2, $3, $4, 'pending')
        RETURNING *
        "#,
    )
    .bind(new_fee.student_id)
    .bind(new_fee.amount)
    .bind(&new_fee.fee_type)
    .bind(new_fee.due_date)
    .fetch_one(&state.db.pool)
    .await
    .map_err(|e| match &e {
        // несуществующий студент распознается по нарушению внешнего ключа
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            ApiError::field("student_id", "Unknown student")
        }
        _ => ApiError::from_db(e),
    })?;

    Ok((StatusCode::CREATED, Json(fee)))
}
