//! students.rs
//!
//! Регистрация, список и удаление студентов.
//!
//! - Регистрация: валидация всех полей до единого обращения к базе, затем
//!   три записи (студент, место, платеж) в одной транзакции.
//! - Удаление: освобождение места и удаление студента в одной транзакции.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::middleware::AdminUser;
use crate::models::{Fee, Student};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/students", get(list_students))
        .route("/students", post(register_student))
        .route("/students/{id}", delete(remove_student))
}

/* ---------- валидация формы ---------- */

fn default_amount_paid() -> String {
    "0".to_string()
}

// Поля приходят строками, как их держит форма панели
#[derive(Debug, Deserialize)]
pub struct RegisterStudentRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub seat_id: String,
    #[serde(default)]
    pub registration_date: String,
    #[serde(default)]
    pub monthly_fee: String,
    #[serde(default = "default_amount_paid")]
    pub amount_paid: String,
}

// Проверенная форма с разобранными значениями
#[derive(Debug, PartialEq)]
struct RegistrationForm {
    name: String,
    email: String,
    phone: String,
    student_id: String,
    seat_id: Uuid,
    registration_date: NaiveDate,
    monthly_fee: f64,
    amount_paid: f64,
}

// Простая форма local@domain.tld: без пробелов, одна @, точка в домене
fn email_shape_ok(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

// Все правила формы регистрации; база не трогается, пока есть хоть одна ошибка
fn validate_registration(
    req: &RegisterStudentRequest,
) -> Result<RegistrationForm, BTreeMap<&'static str, String>> {
    let mut errors: BTreeMap<&'static str, String> = BTreeMap::new();

    let name = req.name.trim();
    if name.is_empty() {
        errors.insert("name", "Name is required".to_string());
    }

    let email = req.email.trim().to_lowercase();
    if email.is_empty() {
        errors.insert("email", "Email is required".to_string());
    } else if !email_shape_ok(&email) {
        errors.insert("email", "Please enter a valid email address".to_string());
    }

    let phone = req.phone.trim();
    if phone.is_empty() {
        errors.insert("phone", "Phone is required".to_string());
    }

    let student_id = req.student_id.trim();
    if student_id.is_empty() {
        errors.insert("student_id", "Student ID is required".to_string());
    }

    let seat_id = match Uuid::parse_str(req.seat_id.trim()) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.insert("seat_id", "Please select a seat".to_string());
            None
        }
    };

    let registration_date = match NaiveDate::parse_from_str(req.registration_date.trim(), "%Y-%m-%d")
    {
        Ok(date) => Some(date),
        Err(_) => {
            errors.insert(
                "registration_date",
                "Registration date is required".to_string(),
            );
            None
        }
    };

    let monthly_fee = match req.monthly_fee.trim().parse::<f64>() {
        Ok(v) if v > 0.0 => Some(v),
        _ => {
            errors.insert(
                "monthly_fee",
                "Monthly fee must be greater than 0".to_string(),
            );
            None
        }
    };

    let amount_paid = match req.amount_paid.trim().parse::<f64>() {
        Ok(v) if v < 0.0 => {
            errors.insert("amount_paid", "Amount paid cannot be negative".to_string());
            None
        }
        Ok(v) => Some(v),
        Err(_) => {
            errors.insert("amount_paid", "Amount paid must be a number".to_string());
            None
        }
    };

    if let (Some(fee), Some(paid)) = (monthly_fee, amount_paid) {
        if paid > fee {
            errors.insert(
                "amount_paid",
                "Amount paid cannot exceed monthly fee".to_string(),
            );
        }
    }

    match (seat_id, registration_date, monthly_fee, amount_paid) {
        (Some(seat_id), Some(registration_date), Some(monthly_fee), Some(amount_paid))
            if errors.is_empty() =>
        {
            Ok(RegistrationForm {
                name: name.to_string(),
                email,
                phone: phone.to_string(),
                student_id: student_id.to_string(),
                seat_id,
                registration_date,
                monthly_fee,
                amount_paid,
            })
        }
        _ => Err(errors),
    }
}

/* ---------- СТУДЕНТЫ ---------- */

// GET /api/students
async fn list_students(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let students = Student::fetch_with_seats(&state.db).await?;
    Ok(Json(students))
}

// POST /api/students
async fn register_student(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(req): Json<RegisterStudentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let form = validate_registration(&req).map_err(ApiError::Validation)?;

    let mut tx = state.db.pool.begin().await?;

    // 1) студент; нарушения уникальности превращаются в ошибку поля
    let student = sqlx::query_as::<_, Student>(
        r#"
        INSERT INTO students (name, email, phone, student_id, seat_id, registration_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&form.name)
    .bind(&form.email)
    .bind(&form.phone)
    .bind(&form.student_id)
    .bind(form.seat_id)
    .bind(form.registration_date)
    .fetch_one(&mut *tx)
    .await
    .map_err(ApiError::from_db)?;

    // 2) место переводится available -> occupied; выбранное место могло
    // уйти между загрузкой формы и отправкой
    let seat_updated = sqlx::query(
        "UPDATE seats SET status = 'occupied', updated_at = NOW()
         WHERE id = $1 AND status = 'available'",
    )
    .bind(form.seat_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if seat_updated == 0 {
        // транзакция откатится вместе со вставленным студентом
        return Err(ApiError::field("seat_id", "Selected seat is not available"));
    }

    // 3) первый месячный платеж
    if form.monthly_fee > 0.0 {
        let status = Fee::derive_status(form.amount_paid, form.monthly_fee);
        let due_date = Fee::next_due_date(form.registration_date);
        let paid_date = (status == "paid").then_some(form.registration_date);

        sqlx::query(
            r#"
            INSERT INTO fees (student_id, amount, amount_paid, fee_type, due_date, paid_date, status)
            VALUES ($1, $2, $3, 'monthly', $4, $5, $6)
            "#,
        )
        .bind(student.id)
        .bind(form.monthly_fee)
        .bind(form.amount_paid)
        .bind(due_date)
        .bind(paid_date)
        .bind(status)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        "Студент {} зарегистрирован на место {}",
        student.student_id,
        form.seat_id
    );

    Ok((StatusCode::CREATED, Json(student)))
}

// DELETE /api/students/{id}
async fn remove_student(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = state.db.pool.begin().await?;

    let seat_id: Option<Option<Uuid>> =
        sqlx::query_scalar("SELECT seat_id FROM students WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some(seat_id) = seat_id else {
        return Err(ApiError::NotFound("Студент не найден"));
    };

    // сначала освобождаем место, затем удаляем студента (платежи каскадом)
    if let Some(seat_id) = seat_id {
        sqlx::query("UPDATE seats SET status = 'available', updated_at = NOW() WHERE id = $1")
            .bind(seat_id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("DELETE FROM students WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Студент {} удален, место освобождено", id);

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Студент удален, место освобождено" })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> RegisterStudentRequest {
        RegisterStudentRequest {
            name: "Aruzhan Bekova".to_string(),
            email: "Aruzhan@Example.COM".to_string(),
            phone: "+7 701 123 45 67".to_string(),
            student_id: "STU001".to_string(),
            seat_id: Uuid::new_v4().to_string(),
            registration_date: "2025-06-01".to_string(),
            monthly_fee: "1000".to_string(),
            amount_paid: "0".to_string(),
        }
    }

    #[test]
    fn accepts_valid_form_and_normalizes() {
        let mut req = valid_request();
        req.name = "  Aruzhan Bekova  ".to_string();
        let form = validate_registration(&req).unwrap();
        assert_eq!(form.name, "Aruzhan Bekova");
        assert_eq!(form.email, "aruzhan@example.com");
        assert_eq!(form.monthly_fee, 1000.0);
        assert_eq!(form.amount_paid, 0.0);
    }

    #[test]
    fn rejects_blank_required_fields() {
        for (field, blank) in [
            ("name", "   "),
            ("email", ""),
            ("phone", " "),
            ("student_id", ""),
        ] {
            let mut req = valid_request();
            match field {
                "name" => req.name = blank.to_string(),
                "email" => req.email = blank.to_string(),
                "phone" => req.phone = blank.to_string(),
                _ => req.student_id = blank.to_string(),
            }
            let errors = validate_registration(&req).unwrap_err();
            assert!(errors.contains_key(field), "нет ошибки для {}", field);
        }
    }

    #[test]
    fn rejects_malformed_email() {
        for bad in ["plain", "no@tld", "two@@at.com", "sp ace@mail.com", "@x.com"] {
            let mut req = valid_request();
            req.email = bad.to_string();
            let errors = validate_registration(&req).unwrap_err();
            assert_eq!(
                errors.get("email").map(String::as_str),
                Some("Please enter a valid email address"),
                "ожидалась ошибка для {}",
                bad
            );
        }
        assert!(email_shape_ok("a@b.c"));
        assert!(email_shape_ok("first.last@mail.example.com"));
    }

    #[test]
    fn rejects_missing_seat_choice() {
        let mut req = valid_request();
        req.seat_id = String::new();
        let errors = validate_registration(&req).unwrap_err();
        assert_eq!(
            errors.get("seat_id").map(String::as_str),
            Some("Please select a seat")
        );
    }

    #[test]
    fn rejects_missing_registration_date() {
        let mut req = valid_request();
        req.registration_date = String::new();
        let errors = validate_registration(&req).unwrap_err();
        assert!(errors.contains_key("registration_date"));
    }

    #[test]
    fn rejects_non_positive_or_garbled_fee() {
        for bad in ["0", "-10", "", "abc"] {
            let mut req = valid_request();
            req.monthly_fee = bad.to_string();
            let errors = validate_registration(&req).unwrap_err();
            assert_eq!(
                errors.get("monthly_fee").map(String::as_str),
                Some("Monthly fee must be greater than 0"),
                "ожидалась ошибка для {:?}",
                bad
            );
        }
    }

    #[test]
    fn rejects_bad_amount_paid() {
        let mut req = valid_request();
        req.amount_paid = "-1".to_string();
        let errors = validate_registration(&req).unwrap_err();
        assert_eq!(
            errors.get("amount_paid").map(String::as_str),
            Some("Amount paid cannot be negative")
        );

        let mut req = valid_request();
        req.amount_paid = "1500".to_string();
        let errors = validate_registration(&req).unwrap_err();
        assert_eq!(
            errors.get("amount_paid").map(String::as_str),
            Some("Amount paid cannot exceed monthly fee")
        );
    }

    #[test]
    fn amount_paid_may_equal_fee() {
        let mut req = valid_request();
        req.amount_paid = "1000".to_string();
        let form = validate_registration(&req).unwrap();
        assert_eq!(form.amount_paid, form.monthly_fee);
        assert_eq!(Fee::derive_status(form.amount_paid, form.monthly_fee), "paid");
    }

    #[test]
    fn single_bad_field_reports_only_that_field() {
        let mut req = valid_request();
        req.phone = String::new();
        let errors = validate_registration(&req).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("phone"));
    }
}
