use chrono::{Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::Student;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Fee {
    pub id: Uuid,
    pub student_id: Uuid,
    pub amount: f64,
    pub amount_paid: f64,
    pub fee_type: String,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// Платеж вместе с владельцем (LEFT JOIN)
#[derive(Debug, Clone, Serialize)]
pub struct FeeWithStudent {
    #[serde(flatten)]
    pub fee: Fee,
    pub student: Option<Student>,
}

impl Fee {
    /// Статус по соотношению оплаченного и начисленного:
    /// `paid` при paid >= amount, `partial` при 0 < paid < amount, иначе `pending`.
    pub fn derive_status(amount_paid: f64, amount: f64) -> &'static str {
        if amount_paid >= amount {
            "paid"
        } else if amount_paid > 0.0 {
            "partial"
        } else {
            "pending"
        }
    }

    /// Срок оплаты: один календарный месяц после даты регистрации.
    /// Конец месяца поджимается (31 января -> 28/29 февраля).
    pub fn next_due_date(from: NaiveDate) -> NaiveDate {
        from.checked_add_months(Months::new(1)).unwrap_or(from)
    }

    // Все платежи со студентами, свежие сроки первыми
    pub async fn fetch_with_students(
        db: &crate::database::Database,
    ) -> Result<Vec<FeeWithStudent>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT f.id, f.student_id, f.amount, f.amount_paid, f.fee_type,
                   f.due_date, f.paid_date, f.status, f.created_at, f.updated_at,
                   st.id AS st_id, st.name AS st_name, st.email AS st_email, st.phone AS st_phone,
                   st.student_id AS st_student_id, st.seat_id AS st_seat_id,
                   st.registration_date AS st_registration_date,
                   st.created_at AS st_created_at, st.updated_at AS st_updated_at
            FROM fees f
            LEFT JOIN students st ON st.id = f.student_id
            ORDER BY f.due_date DESC
            "#,
        )
        .fetch_all(&db.pool)
        .await?;

        let mut fees = Vec::with_capacity(rows.len());
        for r in rows {
            let fee = Fee {
                id: r.get("id"),
                student_id: r.get("student_id"),
                amount: r.get("amount"),
                amount_paid: r.get("amount_paid"),
                fee_type: r.get("fee_type"),
                due_date: r.get("due_date"),
                paid_date: r.get("paid_date"),
                status: r.get("status"),
                created_at: r.get("created_at"),
                updated_at: r.get("updated_at"),
            };
            let student = r.try_get::<Uuid, _>("st_id").ok().map(|id| Student {
                id,
                name: r.get("st_name"),
                email: r.get("st_email"),
                phone: r.get("st_phone"),
                student_id: r.get("st_student_id"),
                seat_id: r.get("st_seat_id"),
                registration_date: r.get("st_registration_date"),
                created_at: r.get("st_created_at"),
                updated_at: r.get("st_updated_at"),
            });
            fees.push(FeeWithStudent { fee, student });
        }
        Ok(fees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn status_fully_paid() {
        assert_eq!(Fee::derive_status(1000.0, 1000.0), "paid");
        assert_eq!(Fee::derive_status(1500.0, 1000.0), "paid");
    }

    #[test]
    fn status_partial() {
        assert_eq!(Fee::derive_status(400.0, 1000.0), "partial");
        assert_eq!(Fee::derive_status(0.01, 1000.0), "partial");
        assert_eq!(Fee::derive_status(999.99, 1000.0), "partial");
    }

    #[test]
    fn status_pending_when_nothing_paid() {
        assert_eq!(Fee::derive_status(0.0, 1000.0), "pending");
    }

    #[test]
    fn due_date_one_month_later() {
        let reg = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(
            Fee::next_due_date(reg),
            NaiveDate::from_ymd_opt(2025, 4, 15).unwrap()
        );
    }

    #[test]
    fn due_date_clamps_to_end_of_month() {
        let reg = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(
            Fee::next_due_date(reg),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
    }

    #[test]
    fn due_date_wraps_year() {
        let reg = NaiveDate::from_ymd_opt(2024, 12, 5).unwrap();
        assert_eq!(
            Fee::next_due_date(reg),
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
        );
    }

    proptest! {
        // Закон статуса как чистой функции от (paid, amount),
        // включая граничное равенство
        #[test]
        fn status_law(paid in 0.0f64..100_000.0, amount in 0.01f64..100_000.0) {
            let status = Fee::derive_status(paid, amount);
            if paid >= amount {
                prop_assert_eq!(status, "paid");
            } else if paid > 0.0 {
                prop_assert_eq!(status, "partial");
            } else {
                prop_assert_eq!(status, "pending");
            }
        }

        #[test]
        fn status_is_total(paid in proptest::num::f64::ANY, amount in proptest::num::f64::ANY) {
            // никакая пара не роняет функцию и результат всегда из словаря
            let status = Fee::derive_status(paid, amount);
            prop_assert!(matches!(status, "paid" | "partial" | "pending"));
        }
    }
}
