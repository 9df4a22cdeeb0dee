use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::Seat;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub student_id: String,
    pub seat_id: Option<Uuid>,
    pub registration_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// Студент вместе с занимаемым местом (LEFT JOIN)
#[derive(Debug, Clone, Serialize)]
pub struct StudentWithSeat {
    #[serde(flatten)]
    pub student: Student,
    pub seat: Option<Seat>,
}

impl Student {
    pub async fn fetch_all(db: &crate::database::Database) -> Result<Vec<Student>, sqlx::Error> {
        sqlx::query_as::<_, Student>("SELECT * FROM students ORDER BY name")
            .fetch_all(&db.pool)
            .await
    }

    // Список студентов с местами, по алфавиту
    pub async fn fetch_with_seats(
        db: &crate::database::Database,
    ) -> Result<Vec<StudentWithSeat>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT st.id, st.name, st.email, st.phone, st.student_id, st.seat_id,
                   st.registration_date, st.created_at, st.updated_at,
                   se.id AS se_id, se.seat_number AS se_seat_number, se.section AS se_section,
                   se.status AS se_status, se.created_at AS se_created_at, se.updated_at AS se_updated_at
            FROM students st
            LEFT JOIN seats se ON se.id = st.seat_id
            ORDER BY st.name
            "#,
        )
        .fetch_all(&db.pool)
        .await?;

        let mut students = Vec::with_capacity(rows.len());
        for r in rows {
            let student = Student {
                id: r.get("id"),
                name: r.get("name"),
                email: r.get("email"),
                phone: r.get("phone"),
                student_id: r.get("student_id"),
                seat_id: r.get("seat_id"),
                registration_date: r.get("registration_date"),
                created_at: r.get("created_at"),
                updated_at: r.get("updated_at"),
            };
            let seat = r.try_get::<Uuid, _>("se_id").ok().map(|seat_id| Seat {
                id: seat_id,
                seat_number: r.get("se_seat_number"),
                section: r.get("se_section"),
                status: r.get("se_status"),
                created_at: r.get("se_created_at"),
                updated_at: r.get("se_updated_at"),
            });
            students.push(StudentWithSeat { student, seat });
        }
        Ok(students)
    }
}
