//! seating.rs
//!
//! Схема зала: чистая проекция без записей в базу.
//!
//! - Места группируются по трем фиксированным секциям и сортируются по
//!   числовой части номера.
//! - Занятость выводится сканированием списка студентов по seat_id,
//!   а не из хранимого статуса места; `maintenance` берется из статуса.
//! - Три сводных счетчика пересчитываются тем же сканированием.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::middleware::AdminUser;
use crate::models::{Seat, Student};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/seating", get(get_seating))
}

// Три фиксированные секции зала
const SECTIONS: [(&str, &str); 3] = [
    ("left", "Left Section (1-13)"),
    ("front", "Front Section (14-19)"),
    ("right", "Right Section (20-30)"),
];

#[derive(Debug, Serialize)]
struct Occupant {
    id: Uuid,
    name: String,
    student_id: String,
}

#[derive(Debug, Serialize)]
struct SeatTile {
    id: Uuid,
    seat_number: String,
    status: String,
    occupant: Option<Occupant>,
}

#[derive(Debug, Serialize)]
struct SectionView {
    section: &'static str,
    label: &'static str,
    seats: Vec<SeatTile>,
}

#[derive(Debug, PartialEq, Serialize)]
struct SeatingSummary {
    available: usize,
    occupied: usize,
    maintenance: usize,
}

#[derive(Debug, Serialize)]
struct SeatingResponse {
    sections: Vec<SectionView>,
    summary: SeatingSummary,
}

// GET /api/seating
async fn get_seating(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let seats = Seat::fetch_all(&state.db).await?;
    let students = Student::fetch_all(&state.db).await?;

    Ok(Json(build_layout(seats, &students)))
}

/* ---------- проекция ---------- */

fn occupant_of<'a>(students: &'a [Student], seat_id: Uuid) -> Option<&'a Student> {
    students.iter().find(|s| s.seat_id == Some(seat_id))
}

fn build_layout(seats: Vec<Seat>, students: &[Student]) -> SeatingResponse {
    let mut summary = SeatingSummary {
        available: 0,
        occupied: 0,
        maintenance: 0,
    };

    for seat in &seats {
        let occupant = occupant_of(students, seat.id);
        if occupant.is_some() {
            summary.occupied += 1;
        }
        if seat.status == "available" && occupant.is_none() {
            summary.available += 1;
        }
        if seat.status == "maintenance" {
            summary.maintenance += 1;
        }
        // Хранимый статус и наблюдаемая занятость могут разойтись
        // при сбое между шагами записи - показываем наблюдаемое, но логируем
        if (seat.status == "occupied") != occupant.is_some() && seat.status != "maintenance" {
            tracing::warn!(
                "Место {}: статус '{}' расходится с занятостью (студент: {})",
                seat.seat_number,
                seat.status,
                occupant.map(|s| s.student_id.as_str()).unwrap_or("нет")
            );
        }
    }

    let mut sections = Vec::with_capacity(SECTIONS.len());
    for (section, label) in SECTIONS {
        let mut section_seats: Vec<&Seat> =
            seats.iter().filter(|s| s.section == section).collect();
        section_seats.sort_by_key(|s| Seat::ordinal(&s.seat_number));

        let tiles = section_seats
            .into_iter()
            .map(|seat| SeatTile {
                id: seat.id,
                seat_number: seat.seat_number.clone(),
                status: seat.status.clone(),
                occupant: occupant_of(students, seat.id).map(|s| Occupant {
                    id: s.id,
                    name: s.name.clone(),
                    student_id: s.student_id.clone(),
                }),
            })
            .collect();

        sections.push(SectionView {
            section,
            label,
            seats: tiles,
        });
    }

    SeatingResponse { sections, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn seat(number: &str, section: &str, status: &str) -> Seat {
        let now = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Seat {
            id: Uuid::new_v4(),
            seat_number: number.to_string(),
            section: section.to_string(),
            status: status.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn student(name: &str, seat_id: Option<Uuid>) -> Student {
        let now = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Student {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name),
            phone: "+7 700 000 00 00".to_string(),
            student_id: format!("STU-{}", name),
            seat_id,
            registration_date: now.date(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn groups_by_section_and_sorts_by_ordinal() {
        let seats = vec![
            seat("L10", "left", "available"),
            seat("L2", "left", "available"),
            seat("F14", "front", "available"),
            seat("L07", "left", "available"),
        ];
        let layout = build_layout(seats, &[]);

        assert_eq!(layout.sections.len(), 3);
        let left: Vec<&str> = layout.sections[0]
            .seats
            .iter()
            .map(|t| t.seat_number.as_str())
            .collect();
        assert_eq!(left, vec!["L2", "L07", "L10"]);
        assert_eq!(layout.sections[1].seats.len(), 1);
        assert!(layout.sections[2].seats.is_empty());
    }

    #[test]
    fn occupancy_comes_from_student_scan_not_status() {
        // статус места отстал (available), но студент его занимает
        let stale = seat("L01", "left", "available");
        let occupant = student("aigerim", Some(stale.id));
        let layout = build_layout(vec![stale], &[occupant]);

        let tile = &layout.sections[0].seats[0];
        assert!(tile.occupant.is_some());
        assert_eq!(
            layout.summary,
            SeatingSummary {
                available: 0,
                occupied: 1,
                maintenance: 0
            }
        );
    }

    #[test]
    fn maintenance_is_trusted_from_status() {
        let layout = build_layout(vec![seat("R20", "right", "maintenance")], &[]);
        assert_eq!(
            layout.summary,
            SeatingSummary {
                available: 0,
                occupied: 0,
                maintenance: 1
            }
        );
        assert_eq!(layout.sections[2].seats[0].status, "maintenance");
    }

    #[test]
    fn summary_counts_over_mixed_layout() {
        let s1 = seat("L01", "left", "occupied");
        let s2 = seat("L02", "left", "available");
        let s3 = seat("F14", "front", "maintenance");
        let occupant = student("dana", Some(s1.id));

        let layout = build_layout(vec![s1, s2, s3], &[occupant]);
        assert_eq!(
            layout.summary,
            SeatingSummary {
                available: 1,
                occupied: 1,
                maintenance: 1
            }
        );
    }
}
