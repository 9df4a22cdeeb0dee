use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Seat {
    pub id: Uuid,
    pub seat_number: String,
    pub section: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Seat {
    // Все места, в порядке номеров
    pub async fn fetch_all(db: &crate::database::Database) -> Result<Vec<Seat>, sqlx::Error> {
        sqlx::query_as::<_, Seat>("SELECT * FROM seats ORDER BY seat_number")
            .fetch_all(&db.pool)
            .await
    }

    /// Числовая часть номера места: нецифровые символы отбрасываются,
    /// оставшиеся группы цифр склеиваются ("L07" -> 7, "L1" -> 1).
    /// Номер без цифр дает 0.
    pub fn ordinal(seat_number: &str) -> u32 {
        let digits: String = seat_number.chars().filter(char::is_ascii_digit).collect();
        digits.parse().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_strips_section_prefix() {
        assert_eq!(Seat::ordinal("L07"), 7);
        assert_eq!(Seat::ordinal("L1"), 1);
        assert_eq!(Seat::ordinal("R30"), 30);
    }

    #[test]
    fn ordinal_concatenates_digit_groups() {
        // "A1B2" склеивается в 12, а не в 1 или 2
        assert_eq!(Seat::ordinal("A1B2"), 12);
        assert_eq!(Seat::ordinal("1-2"), 12);
    }

    #[test]
    fn ordinal_without_digits_is_zero() {
        assert_eq!(Seat::ordinal("XYZ"), 0);
        assert_eq!(Seat::ordinal(""), 0);
    }

    #[test]
    fn ordinal_sorts_numerically_not_lexically() {
        let mut numbers = vec!["L10", "L2", "L07", "L1"];
        numbers.sort_by_key(|n| Seat::ordinal(n));
        assert_eq!(numbers, vec!["L1", "L2", "L07", "L10"]);
    }
}
