use std::sync::Arc;
use tracing::{error, info};

use crate::AppState;

// Фоновая разметка просроченных платежей. Единственный производитель
// статуса `overdue`: панель его только читает и фильтрует.
pub struct OverdueService {
    state: Arc<AppState>,
}

impl OverdueService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Переводит неоплаченные платежи с прошедшим сроком в `overdue`.
    pub async fn mark_overdue_fees(&self) {
        let result = sqlx::query(
            "UPDATE fees SET status = 'overdue', updated_at = NOW()
             WHERE status IN ('pending', 'partial') AND due_date < CURRENT_DATE",
        )
        .execute(&self.state.db.pool)
        .await;

        match result {
            Ok(r) if r.rows_affected() > 0 => {
                info!("💰 {} платежей помечено как просроченные", r.rows_affected());
            }
            Ok(_) => {}
            Err(e) => error!("Failed to mark overdue fees: {:?}", e),
        }
    }
}
