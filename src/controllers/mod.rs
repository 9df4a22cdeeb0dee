pub mod dashboard;
pub mod fees;
pub mod seating;
pub mod seats;
pub mod students;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(dashboard::routes())
        .merge(seating::routes())
        .merge(seats::routes())
        .merge(students::routes())
        .merge(fees::routes())
}
