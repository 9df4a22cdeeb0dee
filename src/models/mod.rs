pub mod fee;
pub mod seat;
pub mod student;

pub use fee::{Fee, FeeWithStudent};
pub use seat::Seat;
pub use student::{Student, StudentWithSeat};
