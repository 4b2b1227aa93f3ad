pub mod appointments;
pub mod availability;
pub mod craftsmen;
pub mod health;
