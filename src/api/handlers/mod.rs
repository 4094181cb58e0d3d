pub mod compress;
pub mod health;
