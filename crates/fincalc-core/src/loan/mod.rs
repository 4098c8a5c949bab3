pub mod emi;
pub mod events;
pub mod schedule;
pub mod summary;
