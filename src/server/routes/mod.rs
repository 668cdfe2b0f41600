pub mod classify;
pub mod feedback;
