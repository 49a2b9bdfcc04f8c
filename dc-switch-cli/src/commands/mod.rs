pub mod launcher;
pub mod profile;
