pub mod course;
pub mod portal;
pub mod user;
