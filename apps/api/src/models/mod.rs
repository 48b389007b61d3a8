pub mod document;
pub mod internship;
