//! Utilities: logging, validation, password hashing

pub mod logger;
pub mod password;
pub mod validation;
