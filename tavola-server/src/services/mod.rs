//! Business operations spanning several tables

pub mod orders;
