//! Domain layer types and invariants.

pub mod blog;
pub mod contact;
pub mod entities;
pub mod error;
pub mod site;
pub mod text;
pub mod types;
