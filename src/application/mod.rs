//! Application services: cached reads, mutations, realtime and auth.

pub mod auth;
pub mod context;
pub mod dashboard;
pub mod editor;
pub mod error;
pub mod mutations;
pub mod notify;
pub mod query;
pub mod realtime;
pub mod repos;
pub mod stream;
