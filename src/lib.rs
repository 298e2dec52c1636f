//! AKACorpTech website: public marketing pages, a blog, a contact inbox and
//! an authenticated admin panel kept in sync with the backing store through
//! a process-wide query cache.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
