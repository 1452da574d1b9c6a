//! Question Edit API Library
//!
//! Ownership-checked, rule-validated editing of draft questions over HTTP.

pub mod api;
pub mod domain;
pub mod infrastructure;
