//! Business services for the admin API.

pub mod auth;
