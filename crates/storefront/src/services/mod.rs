//! Business services for the storefront.

pub mod auth;
pub mod cart;
pub mod checkout;
