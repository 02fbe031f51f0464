//! Page components for the admin interface

pub mod dashboard;
pub mod login;
pub mod management;
pub mod not_found;
