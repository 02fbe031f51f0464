//! Request handlers

pub mod analytics;
pub mod email;
pub mod entities;
pub mod health;
pub mod leads;
pub mod session;
