//! Reusable UI components

pub mod breadcrumbs;
pub mod entity_form;
pub mod entity_table;
pub mod inline_error;
pub mod loading;
