//! HTTP request handlers.

pub mod annotation;
pub mod document;
