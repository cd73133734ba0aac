//! View state derived from URLs, forms and fetched data.
//!
//! Everything here is pure over (route, query parameters, loaded data) except
//! [`contact::submit`], which performs the one submission request.

pub mod contact;
pub mod gallery;
pub mod sanitize;
pub mod travel;
