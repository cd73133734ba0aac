//! Data models mirrored from the content API.
//!
//! All entities are read-only snapshots and keep the API's snake_case field
//! names in both directions.

mod contact;
mod image;
mod profile;
mod project;
mod tag;
mod travel;

pub use contact::*;
pub use image::*;
pub use profile::*;
pub use project::*;
pub use tag::*;
pub use travel::*;
