//! Input DTOs accepted by [`ProjectStore`](crate::store::ProjectStore).

pub mod project;
pub mod take;
