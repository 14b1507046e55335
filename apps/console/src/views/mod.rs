//! Table views over the API resources, with client-side sorting.

pub mod applications;
pub mod companies;
pub mod documents;
pub mod render;
pub mod sidebar;
pub mod sort;

pub use render::{print_error, print_success};
