mod metadata;
mod rating;

pub use metadata::*;
pub use rating::*;
