mod fixture;
mod metadata;
mod role;

pub use fixture::*;
pub use metadata::*;
pub use role::*;
