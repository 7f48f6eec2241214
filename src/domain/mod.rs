pub mod market;
pub mod snapshot;
pub mod sport;

pub use market::*;
pub use snapshot::*;
pub use sport::*;
