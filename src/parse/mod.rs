pub mod partition;
pub mod types;

pub use partition::{partition, scan};
pub use types::{Boundary, Directive, ParseError, Scan};
