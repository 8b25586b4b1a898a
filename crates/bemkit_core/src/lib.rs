//! Core algebra for bemkit: class-name descriptors and the token sets
//! they drive.

pub mod descriptor;
pub mod token_set;

pub use descriptor::{Descriptor, Scalar};
pub use token_set::TokenSet;
