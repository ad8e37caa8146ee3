#![warn(missing_docs)]
//! Bundle a leaf certificate with the certificate of the CA that issued
//! it. The first PEM block of each input is re-encoded and the two are
//! written, leaf first, to a single file that can be handed to anything
//! that needs the chain for path validation.
//!
//! Nothing about the certificates themselves is checked: the issuer is not
//! required to be a CA, nor to have signed the leaf.

mod bundle;
pub use bundle::{read_first_block, run, Bundle, BundleArgs, ARGUMENT_COUNT};
mod error;
pub use error::Error;

/// A specialized `Result` type.
pub type Result<T> = std::result::Result<T, Error>;
