//! # Utility Modules
//!
//! Supporting utilities used throughout the codec implementation.
//!
//! ## Components
//! - **Octets**: Fixed-width big-endian integer reads and writes over byte
//!   slices, the primitive layer under the header and packet codecs

pub mod octets;

// Re-export the extension traits so callers can pull in one path
pub use octets::{OctetsExt, OctetsMutExt};
