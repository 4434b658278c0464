//! Property data attached to pores and throats.
//!
//! - [`property`]: typed arrays and the padding rules used when they grow.
//! - [`property_store`]: the name-keyed, length-checked store owned by every
//!   network.

pub mod property;
pub mod property_store;

pub use property::{PropertyArray, PropertyKind, PropertyScalar};
pub use property_store::PropertyStore;
