//! Deserializing instances into Rust types with `serde`.

pub mod instance_de;
pub mod variant_de;

pub use instance_de::from_instance;
