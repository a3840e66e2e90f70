//! # cmpiutil
//!
//! Helpers for writing [CMPI] providers, the plugins a CIM object manager (the broker)
//! loads to serve management classes.
//!
//! The crate covers the parts every provider ends up writing:
//!
//! * typed reads of arguments, properties and object-path keys ([`args_util`], [`instance_util`]),
//! * an append-only [`InstList`] to collect results in,
//! * checking that a reference names a given instance ([`instance_util::compare_ref`]),
//! * parsing embedded instances passed as CIM-XML or MOF strings ([`eo_parser`]),
//! * a complete association provider driven by a table of handlers ([`std_association`]),
//! * a method provider validating arguments before dispatching ([`std_invokemethod`]).
//!
//! The broker itself is abstracted behind the [`Broker`] and [`ResultSink`] traits.
//! [`SimpleBroker`] and [`VecResult`] are in-memory implementations useful for tests and tools.
//!
//! # Reading values
//!
//! All values are [`Variant`]s. The getters check the type and borrow from the container:
//!
//! ```
//! # fn main() -> Result<(), cmpiutil::CMPIError> {
//! use cmpiutil::instance_util::{get_str_prop, get_u32_prop};
//! use cmpiutil::{Instance, ObjectPath};
//!
//! let op = ObjectPath::new("root/virt", "Xen_Memory").with_key("DeviceID", "dom1/mem");
//! let mut inst = Instance::new(&op);
//! inst.set_property("NumberOfBlocks", 4242u32);
//!
//! assert_eq!(get_u32_prop(&inst, "NumberOfBlocks")?, 4242);
//! assert_eq!(get_str_prop(&inst, "DeviceID")?, "dom1/mem");
//! assert!(get_u32_prop(&inst, "BlockSize").unwrap_err().is_not_found());
//! #   Ok(())
//! # }
//! ```
//!
//! Unsigned integer getters follow a [`TypingPolicy`]. The default policy is weak: any
//! integer type is accepted and truncated to the requested width. The `strict-types`
//! feature makes the exact type required.
//!
//! # Using strongly typed data structures
//!
//! Using `serde`, an instance can be turned into a struct:
//!
//! ```
//! # fn main() -> Result<(), cmpiutil::CMPIError> {
//! use cmpiutil::{Instance, ObjectPath};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug)]
//! #[serde(rename_all = "PascalCase")]
//! struct ComputerSystem {
//!     name: String,
//!     enabled_state: u16,
//! }
//!
//! let op = ObjectPath::new("root/virt", "Xen_ComputerSystem").with_key("Name", "dom1");
//! let mut inst = Instance::new(&op);
//! inst.set_property("EnabledState", 2u16);
//!
//! let system: ComputerSystem = inst.into_desr()?;
//! assert_eq!(system.name, "dom1");
//! #   Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! Diagnostics go through the `log` crate. Providers that don't install a logger of their own
//! can call [`debug_util::init`] to honor the `CU_DEBUG` environment variable.
//!
//! [CMPI]: https://www.opengroup.org/cmpi

#[macro_use]
pub mod accessor;

pub mod args;
pub mod args_util;
pub mod broker;
pub mod context;
pub mod datetime;
pub mod de;
pub mod debug_util;
pub mod eo_parser;
pub mod inst_list;
pub mod instance;
pub mod instance_util;
pub mod object_path;
pub mod rc;
pub mod std_association;
pub mod std_invokemethod;
pub mod utils;
pub mod variant;


pub use args::Args;
pub use broker::{Broker, ResultSink, SimpleBroker, VecResult};
pub use context::Context;
pub use datetime::CIMDateTime;
pub use de::from_instance;
pub use eo_parser::parse_embedded_instance;
pub use inst_list::InstList;
pub use instance::Instance;
pub use object_path::ObjectPath;
pub use rc::CMPIrc;
pub use std_association::{AssocInfo, StdAssoc, StdAssociationMI};
pub use std_invokemethod::{MethodArg, MethodHandler, StdInvokeMethodMI};
pub use utils::{CMPIError, CMPIResult, CMPIStatus};
pub use variant::{CIMType, TypingPolicy, Variant};

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
