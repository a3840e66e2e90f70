//! Typed reads out of loosely typed containers.
//!
//! Arguments, properties and object-path keys all hold [`Variant`]s. The getters here
//! look a name up, treat a null value as absent and check the stored type against
//! the requested one. Strings, references, instances and arrays are returned as
//! views borrowed from the container; scalars are copied out.
//!
//! The unsigned integer getters follow a [`TypingPolicy`]. Under the default weak
//! policy any integer type is accepted and truncated or widened to the requested
//! width, since brokers are not consistent about integer widths.

use crate::args::Args;
use crate::instance::Instance;
use crate::object_path::ObjectPath;
use crate::variant::{CIMType, TypingPolicy, Variant};
use crate::{CMPIError, CMPIResult};

/// A container values can be looked up in by name.
pub trait ValueSource {
    fn value_of(&self, name: &str) -> Option<&Variant>;

    /// The error reported when `name` is absent or null.
    fn missing(&self, name: &str) -> CMPIError;

    fn require(&self, name: &str) -> CMPIResult<&Variant> {
        match self.value_of(name) {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(self.missing(name)),
        }
    }
}

impl ValueSource for Args {
    fn value_of(&self, name: &str) -> Option<&Variant> {
        self.get_arg(name)
    }

    fn missing(&self, name: &str) -> CMPIError {
        CMPIError::MissingArgument(name.to_owned())
    }
}

impl ValueSource for Instance {
    fn value_of(&self, name: &str) -> Option<&Variant> {
        self.get_property(name)
    }

    fn missing(&self, name: &str) -> CMPIError {
        CMPIError::NoSuchProperty(name.to_owned())
    }
}

impl ValueSource for ObjectPath {
    fn value_of(&self, name: &str) -> Option<&Variant> {
        self.get_key(name)
    }

    fn missing(&self, name: &str) -> CMPIError {
        CMPIError::MissingKey(name.to_owned())
    }
}

fn mismatch(name: &str, expected: CIMType, found: &Variant) -> CMPIError {
    let found = if found.is_array() {
        format!("{}[]", found.cim_type())
    } else {
        found.cim_type().to_string()
    };

    CMPIError::mismatch(name, expected, found)
}

pub fn get_str<'a, S>(src: &'a S, name: &str) -> CMPIResult<&'a str>
where
    S: ValueSource + ?Sized,
{
    match src.require(name)? {
        Variant::String(s) => Ok(s.as_str()),
        other => Err(mismatch(name, CIMType::String, other)),
    }
}

pub fn get_bool<S>(src: &S, name: &str) -> CMPIResult<bool>
where
    S: ValueSource + ?Sized,
{
    match src.require(name)? {
        Variant::Bool(b) => Ok(*b),
        other => Err(mismatch(name, CIMType::Boolean, other)),
    }
}

pub fn get_ref<'a, S>(src: &'a S, name: &str) -> CMPIResult<&'a ObjectPath>
where
    S: ValueSource + ?Sized,
{
    match src.require(name)? {
        Variant::Ref(op) => Ok(op),
        other => Err(mismatch(name, CIMType::Reference, other)),
    }
}

pub fn get_inst<'a, S>(src: &'a S, name: &str) -> CMPIResult<&'a Instance>
where
    S: ValueSource + ?Sized,
{
    match src.require(name)? {
        Variant::Instance(inst) => Ok(inst),
        other => Err(mismatch(name, CIMType::Instance, other)),
    }
}

pub fn get_array<'a, S>(src: &'a S, name: &str) -> CMPIResult<&'a [Variant]>
where
    S: ValueSource + ?Sized,
{
    match src.require(name)? {
        Variant::Array(items) => Ok(items.as_slice()),
        other => Err(CMPIError::mismatch(name, "array", other.cim_type())),
    }
}

// Generates an unsigned getter honoring a typing policy.
macro_rules! uint_getter {
    ($fn_name:ident, $target_type:ty, $variant_type:ident, $cim_type:ident) => {
        pub fn $fn_name<S>(src: &S, name: &str, policy: TypingPolicy) -> CMPIResult<$target_type>
        where
            S: ValueSource + ?Sized,
        {
            let value = src.require(name)?;

            match (value, policy) {
                (Variant::$variant_type(n), _) => Ok(*n),
                (other, TypingPolicy::Weak) => match other.integer_bits() {
                    Some(bits) => Ok(bits as $target_type),
                    None => Err(mismatch(name, CIMType::$cim_type, other)),
                },
                (other, TypingPolicy::Strict) => Err(mismatch(name, CIMType::$cim_type, other)),
            }
        }
    };
}

uint_getter!(get_u16_with_policy, u16, UI2, UInt16);
uint_getter!(get_u32_with_policy, u32, UI4, UInt32);
uint_getter!(get_u64_with_policy, u64, UI8, UInt64);

// Named getters for one container type, all following the default typing policy.
macro_rules! container_getters {
    ($container:ty, $what:literal;
     $str_fn:ident, $bool_fn:ident, $ref_fn:ident, $inst_fn:ident, $array_fn:ident,
     $u16_fn:ident, $u32_fn:ident, $u64_fn:ident) => {
        #[doc = concat!("Get a string ", $what, ", borrowed from the container.")]
        pub fn $str_fn<'a>(container: &'a $container, name: &str) -> $crate::CMPIResult<&'a str> {
            $crate::accessor::get_str(container, name)
        }

        #[doc = concat!("Get a boolean ", $what, ".")]
        pub fn $bool_fn(container: &$container, name: &str) -> $crate::CMPIResult<bool> {
            $crate::accessor::get_bool(container, name)
        }

        #[doc = concat!("Get a reference ", $what, ".")]
        pub fn $ref_fn<'a>(
            container: &'a $container,
            name: &str,
        ) -> $crate::CMPIResult<&'a $crate::object_path::ObjectPath> {
            $crate::accessor::get_ref(container, name)
        }

        #[doc = concat!("Get an embedded instance ", $what, ".")]
        pub fn $inst_fn<'a>(
            container: &'a $container,
            name: &str,
        ) -> $crate::CMPIResult<&'a $crate::instance::Instance> {
            $crate::accessor::get_inst(container, name)
        }

        #[doc = concat!("Get an array ", $what, ".")]
        pub fn $array_fn<'a>(
            container: &'a $container,
            name: &str,
        ) -> $crate::CMPIResult<&'a [$crate::variant::Variant]> {
            $crate::accessor::get_array(container, name)
        }

        pub fn $u16_fn(container: &$container, name: &str) -> $crate::CMPIResult<u16> {
            $crate::accessor::get_u16_with_policy(container, name, Default::default())
        }

        pub fn $u32_fn(container: &$container, name: &str) -> $crate::CMPIResult<u32> {
            $crate::accessor::get_u32_with_policy(container, name, Default::default())
        }

        pub fn $u64_fn(container: &$container, name: &str) -> $crate::CMPIResult<u64> {
            $crate::accessor::get_u64_with_policy(container, name, Default::default())
        }
    };
}
