//! Getters for method arguments and object-path keys.

use crate::args::Args;
use crate::object_path::ObjectPath;
use crate::variant::CIMType;

container_getters!(Args, "argument";
    get_str_arg, get_bool_arg, get_ref_arg, get_inst_arg, get_array_arg,
    get_u16_arg, get_u32_arg, get_u64_arg);

container_getters!(ObjectPath, "key of an object path";
    get_str_path, get_bool_path, get_ref_path, get_inst_path, get_array_path,
    get_u16_path, get_u32_path, get_u64_path);

/// Check that every one of `names` is present and non-null in `args`.
///
/// Returns the first missing name, or `None` if all are there.
pub fn check_args<'n>(args: &Args, names: &[&'n str]) -> Option<&'n str> {
    names.iter().copied().find(|name| match args.get_arg(name) {
        Some(value) => value.is_null(),
        None => true,
    })
}

/// The declared type of an argument, [`CIMType::Null`] if it is absent.
pub fn arg_type(args: &Args, name: &str) -> CIMType {
    args.get_arg(name)
        .map_or(CIMType::Null, |value| value.cim_type())
}
