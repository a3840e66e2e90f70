//! CIM-XML embedded instances.
//!
//! Only the instance subset of CIM-XML is understood:
//!
//! ```text
//! <INSTANCE CLASSNAME="...">
//!   <PROPERTY NAME="..." TYPE="..."><VALUE>...</VALUE></PROPERTY>
//!   <PROPERTY.ARRAY NAME="..." TYPE="...">
//!     <VALUE.ARRAY><VALUE>...</VALUE>...</VALUE.ARRAY>
//!   </PROPERTY.ARRAY>
//! </INSTANCE>
//! ```

use log::{debug, trace};
use roxmltree::{Document, Node};
use std::convert::TryFrom;

use crate::broker::Broker;
use crate::instance::Instance;
use crate::variant::{CIMType, Variant};
use crate::{CMPIError, CMPIResult};

fn attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name().eq_ignore_ascii_case(name))
        .map(|a| a.value())
}

fn is_named(node: Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name().eq_ignore_ascii_case(name)
}

// All text below `node`, like the DOM `textContent`.
fn content(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

fn digit_value(b: u8, radix: u32) -> Option<u64> {
    (b as char).to_digit(radix).map(u64::from)
}

// Accumulate digits of `radix` from the start of `s`; `None` if there are none.
fn scan_digits(s: &[u8], radix: u32) -> Option<u64> {
    let mut value: u64 = 0;
    let mut seen = false;

    for &b in s {
        let d = match digit_value(b, radix) {
            Some(d) => d,
            None => break,
        };

        seen = true;
        value = value
            .checked_mul(u64::from(radix))
            .and_then(|v| v.checked_add(d))
            .unwrap_or(u64::MAX);
    }

    if seen {
        Some(value)
    } else {
        None
    }
}

fn split_sign(s: &str) -> (bool, &[u8]) {
    let s = s.trim_start().as_bytes();

    match s.first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    }
}

/// Scan a signed integer the way `scanf("%i")` does: an optional sign, then
/// a hexadecimal (`0x`), octal (leading `0`) or decimal number.
/// Trailing garbage is ignored and out of range values saturate.
pub fn scan_signed(s: &str) -> Option<i64> {
    let (negative, digits) = split_sign(s);

    let magnitude = match digits {
        [b'0', b'x', rest @ ..] | [b'0', b'X', rest @ ..] => scan_digits(rest, 16).unwrap_or(0),
        [b'0', rest @ ..] => scan_digits(rest, 8).unwrap_or(0),
        _ => scan_digits(digits, 10)?,
    };

    let value = if negative {
        if magnitude > i64::MAX as u64 {
            i64::MIN
        } else {
            -(magnitude as i64)
        }
    } else {
        i64::try_from(magnitude).unwrap_or(i64::MAX)
    };

    Some(value)
}

/// Scan an unsigned decimal integer the way `scanf("%u")` does.
/// A leading minus sign negates the value modulo 2^64.
pub fn scan_unsigned(s: &str) -> Option<u64> {
    let (negative, digits) = split_sign(s);
    let value = scan_digits(digits, 10)?;

    if negative {
        Some(value.wrapping_neg())
    } else {
        Some(value)
    }
}

fn parse_int_property(text: &str, tstr: &str) -> Option<Variant> {
    let t = tstr.to_ascii_lowercase();

    let (signed, width) = if let Some(width) = t.strip_prefix("uint") {
        (false, width)
    } else if let Some(width) = t.strip_prefix("sint").or_else(|| t.strip_prefix("int")) {
        (true, width)
    } else {
        debug!("Unknown integer type: `{}'", tstr);
        return None;
    };

    let bits = match scan_signed(width) {
        Some(bits) => bits,
        None => {
            debug!("Unknown integer type: `{}'", tstr);
            return None;
        }
    };

    let cim_type = CIMType::integer(bits as u32, signed);

    let value = if signed {
        scan_signed(text).map(Variant::I8)
    } else {
        scan_unsigned(text).map(Variant::UI8)
    };

    match value {
        Some(value) => value.convert_into_cim_type(cim_type).ok(),
        None => {
            debug!("Failed to scan value `{}'", text);
            None
        }
    }
}

/// Parse the text of a `<VALUE>` according to a CIM-XML `TYPE` attribute.
pub fn parse_value(tstr: &str, text: &str) -> Option<Variant> {
    let t = tstr.to_ascii_lowercase();

    let value = match t.as_str() {
        "string" | "char16" => Some(Variant::String(text.to_owned())),
        "boolean" => Some(Variant::Bool(text.trim().eq_ignore_ascii_case("true"))),
        "real32" => text.trim().parse().ok().map(Variant::R4),
        "real64" => text.trim().parse().ok().map(Variant::R8),
        "datetime" => text.trim().parse().ok().map(Variant::DateTime),
        _ if t.contains("int") => parse_int_property(text, tstr),
        _ => {
            debug!("Unhandled type: {}", tstr);
            return None;
        }
    };

    if value.is_none() {
        debug!("Unable to parse type {}", tstr);
    }

    value
}

fn node_value(node: Node, tstr: &str) -> Option<Variant> {
    if !node.is_element() {
        trace!("Non-element node");
        return None;
    }

    if !is_named(node, "value") {
        debug!("Expected <VALUE> but got <{}>", node.tag_name().name());
        return None;
    }

    let text = content(node);
    trace!("Node content: {}", text);

    parse_value(tstr, &text)
}

fn name_and_type<'a>(node: Node<'a, '_>) -> Option<(&'a str, &'a str)> {
    let name = match attr(node, "NAME") {
        Some(name) => name,
        None => {
            debug!("Unnamed property");
            return None;
        }
    };

    match attr(node, "TYPE") {
        Some(tstr) => Some((name, tstr)),
        None => {
            debug!("No type for property {}", name);
            None
        }
    }
}

fn parse_property(node: Node, inst: &mut Instance) -> bool {
    let (name, tstr) = match name_and_type(node) {
        Some(nt) => nt,
        None => return false,
    };

    debug!("Property {}: {}", name, tstr);

    for child in node.children() {
        if let Some(value) = node_value(child, tstr) {
            inst.set_property(name, value);
            return true;
        }
    }

    false
}

fn parse_array(tstr: &str, value_array: Node) -> Option<Vec<Variant>> {
    let mut values = Vec::new();

    for child in value_array.children().filter(|n| n.is_element()) {
        match node_value(child, tstr) {
            Some(value) => values.push(value),
            None => debug!("Got nothing from child"),
        }
    }

    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn parse_array_property(node: Node, inst: &mut Instance) -> bool {
    let (name, tstr) = match name_and_type(node) {
        Some(nt) => nt,
        None => return false,
    };

    debug!("Array property `{}' of type `{}'", name, tstr);

    let value_array = match node.children().find(|n| n.is_element()) {
        Some(child) if is_named(child, "value.array") => child,
        Some(child) => {
            debug!("Expected <VALUE.ARRAY> but got <{}>", child.tag_name().name());
            return false;
        }
        None => return false,
    };

    match parse_array(tstr, value_array) {
        Some(values) => {
            debug!("Setting array property {} with {} element(s)", name, values.len());
            inst.set_property(name, Variant::Array(values));
            true
        }
        None => false,
    }
}

/// Parse a CIM-XML `<INSTANCE>` into a new instance in namespace `ns`.
pub fn parse_instance<B>(eo: &str, broker: &B, ns: &str) -> CMPIResult<Instance>
where
    B: Broker + ?Sized,
{
    let doc = Document::parse(eo).map_err(|e| {
        debug!("Malformed embedded object: {}", e);
        CMPIError::Failed(format!("Unable to parse embedded object: {}", e))
    })?;

    let root = doc.root_element();

    if !is_named(root, "instance") {
        debug!("Got node {}, expecting INSTANCE", root.tag_name().name());
        return Err(CMPIError::Failed(
            "First node of object is not <INSTANCE".into(),
        ));
    }

    let class = match attr(root, "CLASSNAME") {
        Some(class) => class,
        None => {
            debug!("No classname in object");
            return Err(CMPIError::Failed(
                "Missing CLASSNAME attribute of INSTANCE".into(),
            ));
        }
    };

    debug!("Instance of {}", class);

    let op = broker.new_object_path(ns, class).map_err(|e| {
        debug!("Unable to create path for {}:{}: {}", ns, class, e);
        CMPIError::Failed(format!("Unable to create path for {}:{}", ns, class))
    })?;

    let mut inst = broker.new_instance(&op).map_err(|e| {
        debug!("Unable to create inst for {}:{}: {}", ns, class, e);
        CMPIError::Failed(format!("Unable to create instance for {}:{}", ns, class))
    })?;

    let children = root
        .children()
        .filter(|n| n.is_element() && n.tag_name().namespace().is_none());

    for child in children {
        if is_named(child, "property") {
            parse_property(child, &mut inst);
        } else if is_named(child, "property.array") {
            parse_array_property(child, &mut inst);
        } else {
            debug!("Unexpected node: {}", child.tag_name().name());
        }
    }

    Ok(inst)
}
