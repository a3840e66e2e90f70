//! Parsing of embedded instances.
//!
//! An embedded instance is an instance passed by value as a string, either as a
//! CIM-XML `<INSTANCE>` element or, with the `mof` feature, in MOF syntax:
//!
//! ```
//! # fn main() -> Result<(), cmpiutil::CMPIError> {
//! use cmpiutil::{eo_parser::parse_embedded_instance, SimpleBroker, Variant};
//!
//! let eo = r#"<INSTANCE CLASSNAME="Foo">
//!     <PROPERTY NAME="Bar" TYPE="uint32"><VALUE>7</VALUE></PROPERTY>
//! </INSTANCE>"#;
//!
//! let inst = parse_embedded_instance(eo, &SimpleBroker::new(), "root/test")?.unwrap();
//!
//! assert_eq!(inst.class_name(), "Foo");
//! assert_eq!(inst.get_property("Bar"), Some(&Variant::UI4(7)));
//! #   Ok(())
//! # }
//! ```

use log::debug;

use crate::broker::Broker;
use crate::instance::Instance;
use crate::CMPIResult;

#[cfg(feature = "mof")]
pub mod mof;
pub mod xml;

const XML_MARKER: &str = "<instance";

/// `true` if `eo` looks like a CIM-XML instance.
pub fn is_xml_instance(eo: &str) -> bool {
    eo.to_ascii_lowercase().contains(XML_MARKER)
}

/// Parse an embedded instance into a new instance in namespace `ns`.
///
/// Returns `Ok(None)` if `eo` is not XML and no MOF parser is compiled in, meaning
/// the string is not something this crate can treat as an embedded instance.
/// Structural problems (a bad root element, a missing class name, a broker
/// failure) are errors. Individual properties that fail to parse are skipped.
pub fn parse_embedded_instance<B>(eo: &str, broker: &B, ns: &str) -> CMPIResult<Option<Instance>>
where
    B: Broker + ?Sized,
{
    if is_xml_instance(eo) {
        debug!("Parsing embedded instance as CIM-XML");
        return xml::parse_instance(eo, broker, ns).map(Some);
    }

    parse_mof(eo, broker, ns)
}

#[cfg(feature = "mof")]
fn parse_mof<B>(eo: &str, broker: &B, ns: &str) -> CMPIResult<Option<Instance>>
where
    B: Broker + ?Sized,
{
    debug!("Parsing embedded instance as MOF");
    mof::parse_instance(eo, broker, ns).map(Some)
}

#[cfg(not(feature = "mof"))]
fn parse_mof<B>(_eo: &str, _broker: &B, _ns: &str) -> CMPIResult<Option<Instance>>
where
    B: Broker + ?Sized,
{
    debug!("No MOF parser available for embedded instance");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::SimpleBroker;
    use crate::variant::Variant;

    #[test]
    fn it_detects_xml_case_insensitively() {
        assert!(is_xml_instance("<?xml version=\"1.0\"?><Instance CLASSNAME=\"A\"/>"));
        assert!(!is_xml_instance("instance of A { };"));
    }

    #[test]
    fn it_dispatches_xml() {
        let eo = "<instance CLASSNAME=\"Foo\"><PROPERTY NAME=\"A\" TYPE=\"string\"><VALUE>x</VALUE></PROPERTY></instance>";

        let inst = parse_embedded_instance(eo, &SimpleBroker::new(), "root/test")
            .unwrap()
            .unwrap();

        assert_eq!(inst.get_property("A"), Some(&Variant::String("x".into())));
    }

    #[cfg(feature = "mof")]
    #[test]
    fn it_dispatches_mof() {
        let eo = "instance of Foo { A = \"x\"; };";

        let inst = parse_embedded_instance(eo, &SimpleBroker::new(), "root/test")
            .unwrap()
            .unwrap();

        assert_eq!(inst.class_name(), "Foo");
        assert_eq!(inst.namespace(), "root/test");
    }

    #[cfg(not(feature = "mof"))]
    #[test]
    fn it_leaves_mof_unparsed() {
        let eo = "instance of Foo { A = \"x\"; };";

        assert_eq!(parse_embedded_instance(eo, &SimpleBroker::new(), "root/test").unwrap(), None);
    }

    #[test]
    fn it_fails_on_broken_xml() {
        let eo = "<INSTANCE CLASSNAME=\"Foo\"><PROPERTY>";

        assert!(parse_embedded_instance(eo, &SimpleBroker::new(), "root/test").is_err());
    }
}
