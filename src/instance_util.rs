//! Helpers around instances: property getters, reference checks and result return.

use log::{debug, trace};

use crate::broker::{Broker, ResultSink};
use crate::inst_list::InstList;
use crate::instance::Instance;
use crate::object_path::ObjectPath;
use crate::variant::{CIMType, Variant};
use crate::{CMPIError, CMPIResult};

container_getters!(Instance, "property";
    get_str_prop, get_bool_prop, get_ref_prop, get_inst_prop, get_array_prop,
    get_u16_prop, get_u32_prop, get_u64_prop);

/// The declared type of a property, [`CIMType::Null`] if it is absent.
pub fn prop_type(inst: &Instance, name: &str) -> CIMType {
    inst.get_property(name)
        .map_or(CIMType::Null, |value| value.cim_type())
}

pub fn classname_from_inst(inst: &Instance) -> &str {
    inst.class_name()
}

/// Return every instance of `list` on `results`, consuming the list.
///
/// Stops at the first instance the sink rejects and returns its error.
pub fn return_instances<R>(results: &mut R, list: InstList) -> CMPIResult<usize>
where
    R: ResultSink + ?Sized,
{
    let mut count = 0;

    for inst in list {
        results.return_instance(inst).map_err(|e| {
            debug!("Failed to return instance: {}", e);
            e
        })?;
        count += 1;
    }

    Ok(count)
}

/// Return the object path of `inst` on `results`.
pub fn return_instance_name<R>(results: &mut R, inst: &Instance) -> CMPIResult<()>
where
    R: ResultSink + ?Sized,
{
    results.return_object_path(inst.object_path()).map_err(|e| {
        debug!("Failed to return object path of {}: {}", inst.class_name(), e);
        e
    })
}

/// Return the object path of every instance of `list` on `results`.
pub fn return_instance_names<R>(results: &mut R, list: &InstList) -> CMPIResult<usize>
where
    R: ResultSink + ?Sized,
{
    for inst in list.iter() {
        return_instance_name(results, inst)?;
    }

    Ok(list.len())
}

fn compare_data(name: &str, a: &Variant, b: &Variant) -> bool {
    if a.is_array() || b.is_array() || a.cim_type() != b.cim_type() {
        return false;
    }

    match (a, b) {
        (Variant::String(a), Variant::String(b)) => a.eq_ignore_ascii_case(b),
        _ => match (a.integer_bits(), b.integer_bits()) {
            (Some(a), Some(b)) => a == b,
            _ => {
                debug!("Unhandled type `{}' comparing `{}'", a.cim_type(), name);
                false
            }
        },
    }
}

/// Check that `reference` names the same object as `inst`.
///
/// The class names are compared first; on mismatch `"CreationClassName"` is
/// returned. Then every key of the instance's path is looked up in `reference`
/// and the name of the first key that is missing or different is returned.
/// `None` means the two match.
pub fn compare_ref(reference: &ObjectPath, inst: &Instance) -> Option<String> {
    let op = inst.object_path();

    if !reference.class_name().eq_ignore_ascii_case(op.class_name()) {
        debug!(
            "Class mismatch: `{}' != `{}'",
            reference.class_name(),
            op.class_name()
        );
        return Some("CreationClassName".to_owned());
    }

    for (name, value) in op.keys() {
        trace!("Comparing key `{}'", name);

        let matches = reference
            .get_key(name)
            .map_or(false, |key| compare_data(name, key, value));

        if !matches {
            debug!("No data match for `{}'", name);
            return Some(name.to_owned());
        }
    }

    None
}

/// [`compare_ref`] as a result: a mismatch is reported as [`CMPIError::NotFound`].
pub fn validate_ref(reference: &ObjectPath, inst: &Instance) -> CMPIResult<()> {
    match compare_ref(reference, inst) {
        None => Ok(()),
        Some(prop) => Err(CMPIError::NotFound(format!(
            "No such instance ({})",
            prop
        ))),
    }
}

/// Copy property `src_name` of `src` to `dest`, under `dest_name` if given.
pub fn copy_prop(
    src: &Instance,
    dest: &mut Instance,
    src_name: &str,
    dest_name: Option<&str>,
) -> CMPIResult<()> {
    let value = match src.get_property(src_name) {
        Some(value) if !value.is_null() => value.clone(),
        _ => return Err(CMPIError::NoSuchProperty(src_name.to_owned())),
    };

    dest.set_property(dest_name.unwrap_or(src_name), value);

    Ok(())
}

/// Copy every non-null property of `src` onto `dest`.
pub fn merge_instances(src: &Instance, dest: &mut Instance) {
    for (name, value) in src.properties() {
        if value.is_null() {
            continue;
        }

        if src.is_key(name) {
            dest.set_key(name, value.clone());
        } else {
            dest.set_property(name, value.clone());
        }
    }
}

/// Create a new instance through `broker` with the same path and properties as `src`.
pub fn dup_instance<B>(broker: &B, src: &Instance) -> CMPIResult<Instance>
where
    B: Broker + ?Sized,
{
    let op = broker.new_object_path(src.namespace(), src.class_name())?;
    let mut dest = broker.new_instance(&op)?;

    merge_instances(src, &mut dest);

    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{SimpleBroker, VecResult};
    use crate::rc::CMPIrc;
    use crate::tests::fixtures::{device, system, system_path};

    fn domain() -> Instance {
        system("Xen_ComputerSystem", "dom1")
    }

    #[test]
    fn it_matches_identical_identity() {
        let reference = ObjectPath::new("root/other", "XEN_ComputerSystem")
            .with_key("Name", "DOM1")
            .with_key("CreationClassName", "Xen_ComputerSystem");

        assert_eq!(compare_ref(&reference, &domain()), None);
        assert!(validate_ref(&reference, &domain()).is_ok());
    }

    #[test]
    fn it_reports_class_first() {
        let reference = ObjectPath::new("root/virt", "KVM_ComputerSystem").with_key("Name", "other");

        assert_eq!(
            compare_ref(&reference, &domain()).as_deref(),
            Some("CreationClassName")
        );
    }

    #[test]
    fn it_reports_the_differing_key() {
        let reference = ObjectPath::new("root/virt", "Xen_ComputerSystem")
            .with_key("CreationClassName", "Xen_ComputerSystem")
            .with_key("Name", "dom2");

        assert_eq!(compare_ref(&reference, &domain()).as_deref(), Some("Name"));

        let err = validate_ref(&reference, &domain()).unwrap_err();
        assert_eq!(err.rc(), CMPIrc::ErrNotFound);
        assert!(err.to_string().contains("Name"));
    }

    #[test]
    fn it_reports_a_missing_key() {
        let reference = ObjectPath::new("root/virt", "Xen_ComputerSystem").with_key("Name", "dom1");

        assert_eq!(
            compare_ref(&reference, &domain()).as_deref(),
            Some("CreationClassName")
        );
    }

    #[test]
    fn it_compares_integers_by_type_and_bits() {
        let mut inst = Instance::new(&ObjectPath::new("root/virt", "Foo"));
        inst.set_key("Id", 5u32);

        let same = ObjectPath::new("root/virt", "Foo").with_key("Id", 5u32);
        let other_width = ObjectPath::new("root/virt", "Foo").with_key("Id", 5u16);
        let other_value = ObjectPath::new("root/virt", "Foo").with_key("Id", 6u32);

        assert_eq!(compare_ref(&same, &inst), None);
        assert_eq!(compare_ref(&other_width, &inst).as_deref(), Some("Id"));
        assert_eq!(compare_ref(&other_value, &inst).as_deref(), Some("Id"));
    }

    #[test]
    fn it_treats_other_types_as_different() {
        let mut inst = Instance::new(&ObjectPath::new("root/virt", "Foo"));
        inst.set_key("Flag", true);

        let reference = ObjectPath::new("root/virt", "Foo").with_key("Flag", true);

        assert_eq!(compare_ref(&reference, &inst).as_deref(), Some("Flag"));
    }

    #[test]
    fn it_returns_instances_and_names() {
        let mut list = InstList::new();
        list.add(domain()).unwrap();
        list.add(domain()).unwrap();

        let mut results = VecResult::new();
        assert_eq!(return_instance_names(&mut results, &list).unwrap(), 2);
        assert_eq!(results.object_paths[0], domain().object_path());

        assert_eq!(return_instances(&mut results, list).unwrap(), 2);
        assert_eq!(results.instances.len(), 2);
    }

    /// Accepts `accepted` instances, then rejects everything.
    struct ClosedSink {
        accepted: usize,
        returned: usize,
    }

    impl ResultSink for ClosedSink {
        fn return_instance(&mut self, _inst: Instance) -> CMPIResult<()> {
            if self.returned == self.accepted {
                return Err(CMPIError::Failed("Result channel closed".into()));
            }
            self.returned += 1;
            Ok(())
        }

        fn return_object_path(&mut self, _op: ObjectPath) -> CMPIResult<()> {
            Err(CMPIError::Failed("Result channel closed".into()))
        }

        fn return_data(&mut self, _data: Variant) -> CMPIResult<()> {
            Ok(())
        }

        fn return_done(&mut self) -> CMPIResult<()> {
            Ok(())
        }
    }

    #[test]
    fn it_stops_at_the_first_rejected_result() {
        let mut list = InstList::new();
        for _ in 0..3 {
            list.add(domain()).unwrap();
        }

        let mut sink = ClosedSink { accepted: 1, returned: 0 };
        let err = return_instance_names(&mut sink, &list).unwrap_err();
        assert_eq!(err.to_string(), "Result channel closed");
        assert!(return_instance_name(&mut sink, &domain()).is_err());

        let err = return_instances(&mut sink, list).unwrap_err();
        assert_eq!(err.rc(), CMPIrc::ErrFailed);
        assert_eq!(sink.returned, 1);
    }

    #[test]
    fn it_validates_device_references() {
        let cpu = device("Xen_Processor", "dom1", 0);

        assert!(validate_ref(&cpu.object_path(), &cpu).is_ok());
        assert!(validate_ref(&system_path("Xen_ComputerSystem", "dom1"), &cpu).is_err());

        let other = device("Xen_Processor", "dom1", 1);
        assert_eq!(compare_ref(&other.object_path(), &cpu).as_deref(), Some("DeviceID"));
    }

    #[test]
    fn it_copies_and_merges_properties() {
        let src = domain();
        let mut dest = Instance::new(&ObjectPath::new("root/virt", "Xen_ComputerSystemSettingData"));

        copy_prop(&src, &mut dest, "Name", Some("ElementName")).unwrap();
        assert_eq!(get_str_prop(&dest, "ElementName").unwrap(), "dom1");

        let err = copy_prop(&src, &mut dest, "Missing", None).unwrap_err();
        assert_eq!(err.rc(), CMPIrc::ErrNoSuchProperty);

        merge_instances(&src, &mut dest);
        assert_eq!(get_u16_prop(&dest, "EnabledState").unwrap(), 2);
        assert!(dest.is_key("Name"));
    }

    #[test]
    fn it_duplicates_through_the_broker() {
        let broker = SimpleBroker::new();
        let dup = dup_instance(&broker, &domain()).unwrap();

        assert_eq!(dup, domain());
        assert_eq!(classname_from_inst(&dup), "Xen_ComputerSystem");
        assert_eq!(prop_type(&dup, "EnabledState"), CIMType::UInt16);
        assert_eq!(prop_type(&dup, "Missing"), CIMType::Null);
    }
}
