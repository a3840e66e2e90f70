//! A generic association provider.
//!
//! A provider describes each association it serves with a [`StdAssoc`]: which
//! classes it starts from and leads to, the association classes involved and a
//! handler producing the target instances for a source reference.
//! [`StdAssociationMI`] then implements the four association verbs on top of a
//! list of such descriptors.
//!
//! ```
//! # fn main() -> Result<(), cmpiutil::CMPIError> {
//! use cmpiutil::std_association::{StdAssoc, StdAssociationMI};
//! use cmpiutil::{Context, Instance, ObjectPath, SimpleBroker, VecResult};
//!
//! let broker = SimpleBroker::new();
//!
//! let system_device = StdAssoc::new(|reference, _info, list| {
//!     let device = ObjectPath::new(reference.namespace(), "Xen_Processor").with_key("DeviceID", "dom1/0");
//!     list.add(Instance::new(&device))
//! })
//! .source_class(&["Xen_ComputerSystem"])
//! .source_prop("GroupComponent")
//! .target_class(&["Xen_Processor"])
//! .target_prop("PartComponent")
//! .assoc_class(&["Xen_SystemDevice"]);
//!
//! let mi = StdAssociationMI::new("Xen_SystemDeviceProvider", &broker, vec![system_device]);
//!
//! let reference = ObjectPath::new("root/virt", "Xen_ComputerSystem").with_key("Name", "dom1");
//! let mut results = VecResult::new();
//!
//! let count = mi.reference_names(&Context::new(), &mut results, &reference, None, None)?;
//!
//! assert_eq!(count, 1);
//! assert_eq!(results.object_paths[0].class_name(), "Xen_SystemDevice");
//! #   Ok(())
//! # }
//! ```

use std::fmt;

use log::debug;

use crate::broker::{Broker, ResultSink};
use crate::context::Context;
use crate::inst_list::InstList;
use crate::instance::Instance;
use crate::instance_util::{return_instance_names, return_instances};
use crate::object_path::ObjectPath;
use crate::variant::Variant;
use crate::{CMPIError, CMPIResult};

/// Produces the target instances of an association for a source reference.
pub type AssocHandler =
    Box<dyn Fn(&ObjectPath, &AssocInfo<'_>, &mut InstList) -> CMPIResult<()> + Send + Sync>;

/// Builds the association instance linking a source reference to one target.
///
/// Returning `None` leaves that target out of the result.
pub type MakeRef =
    Box<dyn Fn(&ObjectPath, &Instance, &AssocInfo<'_>, &StdAssoc) -> Option<Instance> + Send + Sync>;

/// Describes one association served by a [`StdAssociationMI`].
pub struct StdAssoc {
    source_class: Vec<String>,
    source_prop: String,
    target_class: Vec<String>,
    target_prop: String,
    assoc_class: Vec<String>,
    handler: AssocHandler,
    make_ref: MakeRef,
}

fn to_owned_list(classes: &[&str]) -> Vec<String> {
    classes.iter().map(|class| (*class).to_owned()).collect()
}

impl StdAssoc {
    /// A descriptor using `handler` to produce targets and [`default_make_ref`]
    /// to produce association instances.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ObjectPath, &AssocInfo<'_>, &mut InstList) -> CMPIResult<()> + Send + Sync + 'static,
    {
        StdAssoc {
            source_class: Vec::new(),
            source_prop: String::new(),
            target_class: Vec::new(),
            target_prop: String::new(),
            assoc_class: Vec::new(),
            handler: Box::new(handler),
            make_ref: Box::new(default_make_ref),
        }
    }

    pub fn source_class(mut self, classes: &[&str]) -> Self {
        self.source_class = to_owned_list(classes);
        self
    }

    /// The property of the association instance referring to the source.
    pub fn source_prop(mut self, prop: &str) -> Self {
        self.source_prop = prop.to_owned();
        self
    }

    pub fn target_class(mut self, classes: &[&str]) -> Self {
        self.target_class = to_owned_list(classes);
        self
    }

    /// The property of the association instance referring to the target.
    pub fn target_prop(mut self, prop: &str) -> Self {
        self.target_prop = prop.to_owned();
        self
    }

    pub fn assoc_class(mut self, classes: &[&str]) -> Self {
        self.assoc_class = to_owned_list(classes);
        self
    }

    pub fn make_ref<F>(mut self, make_ref: F) -> Self
    where
        F: Fn(&ObjectPath, &Instance, &AssocInfo<'_>, &StdAssoc) -> Option<Instance>
            + Send
            + Sync
            + 'static,
    {
        self.make_ref = Box::new(make_ref);
        self
    }

    pub fn source_classes(&self) -> &[String] {
        &self.source_class
    }

    pub fn target_classes(&self) -> &[String] {
        &self.target_class
    }

    pub fn assoc_classes(&self) -> &[String] {
        &self.assoc_class
    }

    pub fn source_prop_name(&self) -> &str {
        &self.source_prop
    }

    pub fn target_prop_name(&self) -> &str {
        &self.target_prop
    }

    /// Set the source and target reference properties of `inst`.
    ///
    /// Both are keys of the association instance.
    pub fn set_reference(&self, inst: &mut Instance, source: &ObjectPath, target: &ObjectPath) {
        inst.set_key(self.source_prop.as_str(), Variant::Ref(source.clone()));
        inst.set_key(self.target_prop.as_str(), Variant::Ref(target.clone()));
    }
}

impl fmt::Debug for StdAssoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdAssoc")
            .field("source_class", &self.source_class)
            .field("source_prop", &self.source_prop)
            .field("target_class", &self.target_class)
            .field("target_prop", &self.target_prop)
            .field("assoc_class", &self.assoc_class)
            .finish()
    }
}

/// An association instance of the request's association class, in the
/// namespace of `source`, linking `source` to `target`.
///
/// Uses the first association class of `assoc` when the request names none.
pub fn default_make_ref(
    source: &ObjectPath,
    target: &Instance,
    info: &AssocInfo<'_>,
    assoc: &StdAssoc,
) -> Option<Instance> {
    let class = match info
        .assoc_class
        .or_else(|| assoc.assoc_class.first().map(String::as_str))
    {
        Some(class) => class,
        None => {
            debug!("No association class to build a reference for");
            return None;
        }
    };

    let op = match info.broker.new_object_path(source.namespace(), class) {
        Ok(op) => op,
        Err(e) => {
            debug!("Unable to create path for {}:{}: {}", source.namespace(), class, e);
            return None;
        }
    };

    let mut inst = match info.broker.new_instance(&op) {
        Ok(inst) => inst,
        Err(e) => {
            debug!("Unable to create instance of {}: {}", class, e);
            return None;
        }
    };

    assoc.set_reference(&mut inst, source, &target.object_path());

    Some(inst)
}

/// The parameters of one association request, as seen by handlers.
#[derive(Clone, Copy)]
pub struct AssocInfo<'a> {
    pub assoc_class: Option<&'a str>,
    pub result_class: Option<&'a str>,
    pub role: Option<&'a str>,
    pub result_role: Option<&'a str>,
    pub properties: Option<&'a [&'a str]>,
    pub context: &'a Context,
    pub provider_name: &'a str,
    pub broker: &'a dyn Broker,
}

impl<'a> AssocInfo<'a> {
    /// The same request, limited to association class `assoc_class`.
    pub fn narrowed(&self, assoc_class: &'a str) -> Self {
        AssocInfo {
            assoc_class: Some(assoc_class),
            ..*self
        }
    }
}

impl fmt::Debug for AssocInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssocInfo")
            .field("assoc_class", &self.assoc_class)
            .field("result_class", &self.result_class)
            .field("role", &self.role)
            .field("result_role", &self.result_role)
            .field("properties", &self.properties)
            .field("provider_name", &self.provider_name)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Associators,
    References,
}

/// An association provider dispatching to a list of [`StdAssoc`] descriptors.
pub struct StdAssociationMI<B> {
    name: String,
    broker: B,
    handlers: Vec<StdAssoc>,
}

impl<B> StdAssociationMI<B>
where
    B: Broker,
{
    pub fn new(name: impl Into<String>, broker: B, handlers: Vec<StdAssoc>) -> Self {
        StdAssociationMI {
            name: name.into(),
            broker,
            handlers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handlers(&self) -> &[StdAssoc] {
        &self.handlers
    }

    fn info<'a>(
        &'a self,
        context: &'a Context,
        assoc_class: Option<&'a str>,
        result_class: Option<&'a str>,
        role: Option<&'a str>,
        result_role: Option<&'a str>,
        properties: Option<&'a [&'a str]>,
    ) -> AssocInfo<'a> {
        AssocInfo {
            assoc_class,
            result_class,
            role,
            result_role,
            properties,
            context,
            provider_name: &self.name,
            broker: &self.broker,
        }
    }

    /// Return the instances associated with `reference`.
    #[allow(clippy::too_many_arguments)]
    pub fn associators<R>(
        &self,
        context: &Context,
        results: &mut R,
        reference: &ObjectPath,
        assoc_class: Option<&str>,
        result_class: Option<&str>,
        role: Option<&str>,
        result_role: Option<&str>,
        properties: Option<&[&str]>,
    ) -> CMPIResult<usize>
    where
        R: ResultSink + ?Sized,
    {
        let info = self.info(context, assoc_class, result_class, role, result_role, properties);

        self.do_assoc(&info, results, reference, Verb::Associators, false)
    }

    /// Return the paths of the instances associated with `reference`.
    #[allow(clippy::too_many_arguments)]
    pub fn associator_names<R>(
        &self,
        context: &Context,
        results: &mut R,
        reference: &ObjectPath,
        assoc_class: Option<&str>,
        result_class: Option<&str>,
        role: Option<&str>,
        result_role: Option<&str>,
    ) -> CMPIResult<usize>
    where
        R: ResultSink + ?Sized,
    {
        let info = self.info(context, assoc_class, result_class, role, result_role, None);

        self.do_assoc(&info, results, reference, Verb::Associators, true)
    }

    /// Return the association instances referring to `reference`.
    ///
    /// `result_class` filters on the association class.
    pub fn references<R>(
        &self,
        context: &Context,
        results: &mut R,
        reference: &ObjectPath,
        result_class: Option<&str>,
        role: Option<&str>,
        properties: Option<&[&str]>,
    ) -> CMPIResult<usize>
    where
        R: ResultSink + ?Sized,
    {
        let info = self.info(context, result_class, None, role, None, properties);

        self.do_assoc(&info, results, reference, Verb::References, false)
    }

    /// Return the paths of the association instances referring to `reference`.
    pub fn reference_names<R>(
        &self,
        context: &Context,
        results: &mut R,
        reference: &ObjectPath,
        result_class: Option<&str>,
        role: Option<&str>,
    ) -> CMPIResult<usize>
    where
        R: ResultSink + ?Sized,
    {
        let info = self.info(context, result_class, None, role, None, None);

        self.do_assoc(&info, results, reference, Verb::References, true)
    }

    pub fn cleanup(&self, _context: &Context, _terminating: bool) -> CMPIResult<()> {
        Err(CMPIError::NotSupported)
    }

    fn match_source_class(&self, reference: &ObjectPath, assoc: &StdAssoc) -> bool {
        assoc
            .source_class
            .iter()
            .any(|class| self.broker.class_path_is_a(reference, class))
    }

    // `true` if any of `classes` is a `filter`. No filter or no classes match anything.
    fn match_class(&self, ns: &str, filter: Option<&str>, classes: &[String]) -> bool {
        let filter = match filter {
            Some(filter) => filter,
            None => return true,
        };

        if classes.is_empty() {
            return true;
        }

        classes.iter().any(|class| {
            match self.broker.new_object_path(ns, class) {
                Ok(op) => self.broker.class_path_is_a(&op, filter),
                Err(e) => {
                    debug!("Unable to create path for {}:{}: {}", ns, class, e);
                    false
                }
            }
        })
    }

    fn get_handler(&self, info: &AssocInfo<'_>, reference: &ObjectPath) -> Option<&StdAssoc> {
        debug!("Calling Provider: '{}'", info.provider_name);

        let ns = reference.namespace();

        self.handlers.iter().find(|assoc| {
            if !self.match_source_class(reference, assoc) {
                debug!("Source class doesn't match");
                return false;
            }

            if let Some(assoc_class) = info.assoc_class {
                debug!("Check client's assocClass: '{}'", assoc_class);
                if !self.match_class(ns, Some(assoc_class), &assoc.assoc_class) {
                    debug!("AssocClass not valid.");
                    return false;
                }
            }

            if let Some(result_class) = info.result_class {
                debug!("Check client's resultClass: '{}'", result_class);
                if !self.match_class(ns, Some(result_class), &assoc.target_class) {
                    debug!("ResultClass not valid.");
                    return false;
                }
            }

            if let Some(role) = info.role {
                debug!("Check client's role: '{}'", role);
                if !role.eq_ignore_ascii_case(&assoc.source_prop) {
                    debug!("Invalid role");
                    return false;
                }
            }

            if let Some(result_role) = info.result_role {
                debug!("Check client's resultRole: '{}'", result_role);
                if !result_role.eq_ignore_ascii_case(&assoc.target_prop) {
                    debug!("ResultRole not valid.");
                    return false;
                }
            }

            true
        })
    }

    // The request as each handler call should see it. A request pinned to one
    // of the descriptor's association classes is passed through as is.
    fn invocations<'a>(&self, info: &AssocInfo<'a>, assoc: &'a StdAssoc, ns: &str) -> Vec<AssocInfo<'a>> {
        let pinned = info
            .assoc_class
            .map_or(false, |class| assoc.assoc_class.iter().any(|c| c == class));

        if pinned || assoc.assoc_class.is_empty() {
            return vec![*info];
        }

        assoc
            .assoc_class
            .iter()
            .filter(|class| self.match_class(ns, info.assoc_class, std::slice::from_ref(*class)))
            .map(|class| info.narrowed(class.as_str()))
            .collect()
    }

    fn filter_results(
        &self,
        list: InstList,
        ns: &str,
        result_class: Option<&str>,
    ) -> CMPIResult<InstList> {
        let mut filtered = InstList::new();

        for mut inst in list {
            inst.set_namespace(ns);

            let keep = match result_class {
                Some(class) => self.broker.class_path_is_a(&inst.object_path(), class),
                None => true,
            };

            if !keep {
                debug!("Dropping {} (not a {:?})", inst.class_name(), result_class);
                continue;
            }

            filtered.add(inst)?;
        }

        Ok(filtered)
    }

    fn prepare_ref_list(
        &self,
        assoc: &StdAssoc,
        reference: &ObjectPath,
        batches: &[(AssocInfo<'_>, usize)],
        list: InstList,
    ) -> CMPIResult<InstList> {
        let mut refs = InstList::new();
        let mut batch = batches.iter().peekable();

        for (i, target) in list.into_iter().enumerate() {
            while batch.peek().map_or(false, |(_, end)| i >= *end) {
                batch.next();
            }

            let info = match batch.peek() {
                Some((info, _)) => info,
                None => break,
            };

            match (assoc.make_ref)(reference, &target, info, assoc) {
                Some(inst) => refs.add(inst)?,
                None => debug!("No reference built for {}", target.class_name()),
            }
        }

        Ok(refs)
    }

    fn do_assoc<R>(
        &self,
        info: &AssocInfo<'_>,
        results: &mut R,
        reference: &ObjectPath,
        verb: Verb,
        names_only: bool,
    ) -> CMPIResult<usize>
    where
        R: ResultSink + ?Sized,
    {
        debug!("Getting handler ...");
        let assoc = match self.get_handler(info, reference) {
            Some(assoc) => assoc,
            None if verb == Verb::References => {
                debug!("No handler found.");
                return Err(CMPIError::Failed(format!(
                    "Unable to handle references of {}",
                    reference.class_name()
                )));
            }
            None => {
                debug!("No handler found.");
                return Ok(0);
            }
        };
        debug!("Getting handler succeeded.");

        let ns = reference.namespace();
        let mut list = InstList::new();
        let mut batches = Vec::new();

        for call in self.invocations(info, assoc, ns) {
            debug!("Calling handler for {:?} ...", call.assoc_class);
            (assoc.handler)(reference, &call, &mut list).map_err(|e| {
                debug!("Handler did not return CMPI_RC_OK: {}", e);
                e
            })?;
            batches.push((call, list.len()));
        }
        debug!("Handler returned CMPI_RC_OK.");

        let list = match verb {
            Verb::References => self.prepare_ref_list(assoc, reference, &batches, list)?,
            Verb::Associators => self.filter_results(list, ns, info.result_class)?,
        };

        debug!("Returned {} instance(s).", list.len());

        if names_only {
            return_instance_names(results, &list)
        } else {
            return_instances(results, list)
        }
    }
}

impl<B> fmt::Debug for StdAssociationMI<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdAssociationMI")
            .field("name", &self.name)
            .field("handlers", &self.handlers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::VecResult;
    use crate::rc::CMPIrc;
    use crate::tests::fixtures::broker;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn device(class: &'static str) -> StdAssoc {
        StdAssoc::new(move |_reference, _info, list| {
            let op = ObjectPath::new("other/ns", class).with_key("DeviceID", "dom1/0");
            list.add(Instance::new(&op))
        })
        .source_class(&["CIM_ComputerSystem"])
        .source_prop("GroupComponent")
        .target_class(&[class])
        .target_prop("PartComponent")
    }

    fn reference() -> ObjectPath {
        ObjectPath::new("root/virt", "Xen_ComputerSystem").with_key("Name", "dom1")
    }

    #[test]
    fn it_selects_by_role_case_insensitively() {
        let broker = broker();
        let mi = StdAssociationMI::new(
            "test",
            &broker,
            vec![device("Xen_Processor").assoc_class(&["Xen_SystemDevice"])],
        );

        let mut results = VecResult::new();
        let count = mi
            .associator_names(
                &Context::new(),
                &mut results,
                &reference(),
                None,
                None,
                Some("groupcomponent"),
                Some("PARTCOMPONENT"),
            )
            .unwrap();
        assert_eq!(count, 1);

        let count = mi
            .associator_names(&Context::new(), &mut results, &reference(), None, None, Some("PartComponent"), None)
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn it_filters_on_result_class() {
        let broker = broker();
        let mi = StdAssociationMI::new(
            "test",
            &broker,
            vec![device("Xen_Processor").assoc_class(&["Xen_SystemDevice"])],
        );

        let mut results = VecResult::new();
        let count = mi
            .associators(
                &Context::new(),
                &mut results,
                &reference(),
                None,
                Some("CIM_Processor"),
                None,
                None,
                None,
            )
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(results.instances[0].namespace(), "root/virt");

        let count = mi
            .associators(&Context::new(), &mut results, &reference(), None, Some("CIM_Memory"), None, None, None)
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn it_fans_out_per_association_class() {
        let broker = broker();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);

        let assoc = StdAssoc::new(move |_reference, info, list| {
            let class = info.assoc_class.unwrap_or("").to_owned();
            recorder.lock().unwrap().push(class.clone());
            list.add(Instance::new(&ObjectPath::new("root/virt", "Xen_Processor").with_key("DeviceID", class)))
        })
        .source_class(&["Xen_ComputerSystem"])
        .source_prop("GroupComponent")
        .target_class(&["Xen_Processor"])
        .target_prop("PartComponent")
        .assoc_class(&["Xen_SystemDevice", "Xen_SystemMemory"]);

        let mi = StdAssociationMI::new("test", &broker, vec![assoc]);
        let mut results = VecResult::new();

        let count = mi
            .references(&Context::new(), &mut results, &reference(), None, None, None)
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(*seen.lock().unwrap(), vec!["Xen_SystemDevice", "Xen_SystemMemory"]);
        assert_eq!(results.instances[0].class_name(), "Xen_SystemDevice");
        assert_eq!(results.instances[1].class_name(), "Xen_SystemMemory");
        assert_eq!(
            results.instances[1].get_property("GroupComponent"),
            Some(&Variant::Ref(reference()))
        );

        seen.lock().unwrap().clear();
        let mut results = VecResult::new();
        mi.references(&Context::new(), &mut results, &reference(), Some("Xen_SystemMemory"), None, None)
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["Xen_SystemMemory"]);
    }

    #[test]
    fn it_fans_out_over_subclasses_of_the_requested_class() {
        let broker = broker();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let assoc = StdAssoc::new(move |_reference, info, _list| {
            assert_eq!(info.assoc_class, Some("Xen_SystemDevice"));
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .source_class(&["Xen_ComputerSystem"])
        .assoc_class(&["Xen_SystemDevice", "Xen_Other"]);

        let mi = StdAssociationMI::new("test", &broker, vec![assoc]);
        let count = mi
            .reference_names(&Context::new(), &mut VecResult::new(), &reference(), Some("CIM_SystemDevice"), None)
            .unwrap();

        assert_eq!(count, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn it_skips_targets_without_a_reference() {
        let broker = broker();
        let assoc = device("Xen_Processor")
            .assoc_class(&["Xen_SystemDevice"])
            .make_ref(|_source, _target, _info, _assoc| None);

        let mi = StdAssociationMI::new("test", &broker, vec![assoc]);
        let mut results = VecResult::new();

        let count = mi
            .references(&Context::new(), &mut results, &reference(), None, None, None)
            .unwrap();

        assert_eq!(count, 0);
        assert!(results.is_empty());
    }

    #[test]
    fn it_propagates_handler_errors() {
        let broker = broker();
        let assoc = StdAssoc::new(|_reference, _info, _list| Err(CMPIError::NotFound("dom1".into())))
            .source_class(&["Xen_ComputerSystem"])
            .assoc_class(&["Xen_SystemDevice"]);

        let mi = StdAssociationMI::new("test", &broker, vec![assoc]);
        let err = mi
            .associators(&Context::new(), &mut VecResult::new(), &reference(), None, None, None, None, None)
            .unwrap_err();

        assert_eq!(err.rc(), CMPIrc::ErrNotFound);
    }

    #[test]
    fn it_keeps_every_filtered_and_built_instance() {
        let broker = broker();
        let assoc = device("Xen_Processor").assoc_class(&["Xen_SystemDevice"]);
        let mi = StdAssociationMI::new("test", &broker, vec![]);
        let context = Context::new();

        let targets = || {
            let mut list = InstList::new();
            for id in 0..12 {
                let op = ObjectPath::new("other/ns", "Xen_Processor").with_key("DeviceID", format!("dom1/{}", id));
                list.add(Instance::new(&op)).unwrap();
            }
            list
        };

        let filtered = mi.filter_results(targets(), "root/virt", Some("CIM_Processor")).unwrap();
        assert_eq!(filtered.len(), 12);
        assert!(filtered.iter().all(|inst| inst.namespace() == "root/virt"));

        let info = AssocInfo {
            assoc_class: Some("Xen_SystemDevice"),
            result_class: None,
            role: None,
            result_role: None,
            properties: None,
            context: &context,
            provider_name: "test",
            broker: &broker,
        };
        let refs = mi
            .prepare_ref_list(&assoc, &reference(), &[(info, 12)], targets())
            .unwrap();
        assert_eq!(refs.len(), 12);
        assert!(refs.iter().all(|inst| inst.class_name() == "Xen_SystemDevice"));
    }

    /// Takes one instance, then refuses further results.
    #[derive(Default)]
    struct ClosingSink {
        instances: usize,
    }

    impl ResultSink for ClosingSink {
        fn return_instance(&mut self, _inst: Instance) -> CMPIResult<()> {
            self.instances += 1;
            if self.instances > 1 {
                return Err(CMPIError::Failed("Broker refused result".into()));
            }
            Ok(())
        }

        fn return_object_path(&mut self, _op: ObjectPath) -> CMPIResult<()> {
            Err(CMPIError::Failed("Broker refused result".into()))
        }

        fn return_data(&mut self, _data: Variant) -> CMPIResult<()> {
            Ok(())
        }

        fn return_done(&mut self) -> CMPIResult<()> {
            Ok(())
        }
    }

    #[test]
    fn it_propagates_result_errors() {
        let broker = broker();
        let assoc = StdAssoc::new(|_reference, _info, list| {
            for id in 0..3 {
                let op = ObjectPath::new("root/virt", "Xen_Processor").with_key("DeviceID", format!("dom1/{}", id));
                list.add(Instance::new(&op))?;
            }
            Ok(())
        })
        .source_class(&["Xen_ComputerSystem"])
        .assoc_class(&["Xen_SystemDevice"]);

        let mi = StdAssociationMI::new("test", &broker, vec![assoc]);
        let context = Context::new();

        let mut sink = ClosingSink::default();
        let err = mi
            .associators(&context, &mut sink, &reference(), None, None, None, None, None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Broker refused result");
        assert_eq!(sink.instances, 2);

        let err = mi
            .associator_names(&context, &mut ClosingSink::default(), &reference(), None, None, None, None)
            .unwrap_err();
        assert_eq!(err.rc(), CMPIrc::ErrFailed);

        assert!(mi
            .references(&context, &mut ClosingSink::default(), &reference(), None, None, None)
            .is_err());
        assert!(mi
            .reference_names(&context, &mut ClosingSink::default(), &reference(), None, None)
            .is_err());
    }

    #[test]
    fn it_does_not_support_cleanup() {
        let broker = broker();
        let mi = StdAssociationMI::new("test", &broker, vec![]);

        assert_eq!(mi.cleanup(&Context::new(), true).unwrap_err().rc(), CMPIrc::ErrNotSupported);
    }
}
