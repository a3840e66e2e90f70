use std::collections::HashMap;

use log::trace;

use crate::instance::Instance;
use crate::object_path::ObjectPath;
use crate::variant::Variant;
use crate::CMPIResult;

/// The services a provider consumes from its host object manager.
///
/// Class-hierarchy knowledge lives in the broker, so every "is this class a
/// kind of that class" decision in this crate goes through [`Broker::class_path_is_a`].
pub trait Broker {
    fn new_object_path(&self, namespace: &str, class_name: &str) -> CMPIResult<ObjectPath> {
        Ok(ObjectPath::new(namespace, class_name))
    }

    fn new_instance(&self, path: &ObjectPath) -> CMPIResult<Instance> {
        Ok(Instance::new(path))
    }

    /// `true` if the class of `path` is `class_name` or one of its subclasses.
    fn class_path_is_a(&self, path: &ObjectPath, class_name: &str) -> bool;
}

impl<B: Broker + ?Sized> Broker for &B {
    fn new_object_path(&self, namespace: &str, class_name: &str) -> CMPIResult<ObjectPath> {
        (**self).new_object_path(namespace, class_name)
    }

    fn new_instance(&self, path: &ObjectPath) -> CMPIResult<Instance> {
        (**self).new_instance(path)
    }

    fn class_path_is_a(&self, path: &ObjectPath, class_name: &str) -> bool {
        (**self).class_path_is_a(path, class_name)
    }
}

/// An in-memory broker that knows a fixed class hierarchy.
///
/// Class names are compared case-insensitively. A class that was never
/// registered only matches itself.
#[derive(Debug, Default, Clone)]
pub struct SimpleBroker {
    superclasses: HashMap<String, String>,
}

impl SimpleBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `class_name` as a direct subclass of `superclass`.
    pub fn with_class(mut self, class_name: &str, superclass: &str) -> Self {
        self.add_class(class_name, superclass);
        self
    }

    pub fn add_class(&mut self, class_name: &str, superclass: &str) {
        self.superclasses
            .insert(class_name.to_ascii_lowercase(), superclass.to_ascii_lowercase());
    }

    pub fn superclass_of(&self, class_name: &str) -> Option<&str> {
        self.superclasses
            .get(&class_name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn class_is_a(&self, class_name: &str, parent: &str) -> bool {
        let target = parent.to_ascii_lowercase();
        let mut current = class_name.to_ascii_lowercase();

        // A hierarchy can't be deeper than the number of registered classes.
        for _ in 0..=self.superclasses.len() {
            if current == target {
                return true;
            }

            match self.superclasses.get(&current) {
                Some(next) => current = next.clone(),
                None => return false,
            }
        }

        trace!("Cycle in class hierarchy while checking {}", class_name);

        false
    }
}

impl Broker for SimpleBroker {
    fn class_path_is_a(&self, path: &ObjectPath, class_name: &str) -> bool {
        self.class_is_a(path.class_name(), class_name)
    }
}

/// The channel results of a request are returned to the broker on.
pub trait ResultSink {
    fn return_instance(&mut self, inst: Instance) -> CMPIResult<()>;

    fn return_object_path(&mut self, op: ObjectPath) -> CMPIResult<()>;

    fn return_data(&mut self, data: Variant) -> CMPIResult<()>;

    fn return_done(&mut self) -> CMPIResult<()>;
}

/// A [`ResultSink`] that keeps everything it is handed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VecResult {
    pub instances: Vec<Instance>,
    pub object_paths: Vec<ObjectPath>,
    pub data: Vec<Variant>,
    pub done: bool,
}

impl VecResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of instances and object paths returned so far.
    pub fn len(&self) -> usize {
        self.instances.len() + self.object_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultSink for VecResult {
    fn return_instance(&mut self, inst: Instance) -> CMPIResult<()> {
        self.instances.push(inst);
        Ok(())
    }

    fn return_object_path(&mut self, op: ObjectPath) -> CMPIResult<()> {
        self.object_paths.push(op);
        Ok(())
    }

    fn return_data(&mut self, data: Variant) -> CMPIResult<()> {
        self.data.push(data);
        Ok(())
    }

    fn return_done(&mut self) -> CMPIResult<()> {
        self.done = true;
        Ok(())
    }
}
