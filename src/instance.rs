use crate::object_path::ObjectPath;
use crate::variant::Variant;
use serde::Serialize;

/// A management object: a class name, a namespace and named, typed properties.
///
/// Some of the properties are marked as keys; together they form the identity
/// returned by [`Instance::object_path`].
#[derive(Debug, Default, PartialEq, Serialize, Clone)]
pub struct Instance {
    namespace: String,
    class_name: String,
    key_names: Vec<String>,
    properties: Vec<(String, Variant)>,
}

impl Instance {
    /// Create an instance for the class named by `path`.
    ///
    /// The key bindings of `path` become key properties of the new instance.
    pub fn new(path: &ObjectPath) -> Self {
        let mut inst = Instance {
            namespace: path.namespace().to_owned(),
            class_name: path.class_name().to_owned(),
            key_names: Vec::new(),
            properties: Vec::new(),
        };

        for (name, value) in path.keys() {
            inst.set_key(name, value.clone());
        }

        inst
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.namespace = namespace.into();
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Set a property, replacing an existing property of the same name.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Variant>) {
        let name = name.into();
        let value = value.into();

        match self
            .properties
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.properties.push((name, value)),
        }
    }

    /// Set a property and mark it as part of the instance identity.
    pub fn set_key(&mut self, name: impl Into<String>, value: impl Into<Variant>) {
        let name = name.into();

        if !self.is_key(&name) {
            self.key_names.push(name.clone());
        }

        self.set_property(name, value);
    }

    pub fn is_key(&self, name: &str) -> bool {
        self.key_names.iter().any(|k| k.eq_ignore_ascii_case(name))
    }

    pub fn get_property(&self, name: &str) -> Option<&Variant> {
        self.properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Variant)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// The identity of this instance: its namespace, class and key properties.
    ///
    /// Keys appear in the order they were declared. Keys without a value are left out.
    pub fn object_path(&self) -> ObjectPath {
        let mut op = ObjectPath::new(self.namespace.as_str(), self.class_name.as_str());

        for name in &self.key_names {
            if let Some(value) = self.get_property(name) {
                op.add_key(name.as_str(), value.clone());
            }
        }

        op
    }
}
