use crate::variant::Variant;
use serde::Serialize;
use std::fmt;

/// Identifies an instance by namespace, class name and key bindings.
///
/// Keys keep their insertion order, which is the order [`ObjectPath::keys`] and
/// the reference comparison walk them in. Key names are matched case-insensitively.
#[derive(Debug, Default, PartialEq, Serialize, Clone)]
pub struct ObjectPath {
    namespace: String,
    class_name: String,
    keys: Vec<(String, Variant)>,
}

impl ObjectPath {
    pub fn new(namespace: impl Into<String>, class_name: impl Into<String>) -> Self {
        ObjectPath {
            namespace: namespace.into(),
            class_name: class_name.into(),
            keys: Vec::new(),
        }
    }

    /// Builder-style [`ObjectPath::add_key`].
    pub fn with_key(mut self, name: impl Into<String>, value: impl Into<Variant>) -> Self {
        self.add_key(name, value);
        self
    }

    /// Set a key binding, replacing an existing binding of the same name.
    pub fn add_key(&mut self, name: impl Into<String>, value: impl Into<Variant>) {
        let name = name.into();
        let value = value.into();

        match self
            .keys
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.keys.push((name, value)),
        }
    }

    pub fn get_key(&self, name: &str) -> Option<&Variant> {
        self.keys
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn key_at(&self, index: usize) -> Option<(&str, &Variant)> {
        self.keys.get(index).map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = (&str, &Variant)> {
        self.keys.iter().map(|(k, v)| (k.as_str(), v))
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

    pub fn set_class_name(&mut self, class_name: impl Into<String>) {
        self.class_name = class_name.into();
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.namespace.is_empty() {
            write!(f, "{}:", self.namespace)?;
        }

        f.write_str(&self.class_name)?;

        for (i, (name, value)) in self.keys.iter().enumerate() {
            let sep = if i == 0 { '.' } else { ',' };
            write!(f, "{}{}={}", sep, name, value)?;
        }

        Ok(())
    }
}
