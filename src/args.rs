use crate::variant::Variant;
use serde::Serialize;

/// An ordered bag of named method arguments.
#[derive(Debug, Default, PartialEq, Serialize, Clone)]
pub struct Args {
    args: Vec<(String, Variant)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Variant>) -> Self {
        self.add_arg(name, value);
        self
    }

    /// Set an argument, replacing an existing argument of the same name.
    pub fn add_arg(&mut self, name: impl Into<String>, value: impl Into<Variant>) {
        let name = name.into();
        let value = value.into();

        match self
            .args
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.args.push((name, value)),
        }
    }

    pub fn get_arg(&self, name: &str) -> Option<&Variant> {
        self.args
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variant)> {
        self.args.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_replaces_args_by_name() {
        let mut args = Args::new().with_arg("Name", "a");
        args.add_arg("NAME", "b");

        assert_eq!(args.len(), 1);
        assert_eq!(args.get_arg("name"), Some(&Variant::String("b".into())));
        assert!(args.get_arg("Other").is_none());
    }
}
