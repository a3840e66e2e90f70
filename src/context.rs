use std::collections::HashMap;

use serde::Serialize;

/// Name of the context entry carrying the invocation flags of a request.
pub const CMPI_INVOCATION_FLAGS: &str = "CMPIInvocationFlags";
/// Name of the context entry carrying the authenticated principal.
pub const CMPI_PRINCIPAL: &str = "CMPIPrincipal";
/// Name of the context entry carrying the namespace the provider was loaded for.
pub const CMPI_INIT_NAMESPACE: &str = "CMPIInitNameSpace";

#[derive(Debug, PartialEq, Serialize, Clone)]
#[serde(untagged)]
pub enum ContextValueType {
    String(String),
    U4(u32),
    I4(i32),
    R8(f64),
    Bool(bool),
}

/// Named values the broker passes along with every request.
///
/// The helpers in this crate never interpret these, they only hand them to handlers.
#[derive(Debug, Default, PartialEq, Serialize, Clone)]
pub struct Context {
    entries: HashMap<String, ContextValueType>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the specified named context values.
    ///
    /// Values persist until [`Context::clear_ctx_values`] is called.
    pub fn set_ctx_values(&mut self, ctx_values: HashMap<String, ContextValueType>) {
        for (k, v) in ctx_values {
            self.entries.insert(k, v);
        }
    }

    pub fn with_entry(mut self, name: impl Into<String>, value: impl Into<ContextValueType>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    pub fn get_entry(&self, name: &str) -> Option<&ContextValueType> {
        self.entries.get(name)
    }

    /// Clears all named values.
    pub fn clear_ctx_values(&mut self) {
        self.entries.clear();
    }

    pub fn principal(&self) -> Option<&str> {
        match self.entries.get(CMPI_PRINCIPAL) {
            Some(ContextValueType::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn invocation_flags(&self) -> u32 {
        match self.entries.get(CMPI_INVOCATION_FLAGS) {
            Some(ContextValueType::U4(flags)) => *flags,
            Some(ContextValueType::I4(flags)) => *flags as u32,
            _ => 0,
        }
    }
}

macro_rules! impl_from_type {
    ($target_type:ty, $variant:ident) => {
        impl From<$target_type> for ContextValueType {
            fn from(value: $target_type) -> Self {
                Self::$variant(value.into())
            }
        }
    };
}

impl_from_type!(&str, String);
impl_from_type!(String, String);
impl_from_type!(u32, U4);
impl_from_type!(i32, I4);
impl_from_type!(f64, R8);
impl_from_type!(bool, Bool);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_ctx_values_used() {
        let mut ctx = Context::new()
            .with_entry(CMPI_PRINCIPAL, "root")
            .with_entry(CMPI_INVOCATION_FLAGS, 2u32);

        assert_eq!(ctx.principal(), Some("root"));
        assert_eq!(ctx.invocation_flags(), 2);

        let mut ctx_values = HashMap::new();
        ctx_values.insert(CMPI_INIT_NAMESPACE.into(), "root/virt".into());
        ctx.set_ctx_values(ctx_values);

        assert_eq!(
            ctx.get_entry(CMPI_INIT_NAMESPACE),
            Some(&ContextValueType::String("root/virt".into()))
        );

        ctx.clear_ctx_values();
        assert_eq!(ctx.principal(), None);
        assert_eq!(ctx.invocation_flags(), 0);
    }
}
