//! A generic method provider.
//!
//! Each extrinsic method is described by a [`MethodHandler`]: its name, the
//! arguments it expects and the function implementing it. [`StdInvokeMethodMI`]
//! finds the handler for an incoming call, validates the input arguments against
//! the declaration and runs it.

use std::fmt;

use log::debug;

use crate::args::Args;
use crate::broker::{Broker, ResultSink};
use crate::context::Context;
use crate::eo_parser::parse_embedded_instance;
use crate::object_path::ObjectPath;
use crate::variant::{CIMType, Variant};
use crate::{CMPIError, CMPIResult};

/// Common return values of extrinsic methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MethodRc {
    Ok = 0,
    NotSupported = 1,
    Failed = 2,
    TimedOut = 3,
    SysNotFound = 4,
    SysNotDestroyable = 5,
    Async = 4096,
}

impl From<MethodRc> for Variant {
    fn from(rc: MethodRc) -> Self {
        Variant::UI4(rc as u32)
    }
}

/// A declared input argument of a method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodArg {
    pub name: String,
    pub cim_type: CIMType,
    pub array: bool,
    pub optional: bool,
}

impl MethodArg {
    pub fn new(name: &str, cim_type: CIMType) -> Self {
        MethodArg {
            name: name.to_owned(),
            cim_type,
            array: false,
            optional: false,
        }
    }

    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn type_name(&self) -> String {
        if self.array {
            format!("{}[]", self.cim_type)
        } else {
            self.cim_type.to_string()
        }
    }
}

/// What a method implementation gets to see of the call.
#[derive(Clone, Copy)]
pub struct MethodCall<'a> {
    pub context: &'a Context,
    pub reference: &'a ObjectPath,
    pub method: &'a str,
    /// The validated input arguments.
    pub args: &'a Args,
    pub broker: &'a dyn Broker,
    pub provider_name: &'a str,
}

pub type MethodFn =
    Box<dyn Fn(&MethodCall<'_>, &mut dyn ResultSink, &mut Args) -> CMPIResult<()> + Send + Sync>;

pub struct MethodHandler {
    name: String,
    args: Vec<MethodArg>,
    handler: MethodFn,
}

impl MethodHandler {
    pub fn new<F>(name: &str, handler: F) -> Self
    where
        F: Fn(&MethodCall<'_>, &mut dyn ResultSink, &mut Args) -> CMPIResult<()> + Send + Sync + 'static,
    {
        MethodHandler {
            name: name.to_owned(),
            args: Vec::new(),
            handler: Box::new(handler),
        }
    }

    pub fn arg(mut self, arg: MethodArg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[MethodArg] {
        &self.args
    }
}

impl fmt::Debug for MethodHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodHandler")
            .field("name", &self.name)
            .field("args", &self.args)
            .finish()
    }
}

pub struct StdInvokeMethodMI<B> {
    name: String,
    broker: B,
    handlers: Vec<MethodHandler>,
}

impl<B> StdInvokeMethodMI<B>
where
    B: Broker,
{
    pub fn new(name: impl Into<String>, broker: B, handlers: Vec<MethodHandler>) -> Self {
        StdInvokeMethodMI {
            name: name.into(),
            broker,
            handlers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `method` on `reference`.
    ///
    /// The sink is always told the call is done, whatever the outcome.
    pub fn invoke_method<R>(
        &self,
        context: &Context,
        results: &mut R,
        reference: &ObjectPath,
        method: &str,
        args_in: &Args,
        args_out: &mut Args,
    ) -> CMPIResult<()>
    where
        R: ResultSink,
    {
        debug!("Method `{}' execution attempted", method);

        let status = self.dispatch(context, results, reference, method, args_in, args_out);

        if let Err(e) = results.return_done() {
            debug!("Unable to signal the end of `{}': {}", method, e);
        }

        status
    }

    fn dispatch<R>(
        &self,
        context: &Context,
        results: &mut R,
        reference: &ObjectPath,
        method: &str,
        args_in: &Args,
        args_out: &mut Args,
    ) -> CMPIResult<()>
    where
        R: ResultSink,
    {
        let handler = self
            .handlers
            .iter()
            .find(|h| h.name == method)
            .ok_or_else(|| CMPIError::Failed("Unknown Method".to_owned()))?;

        let mut args = args_in.clone();
        for arg in &handler.args {
            self.validate_arg(arg, &mut args, reference.namespace())?;
        }

        let call = MethodCall {
            context,
            reference,
            method,
            args: &args,
            broker: &self.broker,
            provider_name: &self.name,
        };

        let results: &mut dyn ResultSink = results;

        debug!("Executing handler for method `{}'", method);
        let status = (handler.handler)(&call, results, args_out);
        debug!("Method `{}' returned {}", method, crate::CMPIStatus::from_result(&status));

        status
    }

    fn parse_instance(&self, arg: &MethodArg, eo: &str, ns: &str) -> CMPIResult<Variant> {
        match parse_embedded_instance(eo, &self.broker, ns) {
            Ok(Some(inst)) => Ok(Variant::Instance(Box::new(inst))),
            Ok(None) => Err(CMPIError::InvalidParameter(format!(
                "`{}' is not an embedded instance",
                arg.name
            ))),
            Err(e) => {
                debug!("Failed to parse embedded instance `{}': {}", arg.name, e);
                Err(CMPIError::InvalidParameter(format!(
                    "Unable to parse embedded instance `{}'",
                    arg.name
                )))
            }
        }
    }

    // Embedded instances arrive as strings and are replaced by the parsed instance.
    fn embedded_instance(&self, arg: &MethodArg, value: &Variant, ns: &str) -> CMPIResult<Option<Variant>> {
        match value {
            Variant::String(eo) if !arg.array => self.parse_instance(arg, eo, ns).map(Some),
            Variant::Array(items) if arg.array && items.iter().all(|i| i.as_str().is_some()) => {
                let parsed = items
                    .iter()
                    .filter_map(Variant::as_str)
                    .map(|eo| self.parse_instance(arg, eo, ns))
                    .collect::<CMPIResult<Vec<_>>>()?;

                Ok(Some(Variant::Array(parsed)))
            }
            _ => Ok(None),
        }
    }

    fn validate_arg(&self, arg: &MethodArg, args: &mut Args, ns: &str) -> CMPIResult<()> {
        let value = match args.get_arg(&arg.name) {
            Some(value) if !value.is_null() => value,
            _ if arg.optional => {
                debug!("Optional method parameter `{}' absent", arg.name);
                return Ok(());
            }
            _ => {
                debug!("Method parameter `{}' missing", arg.name);
                return Err(CMPIError::MissingArgument(arg.name.clone()));
            }
        };

        if arg.cim_type == CIMType::Instance {
            if let Some(parsed) = self.embedded_instance(arg, value, ns)? {
                debug!("Method parameter `{}' parsed as embedded instance", arg.name);
                args.add_arg(arg.name.as_str(), parsed);
                return Ok(());
            }
        }

        let matches = match value {
            Variant::Array(items) => arg.array && (items.is_empty() || value.cim_type() == arg.cim_type),
            _ => !arg.array && value.cim_type() == arg.cim_type,
        };

        if !matches {
            debug!("Method parameter `{}' type check failed", arg.name);
            let found = if value.is_array() {
                format!("{}[]", value.cim_type())
            } else {
                value.cim_type().to_string()
            };
            return Err(CMPIError::mismatch(&arg.name, arg.type_name(), found));
        }

        debug!("Method parameter `{}' validated type {}", arg.name, arg.type_name());

        Ok(())
    }

    pub fn cleanup(&self, _context: &Context, _terminating: bool) -> CMPIResult<()> {
        Ok(())
    }
}

impl<B> fmt::Debug for StdInvokeMethodMI<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdInvokeMethodMI")
            .field("name", &self.name)
            .field("handlers", &self.handlers)
            .finish()
    }
}
