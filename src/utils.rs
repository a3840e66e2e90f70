use crate::rc::CMPIrc;
use serde::{de, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors returned by the helpers of this crate.
///
/// Every variant maps to a broker result code through [`CMPIError::rc`],
/// so a provider can always hand a failure back to the broker as a [`CMPIStatus`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CMPIError {
    #[error("Missing argument `{0}`")]
    MissingArgument(String),
    #[error("No such property `{0}`")]
    NoSuchProperty(String),
    #[error("Missing key `{0}`")]
    MissingKey(String),
    #[error("Type mismatch for `{name}`: expected {expected}, found {found}")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Failed(String),
    #[error("Operation not supported")]
    NotSupported,
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Converting from CIM datetime failed for {0}")]
    ConvertDatetimeError(String),
    #[error(transparent)]
    ParseIntError(#[from] std::num::ParseIntError),
    #[error(transparent)]
    ParseFloatError(#[from] std::num::ParseFloatError),
    #[error("Serde error: {0}")]
    SerdeError(String),
    #[error("{}", status_text(.rc, .msg))]
    Status { rc: CMPIrc, msg: Option<String> },
}

impl CMPIError {
    /// The broker result code this error is reported as.
    pub fn rc(&self) -> CMPIrc {
        match self {
            CMPIError::MissingArgument(_) => CMPIrc::ErrInvalidParameter,
            CMPIError::NoSuchProperty(_) => CMPIrc::ErrNoSuchProperty,
            CMPIError::MissingKey(_) => CMPIrc::ErrNotFound,
            CMPIError::TypeMismatch { .. } => CMPIrc::ErrTypeMismatch,
            CMPIError::InvalidParameter(_) => CMPIrc::ErrInvalidParameter,
            CMPIError::NotFound(_) => CMPIrc::ErrNotFound,
            CMPIError::NotSupported => CMPIrc::ErrNotSupported,
            CMPIError::Status { rc, .. } => *rc,
            CMPIError::Failed(_)
            | CMPIError::OutOfMemory
            | CMPIError::ConvertDatetimeError(_)
            | CMPIError::ParseIntError(_)
            | CMPIError::ParseFloatError(_)
            | CMPIError::SerdeError(_) => CMPIrc::ErrFailed,
        }
    }

    /// `true` for the "named value is absent" family of errors.
    pub fn is_not_found(&self) -> bool {
        match self {
            CMPIError::MissingArgument(_)
            | CMPIError::NoSuchProperty(_)
            | CMPIError::MissingKey(_)
            | CMPIError::NotFound(_) => true,
            CMPIError::Status { rc, .. } => *rc == CMPIrc::ErrNotFound,
            _ => false,
        }
    }

    pub fn is_type_mismatch(&self) -> bool {
        self.rc() == CMPIrc::ErrTypeMismatch
    }

    pub(crate) fn mismatch(name: &str, expected: impl fmt::Display, found: impl fmt::Display) -> Self {
        CMPIError::TypeMismatch {
            name: name.to_owned(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

fn status_text<'a>(rc: &CMPIrc, msg: &'a Option<String>) -> &'a str {
    match msg {
        Some(msg) => msg.as_str(),
        None => rc.description(),
    }
}

impl de::Error for CMPIError {
    #[cold]
    fn custom<T: fmt::Display>(msg: T) -> CMPIError {
        Self::SerdeError(format!("{}", msg))
    }
}

pub type CMPIResult<T> = Result<T, CMPIError>;

/// The status pair returned to a broker: a result code and an optional message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CMPIStatus {
    pub rc: CMPIrc,
    pub msg: Option<String>,
}

impl CMPIStatus {
    pub fn ok() -> Self {
        CMPIStatus {
            rc: CMPIrc::Ok,
            msg: None,
        }
    }

    pub fn new(rc: CMPIrc, msg: impl Into<String>) -> Self {
        CMPIStatus {
            rc,
            msg: Some(msg.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.rc.is_ok()
    }

    pub fn from_result<T>(result: &CMPIResult<T>) -> Self {
        match result {
            Ok(_) => CMPIStatus::ok(),
            Err(e) => e.into(),
        }
    }

    pub fn into_result(self) -> CMPIResult<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(CMPIError::Status {
                rc: self.rc,
                msg: self.msg,
            })
        }
    }
}

impl Default for CMPIStatus {
    fn default() -> Self {
        CMPIStatus::ok()
    }
}

impl From<&CMPIError> for CMPIStatus {
    fn from(err: &CMPIError) -> Self {
        match err {
            CMPIError::Status { rc, msg } => CMPIStatus {
                rc: *rc,
                msg: msg.clone(),
            },
            other => CMPIStatus::new(other.rc(), other.to_string()),
        }
    }
}

impl From<CMPIError> for CMPIStatus {
    fn from(err: CMPIError) -> Self {
        CMPIStatus::from(&err)
    }
}

impl fmt::Display for CMPIStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.msg {
            Some(msg) => write!(f, "{:?}: {}", self.rc, msg),
            None => write!(f, "{:?}", self.rc),
        }
    }
}
