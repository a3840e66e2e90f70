use serde::Serialize;
use std::fmt;

/// Result codes understood by a CMPI broker.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
#[repr(u32)]
pub enum CMPIrc {
    Ok = 0,
    ErrFailed = 1,
    ErrAccessDenied = 2,
    ErrInvalidNamespace = 3,
    ErrInvalidParameter = 4,
    ErrInvalidClass = 5,
    ErrNotFound = 6,
    ErrNotSupported = 7,
    ErrClassHasChildren = 8,
    ErrClassHasInstances = 9,
    ErrInvalidSuperclass = 10,
    ErrAlreadyExists = 11,
    ErrNoSuchProperty = 12,
    ErrTypeMismatch = 13,
    ErrQueryLanguageNotSupported = 14,
    ErrInvalidQuery = 15,
    ErrMethodNotAvailable = 16,
    ErrMethodNotFound = 17,
    ErrSystem = 100,
    Error = 200,
}

impl CMPIrc {
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, CMPIrc::Ok)
    }

    /// Map a raw code back to its enum, if it is a known one.
    pub const fn from_code(code: u32) -> Option<CMPIrc> {
        let rc = match code {
            0 => CMPIrc::Ok,
            1 => CMPIrc::ErrFailed,
            2 => CMPIrc::ErrAccessDenied,
            3 => CMPIrc::ErrInvalidNamespace,
            4 => CMPIrc::ErrInvalidParameter,
            5 => CMPIrc::ErrInvalidClass,
            6 => CMPIrc::ErrNotFound,
            7 => CMPIrc::ErrNotSupported,
            8 => CMPIrc::ErrClassHasChildren,
            9 => CMPIrc::ErrClassHasInstances,
            10 => CMPIrc::ErrInvalidSuperclass,
            11 => CMPIrc::ErrAlreadyExists,
            12 => CMPIrc::ErrNoSuchProperty,
            13 => CMPIrc::ErrTypeMismatch,
            14 => CMPIrc::ErrQueryLanguageNotSupported,
            15 => CMPIrc::ErrInvalidQuery,
            16 => CMPIrc::ErrMethodNotAvailable,
            17 => CMPIrc::ErrMethodNotFound,
            100 => CMPIrc::ErrSystem,
            200 => CMPIrc::Error,
            _ => return None,
        };

        Some(rc)
    }

    pub const fn description(self) -> &'static str {
        to_str(self.code())
    }
}

impl fmt::Display for CMPIrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

pub const fn to_str(rc: u32) -> &'static str {
    match rc {
        CMPI_RC_OK => CMPI_RC_OK_EN,
        CMPI_RC_ERR_FAILED => CMPI_RC_ERR_FAILED_EN,
        CMPI_RC_ERR_ACCESS_DENIED => CMPI_RC_ERR_ACCESS_DENIED_EN,
        CMPI_RC_ERR_INVALID_NAMESPACE => CMPI_RC_ERR_INVALID_NAMESPACE_EN,
        CMPI_RC_ERR_INVALID_PARAMETER => CMPI_RC_ERR_INVALID_PARAMETER_EN,
        CMPI_RC_ERR_INVALID_CLASS => CMPI_RC_ERR_INVALID_CLASS_EN,
        CMPI_RC_ERR_NOT_FOUND => CMPI_RC_ERR_NOT_FOUND_EN,
        CMPI_RC_ERR_NOT_SUPPORTED => CMPI_RC_ERR_NOT_SUPPORTED_EN,
        CMPI_RC_ERR_CLASS_HAS_CHILDREN => CMPI_RC_ERR_CLASS_HAS_CHILDREN_EN,
        CMPI_RC_ERR_CLASS_HAS_INSTANCES => CMPI_RC_ERR_CLASS_HAS_INSTANCES_EN,
        CMPI_RC_ERR_INVALID_SUPERCLASS => CMPI_RC_ERR_INVALID_SUPERCLASS_EN,
        CMPI_RC_ERR_ALREADY_EXISTS => CMPI_RC_ERR_ALREADY_EXISTS_EN,
        CMPI_RC_ERR_NO_SUCH_PROPERTY => CMPI_RC_ERR_NO_SUCH_PROPERTY_EN,
        CMPI_RC_ERR_TYPE_MISMATCH => CMPI_RC_ERR_TYPE_MISMATCH_EN,
        CMPI_RC_ERR_QUERY_LANGUAGE_NOT_SUPPORTED => CMPI_RC_ERR_QUERY_LANGUAGE_NOT_SUPPORTED_EN,
        CMPI_RC_ERR_INVALID_QUERY => CMPI_RC_ERR_INVALID_QUERY_EN,
        CMPI_RC_ERR_METHOD_NOT_AVAILABLE => CMPI_RC_ERR_METHOD_NOT_AVAILABLE_EN,
        CMPI_RC_ERR_METHOD_NOT_FOUND => CMPI_RC_ERR_METHOD_NOT_FOUND_EN,
        CMPI_RC_ERROR_SYSTEM => CMPI_RC_ERROR_SYSTEM_EN,
        CMPI_RC_ERROR => CMPI_RC_ERROR_EN,
        _ => UNKNOWN_RC_EN,
    }
}

const UNKNOWN_RC_EN: &str = "Unknown result code.";

const CMPI_RC_OK: u32 = 0;
const CMPI_RC_OK_EN: &str = "(CMPI_RC_OK) Success.";

const CMPI_RC_ERR_FAILED: u32 = 1;
const CMPI_RC_ERR_FAILED_EN: &str =
    "(CMPI_RC_ERR_FAILED) Generic failure. The operation could not be completed.";

const CMPI_RC_ERR_ACCESS_DENIED: u32 = 2;
const CMPI_RC_ERR_ACCESS_DENIED_EN: &str =
    "(CMPI_RC_ERR_ACCESS_DENIED) The requester is not authorized for the operation.";

const CMPI_RC_ERR_INVALID_NAMESPACE: u32 = 3;
const CMPI_RC_ERR_INVALID_NAMESPACE_EN: &str =
    "(CMPI_RC_ERR_INVALID_NAMESPACE) The namespace does not exist.";

const CMPI_RC_ERR_INVALID_PARAMETER: u32 = 4;
const CMPI_RC_ERR_INVALID_PARAMETER_EN: &str =
    "(CMPI_RC_ERR_INVALID_PARAMETER) One or more parameter values passed to the operation are \
    not valid.";

const CMPI_RC_ERR_INVALID_CLASS: u32 = 5;
const CMPI_RC_ERR_INVALID_CLASS_EN: &str =
    "(CMPI_RC_ERR_INVALID_CLASS) The specified class does not exist.";

const CMPI_RC_ERR_NOT_FOUND: u32 = 6;
const CMPI_RC_ERR_NOT_FOUND_EN: &str =
    "(CMPI_RC_ERR_NOT_FOUND) The requested object could not be found.";

const CMPI_RC_ERR_NOT_SUPPORTED: u32 = 7;
const CMPI_RC_ERR_NOT_SUPPORTED_EN: &str =
    "(CMPI_RC_ERR_NOT_SUPPORTED) The requested operation is not supported by this provider.";

const CMPI_RC_ERR_CLASS_HAS_CHILDREN: u32 = 8;
const CMPI_RC_ERR_CLASS_HAS_CHILDREN_EN: &str =
    "(CMPI_RC_ERR_CLASS_HAS_CHILDREN) The operation cannot be invoked on this class because it \
    has subclasses.";

const CMPI_RC_ERR_CLASS_HAS_INSTANCES: u32 = 9;
const CMPI_RC_ERR_CLASS_HAS_INSTANCES_EN: &str =
    "(CMPI_RC_ERR_CLASS_HAS_INSTANCES) The operation cannot be invoked on this class because \
    one or more instances of this class exist.";

const CMPI_RC_ERR_INVALID_SUPERCLASS: u32 = 10;
const CMPI_RC_ERR_INVALID_SUPERCLASS_EN: &str =
    "(CMPI_RC_ERR_INVALID_SUPERCLASS) The specified superclass does not exist.";

const CMPI_RC_ERR_ALREADY_EXISTS: u32 = 11;
const CMPI_RC_ERR_ALREADY_EXISTS_EN: &str =
    "(CMPI_RC_ERR_ALREADY_EXISTS) The object already exists.";

const CMPI_RC_ERR_NO_SUCH_PROPERTY: u32 = 12;
const CMPI_RC_ERR_NO_SUCH_PROPERTY_EN: &str =
    "(CMPI_RC_ERR_NO_SUCH_PROPERTY) The specified property does not exist.";

const CMPI_RC_ERR_TYPE_MISMATCH: u32 = 13;
const CMPI_RC_ERR_TYPE_MISMATCH_EN: &str =
    "(CMPI_RC_ERR_TYPE_MISMATCH) The value supplied is not compatible with the type.";

const CMPI_RC_ERR_QUERY_LANGUAGE_NOT_SUPPORTED: u32 = 14;
const CMPI_RC_ERR_QUERY_LANGUAGE_NOT_SUPPORTED_EN: &str =
    "(CMPI_RC_ERR_QUERY_LANGUAGE_NOT_SUPPORTED) The query language is not recognized or \
    supported.";

const CMPI_RC_ERR_INVALID_QUERY: u32 = 15;
const CMPI_RC_ERR_INVALID_QUERY_EN: &str =
    "(CMPI_RC_ERR_INVALID_QUERY) The query is not valid for the specified query language.";

const CMPI_RC_ERR_METHOD_NOT_AVAILABLE: u32 = 16;
const CMPI_RC_ERR_METHOD_NOT_AVAILABLE_EN: &str =
    "(CMPI_RC_ERR_METHOD_NOT_AVAILABLE) The extrinsic method could not be executed.";

const CMPI_RC_ERR_METHOD_NOT_FOUND: u32 = 17;
const CMPI_RC_ERR_METHOD_NOT_FOUND_EN: &str =
    "(CMPI_RC_ERR_METHOD_NOT_FOUND) The specified extrinsic method does not exist.";

const CMPI_RC_ERROR_SYSTEM: u32 = 100;
const CMPI_RC_ERROR_SYSTEM_EN: &str = "(CMPI_RC_ERROR_SYSTEM) A system error occurred.";

const CMPI_RC_ERROR: u32 = 200;
const CMPI_RC_ERROR_EN: &str = "(CMPI_RC_ERROR) An unspecified error occurred.";
