//! Filesystem error classification
//!
//! Splits failures into permission problems, which need user remediation
//! (run elevated, enable developer mode, fix ACLs), and everything else.

use serde::{Deserialize, Serialize};

/// Coarse class of a filesystem failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    PermissionDenied,
    Other,
}

#[cfg(unix)]
const PERMISSION_CODES: &[i32] = &[
    1,  // EPERM
    13, // EACCES
];

#[cfg(windows)]
const PERMISSION_CODES: &[i32] = &[
    5,    // ERROR_ACCESS_DENIED
    1314, // ERROR_PRIVILEGE_NOT_HELD, symlinks without developer mode
];

#[cfg(not(any(unix, windows)))]
const PERMISSION_CODES: &[i32] = &[];

/// Classify an I/O error.
pub fn classify(error: &std::io::Error) -> ErrorClass {
    if error.kind() == std::io::ErrorKind::PermissionDenied {
        return ErrorClass::PermissionDenied;
    }
    match error.raw_os_error() {
        Some(code) if PERMISSION_CODES.contains(&code) => ErrorClass::PermissionDenied,
        _ => ErrorClass::Other,
    }
}

/// Classify a mirror-fs error, looking through to the I/O cause.
pub fn classify_fs(error: &mirror_fs::Error) -> ErrorClass {
    error.io_source().map(classify).unwrap_or(ErrorClass::Other)
}
