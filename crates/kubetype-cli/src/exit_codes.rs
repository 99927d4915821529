//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

#![allow(dead_code)]

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Unknown values - the typed value still holds unresolved nodes
pub const UNKNOWN_VALUES: i32 = 2;

/// Schema error - unsupported schema or resource kind not found
pub const SCHEMA_ERROR: i32 = 3;

/// Decode error - data does not fit its type
pub const DECODE_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
