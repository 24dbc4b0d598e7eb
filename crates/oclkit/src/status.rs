// SPDX-License-Identifier: AGPL-3.0-or-later

//! OpenCL status codes with readable names.

use std::fmt;

use oclkit_sys as sys;
use sys::cl_int;

/// Raw status code returned by an OpenCL entry point.
///
/// Wraps the `cl_int` so call sites can log and compare codes without
/// sprinkling magic numbers around. [`Status::name`] knows the portable
/// codes plus the common loader extensions; anything else renders through
/// the hex/decimal fallback in [`fmt::Display`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(pub cl_int);

impl Status {
    pub const SUCCESS: Status = Status(sys::CL_SUCCESS);

    pub fn is_success(self) -> bool {
        self.0 == sys::CL_SUCCESS
    }

    pub fn code(self) -> cl_int {
        self.0
    }

    /// Symbolic name for the code, if it is one we know.
    pub fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            sys::CL_SUCCESS => "CL_SUCCESS",
            sys::CL_DEVICE_NOT_FOUND => "CL_DEVICE_NOT_FOUND",
            sys::CL_DEVICE_NOT_AVAILABLE => "CL_DEVICE_NOT_AVAILABLE",
            sys::CL_COMPILER_NOT_AVAILABLE => "CL_COMPILER_NOT_AVAILABLE",
            sys::CL_MEM_OBJECT_ALLOCATION_FAILURE => "CL_MEM_OBJECT_ALLOCATION_FAILURE",
            sys::CL_OUT_OF_RESOURCES => "CL_OUT_OF_RESOURCES",
            sys::CL_OUT_OF_HOST_MEMORY => "CL_OUT_OF_HOST_MEMORY",
            sys::CL_PROFILING_INFO_NOT_AVAILABLE => "CL_PROFILING_INFO_NOT_AVAILABLE",
            sys::CL_MEM_COPY_OVERLAP => "CL_MEM_COPY_OVERLAP",
            sys::CL_IMAGE_FORMAT_MISMATCH => "CL_IMAGE_FORMAT_MISMATCH",
            sys::CL_IMAGE_FORMAT_NOT_SUPPORTED => "CL_IMAGE_FORMAT_NOT_SUPPORTED",
            sys::CL_BUILD_PROGRAM_FAILURE => "CL_BUILD_PROGRAM_FAILURE",
            sys::CL_MAP_FAILURE => "CL_MAP_FAILURE",
            sys::CL_MISALIGNED_SUB_BUFFER_OFFSET => "CL_MISALIGNED_SUB_BUFFER_OFFSET",
            sys::CL_EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST => {
                "CL_EXEC_STATUS_ERROR_FOR_EVENTS_IN_WAIT_LIST"
            }
            sys::CL_COMPILE_PROGRAM_FAILURE => "CL_COMPILE_PROGRAM_FAILURE",
            sys::CL_LINKER_NOT_AVAILABLE => "CL_LINKER_NOT_AVAILABLE",
            sys::CL_LINK_PROGRAM_FAILURE => "CL_LINK_PROGRAM_FAILURE",
            sys::CL_DEVICE_PARTITION_FAILED => "CL_DEVICE_PARTITION_FAILED",
            sys::CL_KERNEL_ARG_INFO_NOT_AVAILABLE => "CL_KERNEL_ARG_INFO_NOT_AVAILABLE",
            sys::CL_INVALID_VALUE => "CL_INVALID_VALUE",
            sys::CL_INVALID_DEVICE_TYPE => "CL_INVALID_DEVICE_TYPE",
            sys::CL_INVALID_PLATFORM => "CL_INVALID_PLATFORM",
            sys::CL_INVALID_DEVICE => "CL_INVALID_DEVICE",
            sys::CL_INVALID_CONTEXT => "CL_INVALID_CONTEXT",
            sys::CL_INVALID_QUEUE_PROPERTIES => "CL_INVALID_QUEUE_PROPERTIES",
            sys::CL_INVALID_COMMAND_QUEUE => "CL_INVALID_COMMAND_QUEUE",
            sys::CL_INVALID_HOST_PTR => "CL_INVALID_HOST_PTR",
            sys::CL_INVALID_MEM_OBJECT => "CL_INVALID_MEM_OBJECT",
            sys::CL_INVALID_IMAGE_FORMAT_DESCRIPTOR => "CL_INVALID_IMAGE_FORMAT_DESCRIPTOR",
            sys::CL_INVALID_IMAGE_SIZE => "CL_INVALID_IMAGE_SIZE",
            sys::CL_INVALID_SAMPLER => "CL_INVALID_SAMPLER",
            sys::CL_INVALID_BINARY => "CL_INVALID_BINARY",
            sys::CL_INVALID_BUILD_OPTIONS => "CL_INVALID_BUILD_OPTIONS",
            sys::CL_INVALID_PROGRAM => "CL_INVALID_PROGRAM",
            sys::CL_INVALID_PROGRAM_EXECUTABLE => "CL_INVALID_PROGRAM_EXECUTABLE",
            sys::CL_INVALID_KERNEL_NAME => "CL_INVALID_KERNEL_NAME",
            sys::CL_INVALID_KERNEL_DEFINITION => "CL_INVALID_KERNEL_DEFINITION",
            sys::CL_INVALID_KERNEL => "CL_INVALID_KERNEL",
            sys::CL_INVALID_ARG_INDEX => "CL_INVALID_ARG_INDEX",
            sys::CL_INVALID_ARG_VALUE => "CL_INVALID_ARG_VALUE",
            sys::CL_INVALID_ARG_SIZE => "CL_INVALID_ARG_SIZE",
            sys::CL_INVALID_KERNEL_ARGS => "CL_INVALID_KERNEL_ARGS",
            sys::CL_INVALID_WORK_DIMENSION => "CL_INVALID_WORK_DIMENSION",
            sys::CL_INVALID_WORK_GROUP_SIZE => "CL_INVALID_WORK_GROUP_SIZE",
            sys::CL_INVALID_WORK_ITEM_SIZE => "CL_INVALID_WORK_ITEM_SIZE",
            sys::CL_INVALID_GLOBAL_OFFSET => "CL_INVALID_GLOBAL_OFFSET",
            sys::CL_INVALID_EVENT_WAIT_LIST => "CL_INVALID_EVENT_WAIT_LIST",
            sys::CL_INVALID_EVENT => "CL_INVALID_EVENT",
            sys::CL_INVALID_OPERATION => "CL_INVALID_OPERATION",
            sys::CL_INVALID_GL_OBJECT => "CL_INVALID_GL_OBJECT",
            sys::CL_INVALID_BUFFER_SIZE => "CL_INVALID_BUFFER_SIZE",
            sys::CL_INVALID_MIP_LEVEL => "CL_INVALID_MIP_LEVEL",
            sys::CL_INVALID_GLOBAL_WORK_SIZE => "CL_INVALID_GLOBAL_WORK_SIZE",
            sys::CL_INVALID_PROPERTY => "CL_INVALID_PROPERTY",
            sys::CL_INVALID_IMAGE_DESCRIPTOR => "CL_INVALID_IMAGE_DESCRIPTOR",
            sys::CL_INVALID_COMPILER_OPTIONS => "CL_INVALID_COMPILER_OPTIONS",
            sys::CL_INVALID_LINKER_OPTIONS => "CL_INVALID_LINKER_OPTIONS",
            sys::CL_INVALID_DEVICE_PARTITION_COUNT => "CL_INVALID_DEVICE_PARTITION_COUNT",
            sys::CL_INVALID_GL_SHAREGROUP_REFERENCE_KHR => {
                "CL_INVALID_GL_SHAREGROUP_REFERENCE_KHR"
            }
            sys::CL_PLATFORM_NOT_FOUND_KHR => "CL_PLATFORM_NOT_FOUND_KHR",
            sys::CL_DEVICE_PARTITION_FAILED_EXT => "CL_DEVICE_PARTITION_FAILED_EXT",
            sys::CL_INVALID_PARTITION_COUNT_EXT => "CL_INVALID_PARTITION_COUNT_EXT",
            _ => return None,
        };
        Some(name)
    }
}

impl From<cl_int> for Status {
    fn from(code: cl_int) -> Self {
        Status(code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "unknown status (0x{:x} / {})", self.0, self.0),
        }
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_success() {
        assert!(Status::SUCCESS.is_success());
        assert!(!Status(sys::CL_DEVICE_NOT_FOUND).is_success());
    }

    #[test]
    fn known_codes_have_names() {
        assert_eq!(Status(0).name(), Some("CL_SUCCESS"));
        assert_eq!(Status(-1).name(), Some("CL_DEVICE_NOT_FOUND"));
        assert_eq!(Status(-30).name(), Some("CL_INVALID_VALUE"));
        assert_eq!(Status(-64).name(), Some("CL_INVALID_PROPERTY"));
        assert_eq!(Status(-1001).name(), Some("CL_PLATFORM_NOT_FOUND_KHR"));
    }

    #[test]
    fn unknown_code_renders_hex_and_decimal() {
        let status = Status(-9999);
        assert_eq!(status.name(), None);
        let rendered = status.to_string();
        assert!(rendered.contains("0xffffd8f1"), "got {rendered}");
        assert!(rendered.contains("-9999"), "got {rendered}");
    }

    #[test]
    fn display_uses_name_when_known() {
        assert_eq!(Status(-5).to_string(), "CL_OUT_OF_RESOURCES");
        assert_eq!(format!("{:?}", Status(-5)), "Status(CL_OUT_OF_RESOURCES)");
    }
}
