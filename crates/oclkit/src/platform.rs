// SPDX-License-Identifier: AGPL-3.0-or-later

//! Platform enumeration and platform-level info queries.

use serde::{Deserialize, Serialize};

use crate::device::DeviceSummary;

/// Serializable snapshot of one platform and the devices behind it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformSummary {
    pub profile: String,
    /// Raw version report, e.g. `"OpenCL 3.0 CUDA 12.2.138"`.
    pub version: String,
    pub name: String,
    pub vendor: String,
    pub extensions: Vec<String>,
    pub devices: Vec<DeviceSummary>,
}

#[cfg(feature = "opencl-real")]
pub use real::Platform;

#[cfg(feature = "opencl-real")]
mod real {
    use std::ptr;

    use oclkit_sys as sys;
    use sys::{cl_platform_id, cl_platform_info, cl_uint};

    use super::PlatformSummary;
    use crate::device::{contains_token, Device};
    use crate::error::{check, Error, Result};
    use crate::version::ClVersion;

    /// Handle to one OpenCL platform.
    ///
    /// Platforms are not reference counted, so this is a plain copyable
    /// handle; all fallible work happens in the info queries.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    #[repr(transparent)]
    pub struct Platform {
        raw: cl_platform_id,
    }

    // Platform queries are callable from any thread and the wrapper holds
    // no host-side state.
    unsafe impl Send for Platform {}
    unsafe impl Sync for Platform {}

    impl Platform {
        /// Wrap a raw platform handle.
        ///
        /// # Safety
        ///
        /// `raw` must be null or a valid platform ID. Null is tolerated so
        /// runtime reports can be wrapped unchecked; every query on a null
        /// platform fails with [`Error::NullPlatform`].
        pub unsafe fn from_raw(raw: cl_platform_id) -> Self {
            Platform { raw }
        }

        pub fn as_raw(&self) -> cl_platform_id {
            self.raw
        }

        /// Every platform the ICD loader knows about. An installation with
        /// zero platforms is reported as [`Error::NoPlatforms`] rather than
        /// an empty list.
        pub fn all() -> Result<Vec<Platform>> {
            let mut count: cl_uint = 0;
            let status = unsafe { sys::clGetPlatformIDs(0, ptr::null_mut(), &mut count) };
            check("clGetPlatformIDs", status)?;
            if count == 0 {
                return Err(Error::NoPlatforms);
            }
            let mut ids: Vec<cl_platform_id> = vec![ptr::null_mut(); count as usize];
            let status =
                unsafe { sys::clGetPlatformIDs(count, ids.as_mut_ptr(), ptr::null_mut()) };
            check("clGetPlatformIDs", status)?;
            Ok(ids.into_iter().map(|raw| Platform { raw }).collect())
        }

        /// Whether this handle is one of the installed platforms. A null
        /// handle is an explicit error, and an installation with zero
        /// platforms surfaces as [`Error::NoPlatforms`].
        pub fn exists(&self) -> Result<bool> {
            if self.raw.is_null() {
                return Err(Error::NullPlatform);
            }
            Ok(Platform::all()?.contains(self))
        }

        /// All devices on this platform, regardless of type. A platform
        /// that answers `CL_DEVICE_NOT_FOUND` surfaces that as an error.
        pub fn devices(&self) -> Result<Vec<Device>> {
            if self.raw.is_null() {
                return Err(Error::NullPlatform);
            }
            let mut count: cl_uint = 0;
            let status = unsafe {
                sys::clGetDeviceIDs(
                    self.raw,
                    sys::CL_DEVICE_TYPE_ALL,
                    0,
                    ptr::null_mut(),
                    &mut count,
                )
            };
            check("clGetDeviceIDs", status)?;
            let mut ids: Vec<sys::cl_device_id> = vec![ptr::null_mut(); count as usize];
            let status = unsafe {
                sys::clGetDeviceIDs(
                    self.raw,
                    sys::CL_DEVICE_TYPE_ALL,
                    count,
                    ids.as_mut_ptr(),
                    ptr::null_mut(),
                )
            };
            check("clGetDeviceIDs", status)?;
            ids.into_iter()
                .map(|raw| unsafe { Device::from_raw(raw) })
                .collect()
        }

        pub fn profile(&self) -> Result<String> {
            self.info_string(sys::CL_PLATFORM_PROFILE, "clGetPlatformInfo(CL_PLATFORM_PROFILE)")
        }

        /// Raw version report, e.g. `"OpenCL 3.0 CUDA 12.2.138"`.
        pub fn version_report(&self) -> Result<String> {
            self.info_string(sys::CL_PLATFORM_VERSION, "clGetPlatformInfo(CL_PLATFORM_VERSION)")
        }

        /// Parsed `<major>.<minor>` from the version report.
        pub fn version(&self) -> Result<ClVersion> {
            ClVersion::parse_report(&self.version_report()?)
        }

        /// Whether the platform reports at least the given OpenCL version.
        /// A report that does not parse counts as version 0.0.
        pub fn supports_version(&self, major: u32, minor: u32) -> Result<bool> {
            Ok(ClVersion::report_at_least(
                &self.version_report()?,
                major,
                minor,
            ))
        }

        pub fn name(&self) -> Result<String> {
            self.info_string(sys::CL_PLATFORM_NAME, "clGetPlatformInfo(CL_PLATFORM_NAME)")
        }

        pub fn vendor(&self) -> Result<String> {
            self.info_string(sys::CL_PLATFORM_VENDOR, "clGetPlatformInfo(CL_PLATFORM_VENDOR)")
        }

        /// Raw space-delimited extension list as reported by the loader.
        pub fn extensions_string(&self) -> Result<String> {
            self.info_string(
                sys::CL_PLATFORM_EXTENSIONS,
                "clGetPlatformInfo(CL_PLATFORM_EXTENSIONS)",
            )
        }

        pub fn extensions(&self) -> Result<Vec<String>> {
            let list = self.extensions_string()?;
            Ok(list.split_whitespace().map(str::to_owned).collect())
        }

        /// Exact-token test against the platform's extension list.
        pub fn supports_extension(&self, token: &str) -> Result<bool> {
            Ok(contains_token(&self.extensions_string()?, token))
        }

        /// Full snapshot of this platform, including one entry per device.
        pub fn summary(&self) -> Result<PlatformSummary> {
            let devices = self
                .devices()?
                .iter()
                .map(Device::summary)
                .collect::<Result<Vec<_>>>()?;
            Ok(PlatformSummary {
                profile: self.profile()?,
                version: self.version_report()?,
                name: self.name()?,
                vendor: self.vendor()?,
                extensions: self.extensions()?,
                devices,
            })
        }

        fn info_string(&self, param: cl_platform_info, call: &'static str) -> Result<String> {
            if self.raw.is_null() {
                return Err(Error::NullPlatform);
            }
            let mut size = 0usize;
            let status =
                unsafe { sys::clGetPlatformInfo(self.raw, param, 0, ptr::null_mut(), &mut size) };
            check(call, status)?;
            if size == 0 {
                return Err(Error::EmptyInfo { call });
            }
            let mut buf = vec![0u8; size];
            let status = unsafe {
                sys::clGetPlatformInfo(
                    self.raw,
                    param,
                    size,
                    buf.as_mut_ptr().cast(),
                    ptr::null_mut(),
                )
            };
            check(call, status)?;
            // The runtime includes the terminating NUL in the byte count.
            while buf.last() == Some(&0) {
                buf.pop();
            }
            Ok(String::from_utf8_lossy(&buf).into_owned())
        }
    }
}
