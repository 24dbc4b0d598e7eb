// SPDX-License-Identifier: AGPL-3.0-or-later

//! Device handles and capability queries.
//!
//! [`Device`] wraps a single `cl_device_id` and answers capability questions
//! about it: identity strings, compute and memory limits, image support,
//! extension tokens and the owning platform. The device type bits are
//! queried once at construction and cached, so the type predicates never
//! touch the driver again.
//!
//! Handles are reference counted by runtimes that implement OpenCL 1.2 or
//! newer. Cloning retains, dropping releases, and both steps are skipped on
//! older runtimes and on null handles.

use serde::{Deserialize, Serialize};

use oclkit_sys as sys;
use sys::cl_device_type;

/// Broad device category derived from the `CL_DEVICE_TYPE` bitfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Cpu,
    Gpu,
    Accelerator,
    Custom,
    /// No recognised type bit was set (or the device was never queried).
    Unspecified,
}

impl DeviceKind {
    /// Collapse a type bitfield to its primary category. The dedicated
    /// bits win over `CL_DEVICE_TYPE_DEFAULT`, which the runtime may OR
    /// into any report.
    pub fn from_bits(bits: cl_device_type) -> Self {
        if bits & sys::CL_DEVICE_TYPE_GPU != 0 {
            DeviceKind::Gpu
        } else if bits & sys::CL_DEVICE_TYPE_CPU != 0 {
            DeviceKind::Cpu
        } else if bits & sys::CL_DEVICE_TYPE_ACCELERATOR != 0 {
            DeviceKind::Accelerator
        } else if bits & sys::CL_DEVICE_TYPE_CUSTOM != 0 {
            DeviceKind::Custom
        } else {
            DeviceKind::Unspecified
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeviceKind::Cpu => "cpu",
            DeviceKind::Gpu => "gpu",
            DeviceKind::Accelerator => "accelerator",
            DeviceKind::Custom => "custom",
            DeviceKind::Unspecified => "unspecified",
        }
    }
}

/// Exact-token membership test for space-delimited extension lists.
///
/// `cl_khr_fp6` must not match a list containing `cl_khr_fp64`, so this is
/// a whole-token comparison, not a substring search.
#[cfg_attr(not(feature = "opencl-real"), allow(dead_code))]
pub(crate) fn contains_token(list: &str, token: &str) -> bool {
    list.split_whitespace().any(|entry| entry == token)
}

/// Serializable snapshot of one device's capability report.
///
/// Produced by [`Device::summary`] on live runtimes and by the environment
/// probe when no runtime is linked in, so downstream consumers can share
/// one schema for both.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub name: String,
    pub vendor: String,
    pub profile: String,
    /// Raw version report, e.g. `"OpenCL 3.0 CUDA"`.
    pub version: String,
    pub kind: DeviceKind,
    pub max_compute_units: u32,
    pub max_work_item_dimensions: u32,
    pub max_work_item_sizes: Vec<usize>,
    pub max_work_group_size: usize,
    pub global_mem_size: u64,
    pub local_mem_size: u64,
    pub max_constant_buffer_size: u64,
    pub max_mem_alloc_size: u64,
    pub image_support: bool,
    pub extensions: Vec<String>,
}

impl DeviceSummary {
    /// Placeholder entry for devices that are only known by name, e.g. from
    /// an environment hint rather than a live query.
    pub fn synthetic(name: impl Into<String>) -> Self {
        DeviceSummary {
            name: name.into(),
            vendor: String::new(),
            profile: String::new(),
            version: String::new(),
            kind: DeviceKind::Unspecified,
            max_compute_units: 0,
            max_work_item_dimensions: 0,
            max_work_item_sizes: Vec::new(),
            max_work_group_size: 0,
            global_mem_size: 0,
            local_mem_size: 0,
            max_constant_buffer_size: 0,
            max_mem_alloc_size: 0,
            image_support: false,
            extensions: Vec::new(),
        }
    }

    pub fn supports_extension(&self, token: &str) -> bool {
        self.extensions.iter().any(|entry| entry == token)
    }
}

#[cfg(feature = "opencl-real")]
pub use real::Device;

#[cfg(feature = "opencl-real")]
mod real {
    use std::fmt;
    use std::hash::{Hash, Hasher};
    use std::mem::MaybeUninit;
    use std::ptr;

    use tracing::warn;

    use oclkit_sys as sys;
    use sys::{cl_bool, cl_device_id, cl_device_info, cl_device_type, cl_uint, cl_ulong};

    use super::{contains_token, DeviceKind, DeviceSummary};
    use crate::error::{check, Error, Result};
    use crate::platform::Platform;
    use crate::status::Status;
    use crate::version::ClVersion;

    /// Owned handle to one OpenCL device.
    pub struct Device {
        raw: cl_device_id,
        type_bits: cl_device_type,
    }

    // Per the OpenCL execution model, device handles and their info queries
    // are callable from any thread; the only host-side state is the cached
    // type bitfield, which is immutable after construction.
    unsafe impl Send for Device {}
    unsafe impl Sync for Device {}

    impl Device {
        /// Take ownership of a raw device handle.
        ///
        /// Queries and caches the device type up front; a null handle skips
        /// the query and yields an inert device whose accessors all fail
        /// with [`Error::NullDevice`].
        ///
        /// # Safety
        ///
        /// `raw` must be null or a valid device ID, and the caller's
        /// reference to it is transferred: it is released on drop whenever
        /// the owning platform supports reference counting.
        pub unsafe fn from_raw(raw: cl_device_id) -> Result<Self> {
            let mut device = Device { raw, type_bits: 0 };
            if !raw.is_null() {
                device.type_bits =
                    device.info_scalar(sys::CL_DEVICE_TYPE, "clGetDeviceInfo(CL_DEVICE_TYPE)")?;
            }
            Ok(device)
        }

        pub fn as_raw(&self) -> cl_device_id {
            self.raw
        }

        pub fn is_null(&self) -> bool {
            self.raw.is_null()
        }

        /// Primary category from the cached type bits.
        pub fn kind(&self) -> DeviceKind {
            DeviceKind::from_bits(self.type_bits)
        }

        pub fn is_gpu(&self) -> bool {
            self.type_bits & sys::CL_DEVICE_TYPE_GPU != 0
        }

        pub fn is_cpu(&self) -> bool {
            self.type_bits & sys::CL_DEVICE_TYPE_CPU != 0
        }

        pub fn is_accelerator(&self) -> bool {
            self.type_bits & sys::CL_DEVICE_TYPE_ACCELERATOR != 0
        }

        pub fn name(&self) -> Result<String> {
            self.info_string(sys::CL_DEVICE_NAME, "clGetDeviceInfo(CL_DEVICE_NAME)")
        }

        pub fn vendor(&self) -> Result<String> {
            self.info_string(sys::CL_DEVICE_VENDOR, "clGetDeviceInfo(CL_DEVICE_VENDOR)")
        }

        pub fn profile(&self) -> Result<String> {
            self.info_string(sys::CL_DEVICE_PROFILE, "clGetDeviceInfo(CL_DEVICE_PROFILE)")
        }

        /// Raw version report, e.g. `"OpenCL 3.0 CUDA"`.
        pub fn version_report(&self) -> Result<String> {
            self.info_string(sys::CL_DEVICE_VERSION, "clGetDeviceInfo(CL_DEVICE_VERSION)")
        }

        /// Parsed `<major>.<minor>` from the version report.
        pub fn version(&self) -> Result<ClVersion> {
            ClVersion::parse_report(&self.version_report()?)
        }

        pub fn driver_version(&self) -> Result<String> {
            self.info_string(sys::CL_DRIVER_VERSION, "clGetDeviceInfo(CL_DRIVER_VERSION)")
        }

        /// Whether the device reports at least the given OpenCL version.
        /// A report that does not parse counts as version 0.0.
        pub fn supports_version(&self, major: u32, minor: u32) -> Result<bool> {
            Ok(ClVersion::report_at_least(
                &self.version_report()?,
                major,
                minor,
            ))
        }

        /// Raw space-delimited extension list as reported by the driver.
        pub fn extensions_string(&self) -> Result<String> {
            self.info_string(sys::CL_DEVICE_EXTENSIONS, "clGetDeviceInfo(CL_DEVICE_EXTENSIONS)")
        }

        pub fn extensions(&self) -> Result<Vec<String>> {
            let list = self.extensions_string()?;
            Ok(list.split_whitespace().map(str::to_owned).collect())
        }

        /// Exact-token test against the device's extension list.
        pub fn supports_extension(&self, token: &str) -> Result<bool> {
            Ok(contains_token(&self.extensions_string()?, token))
        }

        /// Whether the device supports the double data type (`cl_khr_fp64`).
        pub fn supports_double(&self) -> Result<bool> {
            self.supports_extension("cl_khr_fp64")
        }

        pub fn max_compute_units(&self) -> Result<u32> {
            self.info_scalar::<cl_uint>(
                sys::CL_DEVICE_MAX_COMPUTE_UNITS,
                "clGetDeviceInfo(CL_DEVICE_MAX_COMPUTE_UNITS)",
            )
        }

        /// Maximum configured clock frequency in MHz.
        pub fn max_clock_frequency(&self) -> Result<u32> {
            self.info_scalar::<cl_uint>(
                sys::CL_DEVICE_MAX_CLOCK_FREQUENCY,
                "clGetDeviceInfo(CL_DEVICE_MAX_CLOCK_FREQUENCY)",
            )
        }

        /// Address space size in bits, 32 or 64 on conforming devices.
        pub fn address_bits(&self) -> Result<u32> {
            self.info_scalar::<cl_uint>(
                sys::CL_DEVICE_ADDRESS_BITS,
                "clGetDeviceInfo(CL_DEVICE_ADDRESS_BITS)",
            )
        }

        pub fn max_work_item_dimensions(&self) -> Result<u32> {
            self.info_scalar::<cl_uint>(
                sys::CL_DEVICE_MAX_WORK_ITEM_DIMENSIONS,
                "clGetDeviceInfo(CL_DEVICE_MAX_WORK_ITEM_DIMENSIONS)",
            )
        }

        /// Maximum work-item counts, one entry per dimension.
        pub fn max_work_item_sizes(&self) -> Result<Vec<usize>> {
            let dims = self.max_work_item_dimensions()? as usize;
            let mut sizes = vec![0usize; dims];
            let status = unsafe {
                sys::clGetDeviceInfo(
                    self.raw,
                    sys::CL_DEVICE_MAX_WORK_ITEM_SIZES,
                    dims * std::mem::size_of::<usize>(),
                    sizes.as_mut_ptr().cast(),
                    ptr::null_mut(),
                )
            };
            check("clGetDeviceInfo(CL_DEVICE_MAX_WORK_ITEM_SIZES)", status)?;
            Ok(sizes)
        }

        pub fn max_work_group_size(&self) -> Result<usize> {
            self.info_scalar::<usize>(
                sys::CL_DEVICE_MAX_WORK_GROUP_SIZE,
                "clGetDeviceInfo(CL_DEVICE_MAX_WORK_GROUP_SIZE)",
            )
        }

        pub fn global_mem_size(&self) -> Result<u64> {
            self.info_scalar::<cl_ulong>(
                sys::CL_DEVICE_GLOBAL_MEM_SIZE,
                "clGetDeviceInfo(CL_DEVICE_GLOBAL_MEM_SIZE)",
            )
        }

        pub fn local_mem_size(&self) -> Result<u64> {
            self.info_scalar::<cl_ulong>(
                sys::CL_DEVICE_LOCAL_MEM_SIZE,
                "clGetDeviceInfo(CL_DEVICE_LOCAL_MEM_SIZE)",
            )
        }

        pub fn max_constant_buffer_size(&self) -> Result<u64> {
            self.info_scalar::<cl_ulong>(
                sys::CL_DEVICE_MAX_CONSTANT_BUFFER_SIZE,
                "clGetDeviceInfo(CL_DEVICE_MAX_CONSTANT_BUFFER_SIZE)",
            )
        }

        pub fn max_mem_alloc_size(&self) -> Result<u64> {
            self.info_scalar::<cl_ulong>(
                sys::CL_DEVICE_MAX_MEM_ALLOC_SIZE,
                "clGetDeviceInfo(CL_DEVICE_MAX_MEM_ALLOC_SIZE)",
            )
        }

        pub fn image_support(&self) -> Result<bool> {
            let flag = self.info_scalar::<cl_bool>(
                sys::CL_DEVICE_IMAGE_SUPPORT,
                "clGetDeviceInfo(CL_DEVICE_IMAGE_SUPPORT)",
            )?;
            Ok(flag != sys::CL_FALSE)
        }

        /// Whether the device is currently available for work.
        pub fn available(&self) -> Result<bool> {
            let flag = self.info_scalar::<cl_bool>(
                sys::CL_DEVICE_AVAILABLE,
                "clGetDeviceInfo(CL_DEVICE_AVAILABLE)",
            )?;
            Ok(flag != sys::CL_FALSE)
        }

        /// The platform this device belongs to. Fails explicitly when the
        /// runtime reports a null platform handle.
        pub fn platform(&self) -> Result<Platform> {
            let id = self.info_scalar::<sys::cl_platform_id>(
                sys::CL_DEVICE_PLATFORM,
                "clGetDeviceInfo(CL_DEVICE_PLATFORM)",
            )?;
            if id.is_null() {
                return Err(Error::NullPlatform);
            }
            // The runtime vouches for the handle it just reported.
            Ok(unsafe { Platform::from_raw(id) })
        }

        /// Full capability snapshot for serialization and reports.
        pub fn summary(&self) -> Result<DeviceSummary> {
            Ok(DeviceSummary {
                name: self.name()?,
                vendor: self.vendor()?,
                profile: self.profile()?,
                version: self.version_report()?,
                kind: self.kind(),
                max_compute_units: self.max_compute_units()?,
                max_work_item_dimensions: self.max_work_item_dimensions()?,
                max_work_item_sizes: self.max_work_item_sizes()?,
                max_work_group_size: self.max_work_group_size()?,
                global_mem_size: self.global_mem_size()?,
                local_mem_size: self.local_mem_size()?,
                max_constant_buffer_size: self.max_constant_buffer_size()?,
                max_mem_alloc_size: self.max_mem_alloc_size()?,
                image_support: self.image_support()?,
                extensions: self.extensions()?,
            })
        }

        /// Reference counting of device handles arrived in OpenCL 1.2, so
        /// retain/release only happen when the owning platform reports at
        /// least that; an unparseable report counts as 0.0 and disables
        /// the gate. A failed platform probe skips the count on both the
        /// clone and the drop side, keeping the two balanced.
        fn refcounting_enabled(&self) -> bool {
            if self.raw.is_null() {
                return false;
            }
            match self.platform().and_then(|platform| platform.version_report()) {
                Ok(report) => ClVersion::report_at_least(&report, 1, 2),
                Err(err) => {
                    warn!("skipping device retain/release, platform version unavailable: {err}");
                    false
                }
            }
        }

        fn info_string(&self, param: cl_device_info, call: &'static str) -> Result<String> {
            if self.raw.is_null() {
                return Err(Error::NullDevice);
            }
            let mut size = 0usize;
            let status =
                unsafe { sys::clGetDeviceInfo(self.raw, param, 0, ptr::null_mut(), &mut size) };
            check(call, status)?;
            if size == 0 {
                return Err(Error::EmptyInfo { call });
            }
            let mut buf = vec![0u8; size];
            let status = unsafe {
                sys::clGetDeviceInfo(self.raw, param, size, buf.as_mut_ptr().cast(), ptr::null_mut())
            };
            check(call, status)?;
            // The runtime includes the terminating NUL in the byte count.
            while buf.last() == Some(&0) {
                buf.pop();
            }
            Ok(String::from_utf8_lossy(&buf).into_owned())
        }

        fn info_scalar<T: Copy>(&self, param: cl_device_info, call: &'static str) -> Result<T> {
            if self.raw.is_null() {
                return Err(Error::NullDevice);
            }
            let mut value = MaybeUninit::<T>::uninit();
            let status = unsafe {
                sys::clGetDeviceInfo(
                    self.raw,
                    param,
                    std::mem::size_of::<T>(),
                    value.as_mut_ptr().cast(),
                    ptr::null_mut(),
                )
            };
            check(call, status)?;
            Ok(unsafe { value.assume_init() })
        }
    }

    impl Clone for Device {
        fn clone(&self) -> Self {
            if self.refcounting_enabled() {
                let status = unsafe { sys::clRetainDevice(self.raw) };
                if status != sys::CL_SUCCESS {
                    warn!("clRetainDevice failed: {}", Status(status));
                }
            }
            Device {
                raw: self.raw,
                type_bits: self.type_bits,
            }
        }
    }

    impl Drop for Device {
        fn drop(&mut self) {
            // Null handles are never released; failures are logged, not
            // propagated, because drop must not panic.
            if self.refcounting_enabled() {
                let status = unsafe { sys::clReleaseDevice(self.raw) };
                if status != sys::CL_SUCCESS {
                    warn!("clReleaseDevice failed: {}", Status(status));
                }
            }
        }
    }

    impl PartialEq for Device {
        fn eq(&self, other: &Self) -> bool {
            self.raw == other.raw
        }
    }

    impl Eq for Device {}

    impl PartialEq<cl_device_id> for Device {
        fn eq(&self, other: &cl_device_id) -> bool {
            self.raw == *other
        }
    }

    impl Hash for Device {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.raw.hash(state);
        }
    }

    impl fmt::Debug for Device {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Device")
                .field("raw", &self.raw)
                .field("kind", &self.kind())
                .finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_type_bits() {
        assert_eq!(DeviceKind::from_bits(sys::CL_DEVICE_TYPE_CPU), DeviceKind::Cpu);
        assert_eq!(DeviceKind::from_bits(sys::CL_DEVICE_TYPE_GPU), DeviceKind::Gpu);
        assert_eq!(
            DeviceKind::from_bits(sys::CL_DEVICE_TYPE_ACCELERATOR),
            DeviceKind::Accelerator
        );
        assert_eq!(
            DeviceKind::from_bits(sys::CL_DEVICE_TYPE_CUSTOM),
            DeviceKind::Custom
        );
        assert_eq!(DeviceKind::from_bits(0), DeviceKind::Unspecified);
    }

    #[test]
    fn default_bit_does_not_mask_the_category() {
        let bits = sys::CL_DEVICE_TYPE_DEFAULT | sys::CL_DEVICE_TYPE_GPU;
        assert_eq!(DeviceKind::from_bits(bits), DeviceKind::Gpu);
    }

    #[test]
    fn token_match_is_exact() {
        let list = "cl_khr_fp64 cl_khr_icd cl_khr_global_int32_base_atomics";
        assert!(contains_token(list, "cl_khr_fp64"));
        assert!(contains_token(list, "cl_khr_icd"));
        // Prefixes and substrings of real tokens must not match.
        assert!(!contains_token(list, "cl_khr_fp6"));
        assert!(!contains_token(list, "khr_fp64"));
        assert!(!contains_token(list, "cl_khr_fp64 cl_khr_icd"));
        assert!(!contains_token("", "cl_khr_fp64"));
    }

    #[test]
    fn summary_supports_extension_by_exact_token() {
        let mut summary = DeviceSummary::synthetic("test-device");
        summary.extensions = vec!["cl_khr_fp64".into(), "cl_khr_icd".into()];
        assert!(summary.supports_extension("cl_khr_fp64"));
        assert!(!summary.supports_extension("cl_khr_fp6"));
    }

    #[test]
    fn synthetic_summary_is_inert() {
        let summary = DeviceSummary::synthetic("opencl-device-0");
        assert_eq!(summary.name, "opencl-device-0");
        assert_eq!(summary.kind, DeviceKind::Unspecified);
        assert_eq!(summary.max_compute_units, 0);
        assert!(!summary.image_support);
        assert!(summary.extensions.is_empty());
    }

    #[test]
    fn summary_serializes_with_stable_field_names() {
        let summary = DeviceSummary::synthetic("json-device");
        let value = serde_json::to_value(&summary).unwrap();
        for key in [
            "name",
            "vendor",
            "profile",
            "version",
            "kind",
            "max_compute_units",
            "max_work_item_dimensions",
            "max_work_item_sizes",
            "max_work_group_size",
            "global_mem_size",
            "local_mem_size",
            "max_constant_buffer_size",
            "max_mem_alloc_size",
            "image_support",
            "extensions",
        ] {
            assert!(value.get(key).is_some(), "missing field {key}");
        }
        assert_eq!(value["kind"], "unspecified");
    }

    #[cfg(feature = "opencl-real")]
    mod null_handles {
        use std::ptr;

        use super::*;
        use crate::error::Error;

        #[test]
        fn null_device_is_inert() {
            let device = unsafe { Device::from_raw(ptr::null_mut()) }.unwrap();
            assert!(device.is_null());
            assert_eq!(device.kind(), DeviceKind::Unspecified);
            assert!(!device.is_gpu());
            assert!(matches!(device.name(), Err(Error::NullDevice)));
            assert!(matches!(
                device.max_work_item_sizes(),
                Err(Error::NullDevice)
            ));
            // Dropping it must not attempt a release.
        }

        #[test]
        fn device_compares_against_raw_handles() {
            let device = unsafe { Device::from_raw(ptr::null_mut()) }.unwrap();
            let null: sys::cl_device_id = ptr::null_mut();
            assert_eq!(device, null);

            // Cloning a null device performs no retain and stays equal.
            let copy = device.clone();
            assert_eq!(copy, device);
        }
    }
}
