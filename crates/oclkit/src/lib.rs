// SPDX-License-Identifier: AGPL-3.0-or-later

//! Safe OpenCL platform and device capability toolkit.
//!
//! `oclkit` answers one question well: *what OpenCL hardware does this
//! host offer?* It wraps platform and device handles, exposes their
//! capability reports as typed accessors and serializable snapshots, and
//! renders the classic indexed text listing.
//!
//! Two build flavours share one surface:
//!
//! * default: declarations only. Nothing links against `libOpenCL`, and
//!   [`probe`] answers availability questions from environment markers.
//! * `opencl-real`: the wrappers in [`platform`] and [`device`] talk to
//!   the live runtime through the ICD loader.
//!
//! Device handles participate in OpenCL reference counting on runtimes
//! that support it (1.2 and newer); see [`device`] for the exact rules.

pub mod device;
pub mod error;
pub mod platform;
pub mod probe;
#[cfg(feature = "opencl-real")]
pub mod profiling;
pub mod report;
pub mod status;
pub mod telemetry;
pub mod version;

#[cfg(feature = "opencl-real")]
pub use device::Device;
pub use device::{DeviceKind, DeviceSummary};
pub use error::{Error, Result};
#[cfg(feature = "opencl-real")]
pub use platform::Platform;
pub use platform::PlatformSummary;
#[cfg(feature = "opencl-real")]
pub use profiling::Event;
pub use report::ReportOptions;
pub use status::Status;
pub use version::ClVersion;
