// SPDX-License-Identifier: AGPL-3.0-or-later

//! Plain-text capability reports.
//!
//! Renders platform and device snapshots as the classic indexed listing:
//!
//! ```text
//! Platform 0
//! Platform Profile    : FULL_PROFILE
//! ...
//! Devices :
//! Device 0
//! Device Profile    : FULL_PROFILE
//! ...
//! ```
//!
//! Rendering works from [`PlatformSummary`]/[`DeviceSummary`] values, so it
//! is available (and testable) without a live runtime; [`report_all`] wires
//! it to live enumeration when `opencl-real` is enabled.

use std::io::{self, Write};

use crate::device::DeviceSummary;
use crate::platform::PlatformSummary;

/// Which report sections to emit. Everything is on by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportOptions {
    pub devices: bool,
    pub profile: bool,
    pub version: bool,
    pub name: bool,
    pub vendor: bool,
    pub extensions: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            devices: true,
            profile: true,
            version: true,
            name: true,
            vendor: true,
            extensions: true,
        }
    }
}

pub fn render_platforms(
    out: &mut impl Write,
    platforms: &[PlatformSummary],
    options: &ReportOptions,
) -> io::Result<()> {
    for (index, platform) in platforms.iter().enumerate() {
        writeln!(out, "Platform {index}")?;
        render_platform(out, platform, options)?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn render_platform(
    out: &mut impl Write,
    platform: &PlatformSummary,
    options: &ReportOptions,
) -> io::Result<()> {
    if options.profile {
        writeln!(out, "Platform Profile    : {}", platform.profile)?;
    }
    if options.vendor {
        writeln!(out, "Platform Vendor     : {}", platform.vendor)?;
    }
    if options.name {
        writeln!(out, "Platform Name       : {}", platform.name)?;
    }
    if options.version {
        writeln!(out, "Platform Version    : {}", platform.version)?;
    }
    if options.extensions {
        writeln!(out, "Platform Extensions : {}", platform.extensions.join(" "))?;
    }
    if options.devices {
        writeln!(out, "Devices :")?;
        render_devices(out, &platform.devices, options)?;
    }
    Ok(())
}

pub fn render_devices(
    out: &mut impl Write,
    devices: &[DeviceSummary],
    options: &ReportOptions,
) -> io::Result<()> {
    for (index, device) in devices.iter().enumerate() {
        writeln!(out, "Device {index}")?;
        render_device(out, device, options)?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn render_device(
    out: &mut impl Write,
    device: &DeviceSummary,
    options: &ReportOptions,
) -> io::Result<()> {
    if options.profile {
        writeln!(out, "Device Profile    : {}", device.profile)?;
    }
    if options.vendor {
        writeln!(out, "Device Vendor     : {}", device.vendor)?;
    }
    if options.name {
        writeln!(out, "Device Name       : {}", device.name)?;
    }
    if options.version {
        writeln!(out, "Device Version    : {}", device.version)?;
    }
    if options.extensions {
        writeln!(out, "Device Extensions : {}", device.extensions.join(" "))?;
    }
    Ok(())
}

/// Enumerate every platform and render the full report.
#[cfg(feature = "opencl-real")]
pub fn report_all(out: &mut impl Write, options: &ReportOptions) -> crate::error::Result<()> {
    use crate::platform::Platform;

    let mut platforms = Vec::new();
    for platform in Platform::all()? {
        platforms.push(platform.summary()?);
    }
    render_platforms(out, &platforms, options)?;
    Ok(())
}
