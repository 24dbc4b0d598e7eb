// SPDX-License-Identifier: AGPL-3.0-or-later

//! Runtime presence probing.
//!
//! Builds without the `opencl-real` feature cannot touch the driver, but
//! callers still want a cheap answer to "is OpenCL plausibly installed
//! here, and what devices should I plan for?". This module answers from
//! the environment: the ICD vendor registry, loader libraries on the
//! library search path, probe tools on `PATH`, and two override variables:
//!
//! * `OCLKIT_FORCE_OPENCL=1` forces availability on.
//! * `OCLKIT_VISIBLE_DEVICES=0,1,...` names the device slots to plan for.
//!
//! With `opencl-real` enabled the same entry points consult the live
//! runtime instead, with the override variables still honored so CI can
//! pin the outcome.

use std::env;
#[cfg(not(feature = "opencl-real"))]
use std::fs;
#[cfg(not(feature = "opencl-real"))]
use std::path::{Path, PathBuf};

use tracing::debug;
#[cfg(feature = "opencl-real")]
use tracing::warn;

use crate::device::DeviceSummary;
#[cfg(not(feature = "opencl-real"))]
use crate::error::Error;
use crate::error::Result;
#[cfg(feature = "opencl-real")]
use crate::platform::Platform;

const FORCE_ENV: &str = "OCLKIT_FORCE_OPENCL";
const VISIBLE_ENV: &str = "OCLKIT_VISIBLE_DEVICES";

/// Environment variables that relocate the ICD vendor registry.
#[cfg(not(feature = "opencl-real"))]
const REGISTRY_ENVS: [&str; 2] = ["OCL_ICD_VENDORS", "OPENCL_VENDOR_PATH"];
#[cfg(not(feature = "opencl-real"))]
const DEFAULT_REGISTRY: &str = "/etc/OpenCL/vendors";

#[cfg(not(feature = "opencl-real"))]
const LIBRARY_PATH_ENVS: [&str; 2] = ["LD_LIBRARY_PATH", "LIBRARY_PATH"];
#[cfg(not(feature = "opencl-real"))]
const LOADER_NAMES: [&str; 2] = ["libOpenCL.so", "libOpenCL.so.1"];

#[cfg(not(feature = "opencl-real"))]
const PROBE_TOOLS: [&str; 1] = ["clinfo"];

/// Whether an OpenCL runtime looks reachable from this process.
///
/// Declarations-only builds answer purely from environment markers; the
/// force variable short-circuits everything.
#[cfg(not(feature = "opencl-real"))]
pub fn opencl_available() -> bool {
    if force_enabled() {
        debug!("OpenCL availability forced on via {FORCE_ENV}");
        return true;
    }
    icd_registry_present() || loader_on_library_path() || probe_tool_on_path()
}

/// Whether an OpenCL runtime is actually reachable, as reported by the
/// ICD loader. The force variable still wins so CI can pin the outcome.
#[cfg(feature = "opencl-real")]
pub fn opencl_available() -> bool {
    if force_enabled() {
        debug!("OpenCL availability forced on via {FORCE_ENV}");
        return true;
    }
    Platform::all().is_ok()
}

/// Best-effort device list for hosts where enumeration may be impossible.
///
/// Hinted slots from `OCLKIT_VISIBLE_DEVICES` always win. Without hints, a
/// declarations-only build emits a single placeholder when the environment
/// markers say a runtime is installed, so downstream sizing logic stays
/// engaged; a real build enumerates and degrades to an empty list (with a
/// warning) if the loader errors out.
pub fn device_summaries() -> Vec<DeviceSummary> {
    let hinted = hinted_summaries();
    if !hinted.is_empty() {
        return hinted;
    }
    device_summaries_unhinted()
}

#[cfg(not(feature = "opencl-real"))]
fn device_summaries_unhinted() -> Vec<DeviceSummary> {
    if opencl_available() {
        vec![DeviceSummary::synthetic("opencl-probe")]
    } else {
        Vec::new()
    }
}

#[cfg(feature = "opencl-real")]
fn device_summaries_unhinted() -> Vec<DeviceSummary> {
    match enumerate() {
        Ok(found) => found,
        Err(err) => {
            warn!("OpenCL device enumeration failed: {err}");
            Vec::new()
        }
    }
}

/// Strict enumeration across every platform.
#[cfg(not(feature = "opencl-real"))]
pub fn enumerate() -> Result<Vec<DeviceSummary>> {
    Err(Error::NotEnabled)
}

/// Strict enumeration across every platform.
#[cfg(feature = "opencl-real")]
pub fn enumerate() -> Result<Vec<DeviceSummary>> {
    let mut summaries = Vec::new();
    for platform in Platform::all()? {
        for device in platform.devices()? {
            summaries.push(device.summary()?);
        }
    }
    Ok(summaries)
}

fn force_enabled() -> bool {
    env_flag(FORCE_ENV)
}

fn env_flag(name: &str) -> bool {
    match env::var(name) {
        Ok(value) => {
            let value = value.trim();
            value == "1" || value.eq_ignore_ascii_case("true")
        }
        Err(_) => false,
    }
}

#[cfg(not(feature = "opencl-real"))]
fn icd_registry_present() -> bool {
    for root in registry_roots() {
        if dir_has_icd(&root) {
            debug!("found ICD registry entries under {}", root.display());
            return true;
        }
    }
    false
}

#[cfg(not(feature = "opencl-real"))]
fn registry_roots() -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = REGISTRY_ENVS
        .iter()
        .filter_map(|name| env::var_os(name))
        .map(PathBuf::from)
        .collect();
    roots.push(PathBuf::from(DEFAULT_REGISTRY));
    roots
}

#[cfg(not(feature = "opencl-real"))]
fn dir_has_icd(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries
        .flatten()
        .any(|entry| entry.path().extension().is_some_and(|ext| ext == "icd"))
}

#[cfg(not(feature = "opencl-real"))]
fn loader_on_library_path() -> bool {
    for name in LIBRARY_PATH_ENVS {
        let Some(joined) = env::var_os(name) else {
            continue;
        };
        for dir in env::split_paths(&joined) {
            if LOADER_NAMES.iter().any(|lib| dir.join(lib).is_file()) {
                debug!("found OpenCL loader under {}", dir.display());
                return true;
            }
        }
    }
    false
}

#[cfg(not(feature = "opencl-real"))]
fn probe_tool_on_path() -> bool {
    let Some(joined) = env::var_os("PATH") else {
        return false;
    };
    for dir in env::split_paths(&joined) {
        if PROBE_TOOLS.iter().any(|tool| dir.join(tool).is_file()) {
            debug!("found OpenCL probe tool under {}", dir.display());
            return true;
        }
    }
    false
}

/// Placeholder summaries from `OCLKIT_VISIBLE_DEVICES`. Tokens that are
/// not numbers fall back to their list position as the slot.
fn hinted_summaries() -> Vec<DeviceSummary> {
    let Ok(raw) = env::var(VISIBLE_ENV) else {
        return Vec::new();
    };
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(position, token)| {
            let slot = token.parse::<u32>().unwrap_or(position as u32);
            DeviceSummary::synthetic(format!("opencl-device-{slot}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "opencl-real"))]
    use std::fs::File;
    use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
    use std::sync::Mutex;

    #[cfg(not(feature = "opencl-real"))]
    use tempfile::tempdir;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Run `test` with the given variables applied, restoring the previous
    /// values afterwards even if the closure panics.
    fn with_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], test: F) {
        let _guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let saved: Vec<(String, Option<String>)> = vars
            .iter()
            .map(|(name, _)| ((*name).to_owned(), env::var(name).ok()))
            .collect();
        for (name, value) in vars {
            match value {
                Some(value) => env::set_var(name, value),
                None => env::remove_var(name),
            }
        }
        let outcome = catch_unwind(AssertUnwindSafe(test));
        for (name, value) in saved {
            match value {
                Some(value) => env::set_var(&name, value),
                None => env::remove_var(&name),
            }
        }
        if let Err(panic) = outcome {
            resume_unwind(panic);
        }
    }

    #[test]
    fn force_flag_wins() {
        with_env(&[(FORCE_ENV, Some("1"))], || {
            assert!(opencl_available());
        });
        with_env(&[(FORCE_ENV, Some("true"))], || {
            assert!(opencl_available());
        });
    }

    #[test]
    fn force_flag_requires_a_truthy_value() {
        with_env(&[(FORCE_ENV, Some("0"))], || {
            assert!(!force_enabled());
        });
        with_env(&[(FORCE_ENV, None)], || {
            assert!(!force_enabled());
        });
    }

    #[cfg(not(feature = "opencl-real"))]
    #[test]
    fn icd_registry_detected_via_env_override() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("nvidia.icd")).unwrap();
        let root = dir.path().to_str().unwrap().to_owned();
        with_env(&[("OCL_ICD_VENDORS", Some(&root))], || {
            assert!(icd_registry_present());
        });
    }

    #[cfg(not(feature = "opencl-real"))]
    #[test]
    fn registry_scan_wants_icd_files() {
        let with_icd = tempdir().unwrap();
        File::create(with_icd.path().join("pocl.icd")).unwrap();
        assert!(dir_has_icd(with_icd.path()));

        let without = tempdir().unwrap();
        File::create(without.path().join("readme.txt")).unwrap();
        assert!(!dir_has_icd(without.path()));

        assert!(!dir_has_icd(Path::new("/does/not/exist")));
    }

    #[cfg(not(feature = "opencl-real"))]
    #[test]
    fn loader_detected_on_library_path() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("libOpenCL.so.1")).unwrap();
        let joined = dir.path().to_str().unwrap().to_owned();
        with_env(&[("LD_LIBRARY_PATH", Some(&joined))], || {
            assert!(loader_on_library_path());
        });
    }

    #[test]
    fn visible_devices_hints_parse_slots() {
        with_env(&[(VISIBLE_ENV, Some("0,2"))], || {
            let hinted = hinted_summaries();
            let names: Vec<&str> = hinted.iter().map(|d| d.name.as_str()).collect();
            assert_eq!(names, ["opencl-device-0", "opencl-device-2"]);
        });
    }

    #[test]
    fn visible_devices_tolerates_junk_tokens() {
        with_env(&[(VISIBLE_ENV, Some(" a, 3,,"))], || {
            let hinted = hinted_summaries();
            let names: Vec<&str> = hinted.iter().map(|d| d.name.as_str()).collect();
            // "a" falls back to its position, empty tokens are skipped.
            assert_eq!(names, ["opencl-device-0", "opencl-device-3"]);
        });

        with_env(&[(VISIBLE_ENV, None)], || {
            assert!(hinted_summaries().is_empty());
        });
    }

    #[test]
    fn hints_win_over_probing() {
        with_env(
            &[(FORCE_ENV, Some("1")), (VISIBLE_ENV, Some("5"))],
            || {
                let summaries = device_summaries();
                assert_eq!(summaries.len(), 1);
                assert_eq!(summaries[0].name, "opencl-device-5");
            },
        );
    }

    #[cfg(not(feature = "opencl-real"))]
    #[test]
    fn forced_probe_emits_a_placeholder_device() {
        with_env(
            &[(FORCE_ENV, Some("1")), (VISIBLE_ENV, None)],
            || {
                let summaries = device_summaries();
                assert_eq!(summaries.len(), 1);
                assert_eq!(summaries[0].name, "opencl-probe");
            },
        );
    }

    #[cfg(not(feature = "opencl-real"))]
    #[test]
    fn strict_enumeration_requires_the_runtime() {
        assert!(matches!(enumerate(), Err(Error::NotEnabled)));
    }
}
