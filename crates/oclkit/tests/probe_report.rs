// SPDX-License-Identifier: AGPL-3.0-or-later

//! Smoke checks that hold on any host, with or without a runtime.

use oclkit::{probe, report, DeviceSummary, ReportOptions};

#[test]
fn probe_and_render_do_not_panic() {
    // Whatever the host offers, probing answers and the answer renders.
    let summaries = probe::device_summaries();
    let mut out = Vec::new();
    report::render_devices(&mut out, &summaries, &ReportOptions::default()).unwrap();
    assert!(!out.is_empty());
}

#[test]
fn summary_schema_survives_serialization() {
    let mut summary = DeviceSummary::synthetic("integration-device");
    summary.extensions = vec!["cl_khr_fp64".into(), "cl_khr_icd".into()];
    let json = serde_json::to_string(&summary).unwrap();
    let back: DeviceSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, summary);
    assert!(back.supports_extension("cl_khr_fp64"));
    assert!(!back.supports_extension("cl_khr_fp6"));
}

#[cfg(not(feature = "opencl-real"))]
#[test]
fn strict_enumeration_names_the_missing_feature() {
    let err = probe::enumerate().unwrap_err();
    assert!(err.to_string().contains("opencl-real"), "got: {err}");
}

#[cfg(feature = "opencl-real")]
mod live {
    use oclkit::{report, Platform, ReportOptions};

    #[test]
    fn report_renders_when_a_platform_exists() {
        if Platform::all().is_err() {
            eprintln!("no OpenCL platform installed, skipping");
            return;
        }
        let mut out = Vec::new();
        report::report_all(&mut out, &ReportOptions::default()).unwrap();
        assert!(out.starts_with(b"Platform 0"));
    }

    #[test]
    fn devices_answer_consistently() {
        let Ok(platforms) = Platform::all() else {
            eprintln!("no OpenCL platform installed, skipping");
            return;
        };
        for platform in platforms {
            // An enumerated platform must report itself as installed.
            assert!(platform.exists().unwrap());
            assert!(platform.supports_version(1, 0).unwrap());
            for device in platform.devices().unwrap() {
                // The owning platform must round-trip through the device.
                assert_eq!(device.platform().unwrap(), platform);

                let summary = device.summary().unwrap();
                assert!(!summary.name.is_empty());
                assert_eq!(
                    summary.max_work_item_sizes.len(),
                    summary.max_work_item_dimensions as usize
                );

                // Scalars outside the summary must answer too, whatever
                // their values.
                assert!(device.address_bits().unwrap() > 0);
                let _ = device.max_clock_frequency().unwrap();
                let _ = device.available().unwrap();

                // Clone/drop must stay balanced whatever the platform
                // version; if release misbehaved this would crash later.
                let copy = device.clone();
                assert_eq!(copy, device);
            }
        }
    }
}
