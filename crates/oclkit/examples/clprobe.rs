// SPDX-License-Identifier: AGPL-3.0-or-later

//! Print what the host offers: probe verdict, device summaries as JSON and,
//! with `--features opencl-real`, the live indexed report plus a few
//! capability gates.
//!
//! ```text
//! cargo run --example clprobe
//! cargo run --example clprobe --features opencl-real
//! ```

use oclkit::{probe, report, telemetry, ReportOptions};

fn main() {
    telemetry::init_tracing();

    println!("opencl available: {}", probe::opencl_available());

    let summaries = probe::device_summaries();
    match serde_json::to_string_pretty(&summaries) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("could not serialize summaries: {err}"),
    }

    let mut stdout = std::io::stdout();
    if let Err(err) = report::render_devices(&mut stdout, &summaries, &ReportOptions::default()) {
        eprintln!("render failed: {err}");
    }

    #[cfg(feature = "opencl-real")]
    live_report();
}

#[cfg(feature = "opencl-real")]
fn live_report() {
    use oclkit::Platform;

    if let Err(err) = report::report_all(&mut std::io::stdout(), &ReportOptions::default()) {
        eprintln!("live report failed: {err}");
        return;
    }

    let platforms = match Platform::all() {
        Ok(platforms) => platforms,
        Err(err) => {
            eprintln!("platform enumeration failed: {err}");
            return;
        }
    };

    for platform in platforms {
        let name = platform.name().unwrap_or_else(|_| "<unknown>".into());
        let modern = platform.supports_version(1, 2).unwrap_or(false);
        let icd = platform.supports_extension("cl_khr_icd").unwrap_or(false);
        println!("{name}: OpenCL 1.2+: {modern}, cl_khr_icd: {icd}");

        let devices = match platform.devices() {
            Ok(devices) => devices,
            Err(err) => {
                eprintln!("device enumeration failed: {err}");
                continue;
            }
        };
        for device in devices {
            let dev_name = device.name().unwrap_or_else(|_| "<unknown>".into());
            let version = device
                .version()
                .map(|v| v.to_string())
                .unwrap_or_else(|_| "?".into());
            let driver = device.driver_version().unwrap_or_else(|_| "?".into());
            let fp64 = device.supports_double().unwrap_or(false);
            println!(
                "  {dev_name}: version={version}, driver={driver}, kind={}, gpu={}, fp64={fp64}",
                device.kind().label(),
                device.is_gpu(),
            );
        }
    }
}
