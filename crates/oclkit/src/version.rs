// SPDX-License-Identifier: AGPL-3.0-or-later

//! Parsing and comparison of OpenCL version reports.
//!
//! Platforms and devices report their version as a free-form string whose
//! leading tokens follow `"OpenCL <major>.<minor>"` (devices append driver
//! specifics after that, e.g. `"OpenCL 3.0 CUDA"`). Capability gates only
//! ever need the numeric pair, so that is all we keep.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A `<major>.<minor>` OpenCL version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClVersion {
    pub major: u32,
    pub minor: u32,
}

impl ClVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Lexicographic comparison against a required minimum: either a newer
    /// major, or the same major with at least the required minor.
    pub fn at_least(self, major: u32, minor: u32) -> bool {
        self.major > major || (self.major == major && self.minor >= minor)
    }

    /// Parse a version report of the form `"<word> <major>.<minor>[ ...]"`.
    ///
    /// The leading word (`"OpenCL"` on conforming runtimes) is skipped
    /// rather than matched so vendor-prefixed reports still parse. Anything
    /// after the minor component is ignored.
    pub fn parse_report(text: &str) -> Result<Self> {
        let mut words = text.split_whitespace();
        let parsed = words
            .next()
            .and_then(|_word| words.next())
            .and_then(Self::parse_pair);
        parsed.ok_or_else(|| Error::VersionParse {
            text: text.to_owned(),
        })
    }

    fn parse_pair(pair: &str) -> Option<Self> {
        let mut parts = pair.split('.');
        let major = leading_number(parts.next()?)?;
        let minor = leading_number(parts.next()?)?;
        Some(Self { major, minor })
    }

    /// Gate a raw version report against a required minimum.
    ///
    /// A report that does not parse compares as version 0.0, the way
    /// `%i` scanning leaves its fields zeroed, so it only ever satisfies
    /// a 0.0 requirement. Both the `supports_version` queries and the
    /// device retain/release gate go through here; callers that need the
    /// parse failure surfaced use [`ClVersion::parse_report`] instead.
    pub fn report_at_least(report: &str, major: u32, minor: u32) -> bool {
        Self::parse_report(report)
            .unwrap_or(ClVersion::new(0, 0))
            .at_least(major, minor)
    }
}

impl fmt::Display for ClVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Numeric prefix of a token, mirroring how `%i` scanning stops at the
/// first non-digit. `"1"` and `"1,"` both yield 1; `"x1"` yields nothing.
fn leading_number(part: &str) -> Option<u32> {
    let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_platform_reports() {
        assert_eq!(
            ClVersion::parse_report("OpenCL 1.2").unwrap(),
            ClVersion::new(1, 2)
        );
        assert_eq!(
            ClVersion::parse_report("OpenCL 3.0").unwrap(),
            ClVersion::new(3, 0)
        );
    }

    #[test]
    fn parses_device_reports_with_driver_suffix() {
        assert_eq!(
            ClVersion::parse_report("OpenCL 3.0 CUDA").unwrap(),
            ClVersion::new(3, 0)
        );
        assert_eq!(
            ClVersion::parse_report("OpenCL 2.1 AMD-APP (3602.0)").unwrap(),
            ClVersion::new(2, 1)
        );
    }

    #[test]
    fn skips_the_leading_word_without_matching_it() {
        assert_eq!(
            ClVersion::parse_report("PoCL 1.8").unwrap(),
            ClVersion::new(1, 8)
        );
    }

    #[test]
    fn tolerates_patch_components() {
        assert_eq!(
            ClVersion::parse_report("OpenCL 1.2.3").unwrap(),
            ClVersion::new(1, 2)
        );
    }

    #[test]
    fn rejects_malformed_reports() {
        for text in ["", "OpenCL", "OpenCL x.y", "OpenCL 1", "1.2"] {
            let err = ClVersion::parse_report(text).unwrap_err();
            assert!(
                matches!(err, Error::VersionParse { .. }),
                "{text:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn at_least_is_lexicographic() {
        let v1_2 = ClVersion::new(1, 2);
        assert!(v1_2.at_least(1, 2));
        assert!(v1_2.at_least(1, 1));
        assert!(v1_2.at_least(0, 9));
        assert!(!v1_2.at_least(1, 3));
        assert!(!v1_2.at_least(2, 0));

        // Newer major wins regardless of minor.
        assert!(ClVersion::new(2, 0).at_least(1, 2));
        assert!(ClVersion::new(3, 0).at_least(2, 2));
    }

    #[test]
    fn report_gate_compares_parsed_reports() {
        assert!(ClVersion::report_at_least("OpenCL 1.2", 1, 2));
        assert!(ClVersion::report_at_least("OpenCL 3.0 CUDA", 1, 2));
        assert!(!ClVersion::report_at_least("OpenCL 1.1 Mesa", 1, 2));
        assert!(!ClVersion::report_at_least("OpenCL 1.2", 2, 0));
    }

    #[test]
    fn report_gate_treats_unparseable_reports_as_zero() {
        for report in ["", "OpenCL", "OpenCL x.y", "NVIDIA CUDA 11"] {
            // Version 0.0 disables every real gate, including the 1.2
            // threshold that retain/release hangs off.
            assert!(!ClVersion::report_at_least(report, 1, 2), "{report:?}");
            assert!(!ClVersion::report_at_least(report, 0, 1), "{report:?}");
            // ...but still satisfies the degenerate 0.0 requirement.
            assert!(ClVersion::report_at_least(report, 0, 0), "{report:?}");
        }
    }

    #[test]
    fn displays_as_major_dot_minor() {
        assert_eq!(ClVersion::new(1, 2).to_string(), "1.2");
    }
}
