// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error type shared across the toolkit.

use thiserror::Error;

use oclkit_sys::cl_int;

use crate::status::Status;

#[derive(Debug, Error)]
pub enum Error {
    /// An OpenCL entry point returned something other than `CL_SUCCESS`.
    #[error("{call} failed: {status}")]
    Api { call: &'static str, status: Status },

    #[error("platform handle is null")]
    NullPlatform,

    #[error("device handle is null")]
    NullDevice,

    #[error("event handle is null")]
    NullEvent,

    #[error("no OpenCL platforms available")]
    NoPlatforms,

    /// The runtime reported a zero-length value for an info query that is
    /// specified to be non-empty.
    #[error("{call} reported an empty info value")]
    EmptyInfo { call: &'static str },

    #[error("malformed version report {text:?}")]
    VersionParse { text: String },

    #[error("OpenCL support not compiled in (enable the `opencl-real` feature)")]
    NotEnabled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Map a raw status code onto `Result`, tagging failures with the call name.
#[cfg_attr(not(feature = "opencl-real"), allow(dead_code))]
pub(crate) fn check(call: &'static str, code: cl_int) -> Result<()> {
    let status = Status(code);
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::Api { call, status })
    }
}
