// SPDX-License-Identifier: AGPL-3.0-or-later

//! Command timing from event profiling counters.

use std::mem::MaybeUninit;
use std::ptr;
use std::time::Duration;

use oclkit_sys as sys;
use sys::{cl_event, cl_profiling_info, cl_ulong};

use crate::error::{check, Error, Result};

/// Non-owning view of a runtime event, used to read profiling counters.
///
/// The view neither retains nor releases the event; the caller keeps the
/// handle alive for as long as the view is in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Event {
    raw: cl_event,
}

// Event info queries are callable from any thread.
unsafe impl Send for Event {}
unsafe impl Sync for Event {}

impl Event {
    /// Wrap a raw event handle.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a valid event handle that outlives this view.
    pub unsafe fn from_raw(raw: cl_event) -> Self {
        Event { raw }
    }

    pub fn as_raw(&self) -> cl_event {
        self.raw
    }

    /// Wall time between the command's start and end counters.
    ///
    /// The owning queue must have profiling enabled and the command must
    /// have completed; otherwise the runtime reports
    /// `CL_PROFILING_INFO_NOT_AVAILABLE`.
    pub fn execution_time(&self) -> Result<Duration> {
        let end = self.counter(
            sys::CL_PROFILING_COMMAND_END,
            "clGetEventProfilingInfo(CL_PROFILING_COMMAND_END)",
        )?;
        let start = self.counter(
            sys::CL_PROFILING_COMMAND_START,
            "clGetEventProfilingInfo(CL_PROFILING_COMMAND_START)",
        )?;
        Ok(Duration::from_nanos(end.saturating_sub(start)))
    }

    fn counter(&self, param: cl_profiling_info, call: &'static str) -> Result<cl_ulong> {
        if self.raw.is_null() {
            return Err(Error::NullEvent);
        }
        let mut value = MaybeUninit::<cl_ulong>::uninit();
        let status = unsafe {
            sys::clGetEventProfilingInfo(
                self.raw,
                param,
                std::mem::size_of::<cl_ulong>(),
                value.as_mut_ptr().cast(),
                ptr::null_mut(),
            )
        };
        check(call, status)?;
        Ok(unsafe { value.assume_init() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_event_is_rejected() {
        let event = unsafe { Event::from_raw(ptr::null_mut()) };
        assert!(matches!(event.execution_time(), Err(Error::NullEvent)));
    }
}
