/*
** Copyright (C) 2026 Sylvain Fargier
**
** This software is provided 'as-is', without any express or implied
** warranty.  In no event will the authors be held liable for any damages
** arising from the use of this software.
**
** Permission is granted to anyone to use this software for any purpose,
** including commercial applications, and to alter it and redistribute it
** freely, subject to the following restrictions:
**
** 1. The origin of this software must not be misrepresented; you must not
**    claim that you wrote the original software. If you use this software
**    in a product, an acknowledgment in the product documentation would be
**    appreciated but is not required.
** 2. Altered source versions must be plainly marked as such, and must not be
**    misrepresented as being the original software.
** 3. This notice may not be removed or altered from any source distribution.
**
** Created on: 2026-01-09T16:02:25
** Author: Sylvain Fargier <fargier.sylvain@gmail.com>
*/

use libc::c_int;

use crate::{Priority, error::Error};

/// Kernel thread id, as seen by the scheduler
pub type Tid = libc::pid_t;

/// Kernel thread id of the calling thread
#[cfg(target_os = "linux")]
pub fn gettid() -> Tid {
    unsafe { libc::syscall(libc::SYS_gettid) as Tid }
}

#[cfg(not(target_os = "linux"))]
pub fn gettid() -> Tid {
    0
}

/// Apply a scheduling priority on the given kernel thread
///
/// On Linux `setpriority(PRIO_PROCESS, tid)` targets a single thread.
#[cfg(target_os = "linux")]
pub fn set_thread_priority(tid: Tid, priority: Priority) -> Result<(), Error> {
    let nice = priority.nice();
    tracing::trace!(tid, nice, "setpriority");
    check(unsafe { libc::setpriority(libc::PRIO_PROCESS, tid as libc::id_t, nice) })
        .map_err(Error::Os)
}

#[cfg(not(target_os = "linux"))]
pub fn set_thread_priority(_tid: Tid, _priority: Priority) -> Result<(), Error> {
    Err(Error::Unsupported)
}

/// Current nice value of the given kernel thread
#[cfg(all(test, target_os = "linux"))]
pub fn thread_nice(tid: Tid) -> Result<i32, Error> {
    // -1 is a legitimate return value, errno tells errors apart
    unsafe { *libc::__errno_location() = 0 };
    let ret = unsafe { libc::getpriority(libc::PRIO_PROCESS, tid as libc::id_t) };
    let err = std::io::Error::last_os_error();
    match err.raw_os_error() {
        Some(0) | None => Ok(ret),
        Some(_) if ret != -1 => Ok(ret),
        Some(_) => Err(Error::Os(err)),
    }
}

/// assert for libc functions
pub fn check(res: c_int) -> std::io::Result<()> {
    if res != 0 {
        let err = std::io::Error::last_os_error();
        tracing::trace_span!("libc_check", ?err);
        Err(err)
    } else {
        Ok(())
    }
}
