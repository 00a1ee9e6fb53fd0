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
** Created on: 2026-10-12T11:48:10
** Author: Sylvain Fargier <fargier.sylvain@gmail.com>
*/

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    /// no thread, or the thread has exited
    Stopped,
    /// thread is running its operation
    Running,
    /// thread is alive but parked on its suspension gate
    Suspended,
}

/// Outcome of [crate::ThreadHandle::stop]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopStatus {
    /// there was no thread to stop
    NotRunning,
    /// thread has exited with the given code
    Exited(i32),
    /// thread did not exit in time, it was detached and left running
    Abandoned,
}

impl StopStatus {
    /// Thread has exited (or there was none)
    pub fn is_clean(&self) -> bool {
        !matches!(self, StopStatus::Abandoned)
    }
}
