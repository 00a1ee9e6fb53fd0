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
** Created on: 2026-10-12T11:27:55
** Author: Sylvain Fargier <fargier.sylvain@gmail.com>
*/

use serde::{Deserialize, Serialize};

/// Scheduling hint for a worker thread
///
/// Mapped on the per-thread nice value on Linux, raising above
/// [Priority::Normal] usually requires `CAP_SYS_NICE`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Idle,
    Lowest,
    BelowNormal,
    #[default]
    Normal,
    AboveNormal,
    Highest,
    TimeCritical,
}

impl Priority {
    /// Matching nice value (`-20..=19`, lower is more favorable)
    pub fn nice(&self) -> i32 {
        match self {
            Priority::Idle => 19,
            Priority::Lowest => 10,
            Priority::BelowNormal => 5,
            Priority::Normal => 0,
            Priority::AboveNormal => -5,
            Priority::Highest => -10,
            Priority::TimeCritical => -20,
        }
    }
}
