/*
** Copyright (C) 2025 Sylvain Fargier
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
** Author: Sylvain Fargier <fargier.sylvain@gmail.com>
*/

/// Byte sizes as `512KiB`, `8MiB` or plain byte counts
pub mod size {
    use bytesize::ByteSize;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    /// Largest binary unit dividing `value`
    pub fn format(value: u64) -> String {
        if value == 0 {
            return String::from("0");
        }
        let mut unit = None;
        let mut scaled = value;
        for name in UNITS {
            if scaled & ((1 << 10) - 1) != 0 {
                break;
            }
            scaled >>= 10;
            unit = Some(name);
        }
        match unit {
            Some(unit) => format!("{scaled}{unit}"),
            None => format!("{value}B"),
        }
    }

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        format(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        ByteSize::deserialize(deserializer).map(|v| v.as_u64())
    }
}

pub mod duration {
    pub use humantime_serde::{deserialize, serialize};
}
