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
** Created on: 2026-10-13T08:31:19
** Author: Sylvain Fargier <fargier.sylvain@gmail.com>
*/

use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

use crate::{Priority, error::Result, utils::serializers::human};

/// Platform default stack size
pub const DEFAULT_STACK_SIZE: u64 = 0;

/// Worker thread configuration, applied on [crate::ThreadHandle::start]
///
/// ```yaml
/// name: poller
/// stack_size: 512KiB
/// priority: below_normal
/// drop_timeout: 2s
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    /// Thread name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Stack size in bytes, `0` uses the platform default
    #[serde(with = "human::size")]
    pub stack_size: u64,
    /// Priority applied when the thread starts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// How long dropping a running handle waits for the worker
    #[serde(with = "human::duration")]
    pub drop_timeout: Duration,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            name: None,
            stack_size: DEFAULT_STACK_SIZE,
            priority: None,
            drop_timeout: Duration::from_secs(5),
        }
    }
}

impl ThreadConfig {
    /// Load a configuration from a yaml file
    #[tracing::instrument(level = "DEBUG")]
    pub fn load<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path> + std::fmt::Debug,
    {
        let file = std::fs::File::open(path.as_ref())?;
        Ok(serde_yaml_ng::from_reader(file)?)
    }

    /// Parse a yaml configuration
    pub fn from_yaml(data: &str) -> Result<Self> {
        Ok(serde_yaml_ng::from_str(data)?)
    }

    pub fn with_name<T>(mut self, name: T) -> Self
    where
        T: ToString,
    {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_stack_size(mut self, stack_size: u64) -> Self {
        self.stack_size = stack_size;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_drop_timeout(mut self, timeout: Duration) -> Self {
        self.drop_timeout = timeout;
        self
    }

    /// Build the native thread builder
    pub(crate) fn builder(&self) -> std::thread::Builder {
        let mut builder = std::thread::Builder::new();
        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        if self.stack_size != DEFAULT_STACK_SIZE {
            builder = builder.stack_size(self.stack_size as usize);
        }
        builder
    }
}
