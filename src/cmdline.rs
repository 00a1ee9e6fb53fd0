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
** Created on: 2025-12-22T15:47:12
** Author: Sylvain Fargier <fargier.sylvain@gmail.com>
*/

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

pub mod runner;

/// Default configuration file, when `--config` is not given
pub const CONFIG_ENV: &str = "WORKER_THREAD_CONFIG";

#[derive(Serialize, Deserialize, Subcommand, Debug, Clone, PartialEq)]
pub enum Action {
    /// Start a counting worker, let it run then stop it
    Run {
        /// How long the worker runs before being stopped
        #[arg(long, default_value = "50ms", value_parser = humantime::parse_duration)]
        #[serde(with = "humantime_serde")]
        duration: Duration,
        /// Stop timeout, the worker is abandoned past it
        #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
        #[serde(with = "humantime_serde")]
        timeout: Duration,
        /// Worker polling period
        #[arg(long, default_value = "1ms", value_parser = humantime::parse_duration)]
        #[serde(with = "humantime_serde")]
        period: Duration,
        /// Make the worker ignore cancellation requests
        #[arg(long)]
        ignore_cancel: bool,
    },
    /// Repeated start/stop cycles (aliases: cycles)
    #[clap(alias = "cycles")]
    Soak {
        #[arg(long, default_value_t = 100)]
        cycles: usize,
        #[arg(long, default_value = "1ms", value_parser = humantime::parse_duration)]
        #[serde(with = "humantime_serde")]
        period: Duration,
        #[arg(long, default_value = "100ms", value_parser = humantime::parse_duration)]
        #[serde(with = "humantime_serde")]
        timeout: Duration,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq)]
pub enum Format {
    #[default]
    Yaml,
    Json,
}

impl Format {
    pub fn render<T>(&self, value: &T) -> Result<String>
    where
        T: Serialize,
    {
        Ok(match self {
            Format::Yaml => serde_yaml_ng::to_string(value)?,
            Format::Json => serde_json::to_string_pretty(value)? + "\n",
        })
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub action: Action,
    /// Worker thread configuration file (yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, value_enum, default_value_t = Format::Yaml)]
    pub format: Format,
}

impl Args {
    /// Configuration file from the command line, or from env
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(|| {
            std::env::var_os(CONFIG_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
    }
}
