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
** Created on: 2025-12-22T15:46:40
** Author: Sylvain Fargier <fargier.sylvain@gmail.com>
*/

use anyhow::{Context, Result};
use clap::Parser;
use cmdline::{Action, Args};
use std::io::Write;
use worker_thread::{ThreadConfig, utils::tracing_utils::tracing_init};

pub mod cmdline;

fn main() -> Result<()> {
    tracing_init(std::io::stderr, Some("info"))?;

    let args = Args::parse();
    let config = match args.config_path() {
        Some(path) => ThreadConfig::load(&path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ThreadConfig::default(),
    };
    tracing::debug!(?config, "configuration");

    let (output, clean) = match args.action {
        Action::Run {
            duration,
            timeout,
            period,
            ignore_cancel,
        } => {
            let report = cmdline::runner::run(config, duration, timeout, period, ignore_cancel)?;
            (args.format.render(&report)?, report.status.is_clean())
        }
        Action::Soak {
            cycles,
            period,
            timeout,
        } => {
            let report = cmdline::runner::soak(config, cycles, period, timeout)?;
            (args.format.render(&report)?, report.abandoned == 0)
        }
    };
    std::io::stdout().write_all(output.as_bytes())?;

    if !clean {
        // abandoned workers die with the process
        std::process::exit(2);
    }
    Ok(())
}
