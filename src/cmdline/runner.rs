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
** Created on: 2026-10-15T18:12:40
** Author: Sylvain Fargier <fargier.sylvain@gmail.com>
*/

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use anyhow::Result;
use serde::Serialize;
use worker_thread::{CancelSignal, State, StopStatus, ThreadConfig, ThreadHandle};

/// Counting worker
#[derive(Debug)]
pub struct Ticker {
    signal: CancelSignal,
    ticks: AtomicU64,
    ignore_cancel: bool,
    released: AtomicBool,
}

impl Ticker {
    pub fn new(signal: CancelSignal, ignore_cancel: bool) -> Self {
        Self {
            signal,
            ticks: AtomicU64::new(0),
            ignore_cancel,
            released: AtomicBool::new(false),
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Let an unresponsive ticker return
    pub fn release(&self) {
        self.released.store(true, Ordering::Relaxed);
    }

    pub fn tick(&self, period: Option<&Duration>) -> i32 {
        let period = period.copied().unwrap_or(Duration::from_millis(1));
        loop {
            self.ticks.fetch_add(1, Ordering::Relaxed);
            if self.ignore_cancel {
                if self.released.load(Ordering::Relaxed) {
                    return 1;
                }
                std::thread::sleep(period);
            } else if self.signal.wait(Some(period)) {
                return 0;
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub ticks: u64,
    pub status: StopStatus,
    /// time spent in `stop`
    #[serde(with = "humantime_serde")]
    pub stop_time: Duration,
    pub state: State,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

#[tracing::instrument(skip(config))]
pub fn run(
    config: ThreadConfig,
    duration: Duration,
    timeout: Duration,
    period: Duration,
    ignore_cancel: bool,
) -> Result<RunReport> {
    let handle = ThreadHandle::<Ticker, Duration>::with_config(config);
    let ticker = Arc::new(Ticker::new(handle.cancel_signal(), ignore_cancel));
    handle.assign_task(
        Arc::downgrade(&ticker),
        Some(Ticker::tick),
        Some(Arc::new(period)),
    )?;

    handle.start()?;
    tracing::info!(id = ?handle.thread_id(), "worker started");
    std::thread::sleep(duration);

    let start = Instant::now();
    let status = handle.stop(Some(timeout));
    let stop_time = start.elapsed();
    ticker.release();

    Ok(RunReport {
        ticks: ticker.ticks(),
        status,
        stop_time,
        state: handle.state(),
        exit_code: handle.last_exit_code(),
    })
}

#[derive(Debug, Default, Serialize)]
pub struct SoakReport {
    pub cycles: usize,
    pub exited: usize,
    pub abandoned: usize,
    pub ticks: u64,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
}

#[tracing::instrument(skip(config))]
pub fn soak(
    config: ThreadConfig,
    cycles: usize,
    period: Duration,
    timeout: Duration,
) -> Result<SoakReport> {
    let handle = ThreadHandle::<Ticker, Duration>::with_config(config);
    let ticker = Arc::new(Ticker::new(handle.cancel_signal(), false));
    handle.assign_task(
        Arc::downgrade(&ticker),
        Some(Ticker::tick),
        Some(Arc::new(period)),
    )?;

    let start = Instant::now();
    let mut report = SoakReport {
        cycles,
        ..Default::default()
    };
    for cycle in 0..cycles {
        handle.start()?;
        match handle.stop(Some(timeout)) {
            StopStatus::Abandoned => {
                tracing::warn!(cycle, "worker abandoned");
                report.abandoned += 1;
            }
            _ => report.exited += 1,
        }
    }
    report.elapsed = start.elapsed();
    report.ticks = ticker.ticks();
    Ok(report)
}
