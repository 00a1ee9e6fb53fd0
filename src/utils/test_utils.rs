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

use std::{
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Duration,
};

use crate::{CancelSignal, utils::OnDrop};

#[tracing::instrument(level = "DEBUG", name = "wait_for", skip(fun))]
pub(crate) fn _wait_for<F, K>(mut fun: F, expiry: Duration) -> anyhow::Result<K>
where
    F: FnMut() -> anyhow::Result<K>,
    K: std::fmt::Debug,
{
    let start = std::time::Instant::now();
    let mut count = 0;
    while start.elapsed() <= expiry {
        match fun() {
            Ok(ret) => {
                if count != 0 {
                    tracing::trace!(attemps = count, "Ok({ret:?})");
                }
                return Ok(ret);
            }
            Err(err) => {
                if count == 0 {
                    tracing::trace!(?err, "test failed, trying again in 10ms");
                }
                count += 1;
            }
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    fun().inspect_err(|err| tracing::trace!(?err, "test failed"))
}

/// Test macro to poll a condition until it validates
///
/// # Details
/// It'll return the last error on expiry.
///
/// Default timeout: 5 seconds.\
/// Polling interval: 10ms.
macro_rules! wait_for {
    ($cond:expr $(,)?) => { $crate::utils::test_utils::_wait_for(|| {
        anyhow::ensure!($cond);
        return Ok(());
    }, std::time::Duration::from_secs(5)) };
    ($cond:expr, $dur:expr $(,)?) => { $crate::utils::test_utils::_wait_for(|| {
        anyhow::ensure!($cond);
        return Ok(());
    }, $dur) };
    ($cond:expr, $msg:literal, $($arg:tt)* $(,)?) => { $crate::utils::test_utils::_wait_for(|| {
        anyhow::ensure!($cond, $msg, $($arg)*);
        return Ok(());
    }, std::time::Duration::from_secs(5)) };
}
pub(crate) use wait_for;

/// Owner fixture counting its loops
#[derive(Debug)]
pub(crate) struct Counter {
    pub count: AtomicUsize,
    /// operations currently running
    pub active: AtomicUsize,
    pub signal: CancelSignal,
    /// lets [Counter::ignore] return, abandoned threads must not outlive tests
    pub released: AtomicBool,
}

impl Counter {
    pub fn new(signal: CancelSignal) -> Self {
        Self {
            count: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            signal,
            released: AtomicBool::new(false),
        }
    }

    pub fn get(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Count until cancelled, polling every `period` (defaults to 1ms)
    pub fn work(&self, period: Option<&Duration>) -> i32 {
        let period = period.copied().unwrap_or(Duration::from_millis(1));
        loop {
            self.count.fetch_add(1, Ordering::AcqRel);
            if self.signal.wait(Some(period)) {
                return 0;
            }
        }
    }

    /// Count a fixed number of loops, honoring suspension only
    pub fn count_to(&self, limit: Option<&usize>) -> i32 {
        let limit = limit.copied().unwrap_or(10);
        while self.get() < limit {
            self.signal.checkpoint();
            self.count.fetch_add(1, Ordering::AcqRel);
            std::thread::sleep(Duration::from_millis(1));
        }
        limit as i32
    }

    /// Spin without ever looking at the signal, until released
    pub fn ignore(&self, period: Option<&Duration>) -> i32 {
        let period = period.copied().unwrap_or(Duration::from_millis(1));
        while !self.released.load(Ordering::Acquire) {
            self.count.fetch_add(1, Ordering::AcqRel);
            std::thread::sleep(period);
        }
        1
    }

    /// Deaf for `delay` (defaults to 200ms), then counts until cancelled
    pub fn late(&self, delay: Option<&Duration>) -> i32 {
        self.active.fetch_add(1, Ordering::AcqRel);
        let _active = OnDrop::new(|| {
            self.active.fetch_sub(1, Ordering::AcqRel);
        });
        std::thread::sleep(delay.copied().unwrap_or(Duration::from_millis(200)));
        while !self.signal.wait(Some(Duration::from_millis(5))) {
            self.count.fetch_add(1, Ordering::AcqRel);
        }
        2
    }

    pub fn release(&self) {
        self.released.store(true, Ordering::Release);
    }
}
