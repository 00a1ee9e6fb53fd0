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
** Created on: 2026-10-14T15:40:12
** Author: Sylvain Fargier <fargier.sylvain@gmail.com>
*/

use std::{
    any::Any,
    panic::AssertUnwindSafe,
    sync::{
        Arc, Condvar, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    thread::{JoinHandle, ThreadId},
    time::Duration,
};

use super::binding::Binding;
use crate::{
    CancelSignal, Priority,
    error::Result,
    utils::{
        OnDrop,
        libc::{Tid, gettid, set_thread_priority},
    },
};

/// Exit code of a worker whose operation panicked
pub const EXIT_PANICKED: i32 = 101;

/// State shared between a handle and its worker threads
pub(crate) struct Shared<T, P> {
    pub running: AtomicBool,
    pub binding: Mutex<Option<Binding<T, P>>>,
    pub signal: CancelSignal,
}

impl<T, P> Default for Shared<T, P> {
    fn default() -> Self {
        Self {
            running: AtomicBool::new(false),
            binding: Mutex::new(None),
            signal: CancelSignal::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Native {
    tid: Option<Tid>,
    pending: Option<Priority>,
}

/// Per-start bookkeeping
///
/// Kept apart from [Shared] so that an abandoned thread can't alter the
/// state of the next one.
pub(crate) struct Run {
    generation: u64,
    native: Mutex<Native>,
    exited: Mutex<bool>,
    cond: Condvar,
}

impl Run {
    pub fn new(generation: u64, priority: Option<Priority>) -> Self {
        Self {
            generation,
            native: Mutex::new(Native {
                tid: None,
                pending: priority,
            }),
            exited: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Called from the worker, records its tid and applies queued priority
    fn attach(&self) {
        let mut native = self.native.lock().unwrap();
        let tid = gettid();
        native.tid = Some(tid);
        if let Some(priority) = native.pending.take() {
            if let Err(err) = set_thread_priority(tid, priority) {
                tracing::warn!(?err, ?priority, "failed to apply priority");
            }
        }
    }

    fn release(&self) {
        self.native.lock().unwrap().tid = None;
        *self.exited.lock().unwrap() = true;
        self.cond.notify_all();
    }

    /// Wait for the worker to exit, `None` waits forever
    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        let guard = self.exited.lock().unwrap();
        match timeout {
            Some(timeout) => {
                *self
                    .cond
                    .wait_timeout_while(guard, timeout, |exited| !*exited)
                    .unwrap()
                    .0
            }
            None => *self.cond.wait_while(guard, |exited| !*exited).unwrap(),
        }
    }

    pub fn set_priority(&self, priority: Priority) -> Result<()> {
        let mut native = self.native.lock().unwrap();
        match native.tid {
            Some(tid) => set_thread_priority(tid, priority),
            None => {
                tracing::trace!(?priority, "worker not attached yet, priority queued");
                native.pending = Some(priority);
                Ok(())
            }
        }
    }
}

/// A spawned native thread
pub(crate) struct Worker {
    join_handle: JoinHandle<i32>,
    run: Arc<Run>,
}

impl Worker {
    pub fn spawn<T, P>(
        builder: std::thread::Builder,
        shared: Arc<Shared<T, P>>,
        run: Arc<Run>,
    ) -> std::io::Result<Worker>
    where
        T: Send + Sync + 'static,
        P: Send + Sync + 'static,
    {
        let join_handle = {
            let run = Arc::clone(&run);
            builder.spawn(move || dispatch(&shared, &run))?
        };
        Ok(Worker { join_handle, run })
    }

    pub fn id(&self) -> ThreadId {
        self.join_handle.thread().id()
    }

    pub fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }

    pub fn run(&self) -> &Run {
        &self.run
    }

    /// Reap the thread, returns its exit code
    pub fn join(self) -> i32 {
        self.join_handle.join().unwrap_or_else(|err| {
            tracing::error!(error = panic_message(&*err), "worker thread panicked");
            EXIT_PANICKED
        })
    }

    /// Release the native handle, leaving the thread running
    pub fn detach(self) {
        tracing::trace!(id = ?self.id(), "detaching worker thread");
        drop(self.join_handle);
    }
}

fn panic_message(err: &(dyn Any + Send)) -> &str {
    err.downcast_ref::<&str>()
        .copied()
        .or_else(|| err.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Worker thread entry point
fn dispatch<T, P>(shared: &Shared<T, P>, run: &Run) -> i32 {
    let _exited = OnDrop::new(|| run.release());
    run.attach();

    // a newer start bumped the generation, this run is stale
    if !shared.running.load(Ordering::Acquire) || shared.signal.generation() != run.generation {
        tracing::debug!("stopped before dispatch");
        return 0;
    }

    let Some(binding) = shared.binding.lock().unwrap().clone() else {
        tracing::debug!("no task assigned");
        return 0;
    };

    let _scope = shared.signal.enter(run.generation);
    tracing::trace!("worker thread enter");
    match std::panic::catch_unwind(AssertUnwindSafe(|| binding.invoke())) {
        Ok(Some(code)) => {
            tracing::trace!(code, "worker thread exit");
            code
        }
        Ok(None) => {
            tracing::debug!("owner dropped before dispatch");
            0
        }
        Err(err) => {
            tracing::warn!(error = panic_message(&*err), "operation panicked");
            EXIT_PANICKED
        }
    }
}
