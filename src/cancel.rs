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
** Created on: 2026-10-12T10:02:41
** Author: Sylvain Fargier <fargier.sylvain@gmail.com>
*/

use std::{
    cell::RefCell,
    fmt::Debug,
    sync::{Arc, Condvar, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use crate::utils::OnDrop;

#[derive(Debug)]
struct SignalState {
    /// current run
    generation: u64,
    /// last cancelled run, runs up to this one are cancelled
    cancelled: u64,
    suspended: bool,
}

impl Default for SignalState {
    fn default() -> Self {
        Self {
            generation: 1,
            cancelled: 0,
            suspended: false,
        }
    }
}

impl SignalState {
    fn is_cancelled(&self, generation: u64) -> bool {
        self.cancelled >= generation
    }
}

#[derive(Default)]
struct Inner {
    state: Mutex<SignalState>,
    cond: Condvar,
}

thread_local! {
    /// Signal and run of the worker executing on this thread
    static SCOPE: RefCell<Option<(CancelSignal, u64)>> = const { RefCell::new(None) };
}

/// Cooperative cancellation signal
///
/// Manual-reset binary signal shared between a [crate::ThreadHandle] and the
/// operation it runs. Cloning it yields another handle on the same signal.
///
/// Each [CancelSignal::reset] opens a new run. A worker thread observes the
/// run it was started for: once cancelled it stays cancelled, even after the
/// handle has been reset and started again.
///
/// The signal also carries the suspension gate: while suspended, a worker
/// calling [CancelSignal::wait] or [CancelSignal::checkpoint] is parked until
/// resumed or cancelled.
///
/// # Usage
/// ```rust
/// # use std::time::Duration;
/// # use worker_thread::CancelSignal;
/// let signal = CancelSignal::new();
/// let worker = {
///     let signal = signal.clone();
///     std::thread::spawn(move || {
///         let mut loops = 0;
///         while !signal.wait(Some(Duration::from_millis(5))) {
///             loops += 1;
///         }
///         loops
///     })
/// };
/// signal.set();
/// worker.join().unwrap();
/// ```
#[derive(Clone, Default)]
pub struct CancelSignal {
    inner: Arc<Inner>,
}

impl Debug for CancelSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("CancelSignal")
            .field("generation", &state.generation)
            .field("cancelled", &state.is_cancelled(state.generation))
            .field("suspended", &state.suspended)
            .finish()
    }
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal of the worker running on the calling thread
    ///
    /// Lets an operation reach its handle's signal without storing it in the
    /// owner. `None` outside of a worker thread.
    pub fn current() -> Option<CancelSignal> {
        SCOPE.with_borrow(|scope| scope.as_ref().map(|(signal, _)| signal.clone()))
    }

    fn lock(&self) -> MutexGuard<'_, SignalState> {
        self.inner.state.lock().unwrap()
    }

    /// Run observed by the calling thread
    ///
    /// A worker sees the run it was started for, any other thread the
    /// current one.
    fn observed(&self, state: &SignalState) -> u64 {
        SCOPE
            .with_borrow(|scope| match scope {
                Some((signal, generation)) if Arc::ptr_eq(&signal.inner, &self.inner) => {
                    Some(*generation)
                }
                _ => None,
            })
            .unwrap_or(state.generation)
    }

    /// Bind the calling thread to the given run until the guard drops
    pub(crate) fn enter(&self, generation: u64) -> OnDrop<impl FnOnce()> {
        let previous = SCOPE.replace(Some((self.clone(), generation)));
        OnDrop::new(move || {
            SCOPE.set(previous);
        })
    }

    pub(crate) fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Open a new run, returns its generation
    pub(crate) fn renew(&self) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        state.suspended = false;
        state.generation
    }

    /// Request cancellation
    ///
    /// Cancels the current run and every previous one. Also lifts any pending
    /// suspension so that a parked worker can observe the request.
    pub fn set(&self) {
        let mut state = self.lock();
        state.cancelled = state.generation;
        state.suspended = false;
        self.inner.cond.notify_all();
    }

    /// Clear both the cancellation request and the suspension
    ///
    /// Workers of previous runs are not affected, they remain cancelled.
    pub fn reset(&self) {
        self.renew();
    }

    /// Poll the signal without blocking nor honoring suspension
    pub fn is_set(&self) -> bool {
        let state = self.lock();
        state.is_cancelled(self.observed(&state))
    }

    /// Wait for a cancellation request
    ///
    /// Returns `true` when cancellation was requested, `false` once `timeout`
    /// elapsed (`None` waits forever). While suspended the call keeps blocking
    /// past `timeout` until resumed or cancelled.
    pub fn wait(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut state = self.lock();
        let generation = self.observed(&state);
        loop {
            if state.is_cancelled(generation) {
                return true;
            }
            // stale runs are never parked
            let parked = state.suspended && state.generation == generation;
            match deadline {
                Some(deadline) if !parked => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    state = self
                        .inner
                        .cond
                        .wait_timeout(state, deadline - now)
                        .unwrap()
                        .0;
                }
                _ => state = self.inner.cond.wait(state).unwrap(),
            }
        }
    }

    /// Cancellation point
    ///
    /// Parks while suspended, then returns whether cancellation was requested.
    pub fn checkpoint(&self) -> bool {
        self.wait(Some(Duration::ZERO))
    }

    pub(crate) fn suspend(&self) {
        let mut state = self.lock();
        if !state.is_cancelled(state.generation) {
            state.suspended = true;
        }
    }

    pub(crate) fn resume(&self) {
        let mut state = self.lock();
        state.suspended = false;
        self.inner.cond.notify_all();
    }

    pub fn is_suspended(&self) -> bool {
        self.lock().suspended
    }
}
