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
** Created on: 2026-10-14T13:22:48
** Author: Sylvain Fargier <fargier.sylvain@gmail.com>
*/

use std::{
    sync::{Arc, Mutex, Weak, atomic::Ordering},
    thread::ThreadId,
    time::Duration,
};

use crate::{
    CancelSignal, Priority, State, StopStatus, ThreadConfig,
    error::{Error, Result},
};

mod binding;
pub use binding::Operation;
use binding::Binding;

mod worker;
pub use worker::EXIT_PANICKED;
use worker::{Run, Shared, Worker};

/// Single managed worker thread
///
/// Binds an owner's operation to a background thread. The operation is
/// expected to observe [ThreadHandle::cancel_signal] and return once it is
/// set.
///
/// # Usage
/// ```rust
/// # use std::{sync::Arc, time::Duration};
/// # use worker_thread::{CancelSignal, StopStatus, ThreadHandle};
/// struct Poller {
///     signal: CancelSignal,
/// }
///
/// impl Poller {
///     fn poll(&self, period: Option<&Duration>) -> i32 {
///         while !self.signal.wait(period.copied()) {
///             // do some work
///         }
///         0
///     }
/// }
///
/// let handle = ThreadHandle::<Poller, Duration>::new();
/// let poller = Arc::new(Poller { signal: handle.cancel_signal() });
/// handle
///     .assign_task(Arc::downgrade(&poller), Some(Poller::poll), Some(Arc::new(Duration::from_millis(10))))
///     .unwrap();
/// handle.start().unwrap();
/// assert_eq!(handle.stop(Some(Duration::from_secs(1))), StopStatus::Exited(0));
/// ```
pub struct ThreadHandle<T, P = ()>
where
    T: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    config: ThreadConfig,
    shared: Arc<Shared<T, P>>,
    worker: Mutex<Option<Worker>>,
    thread_id: Mutex<Option<ThreadId>>,
    exit_code: Mutex<Option<i32>>,
}

impl<T, P> Default for ThreadHandle<T, P>
where
    T: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::with_config(ThreadConfig::default())
    }
}

impl<T, P> std::fmt::Debug for ThreadHandle<T, P>
where
    T: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadHandle")
            .field("name", &self.config.name)
            .field("state", &self.state())
            .field("thread_id", &self.thread_id())
            .finish()
    }
}

impl<T, P> ThreadHandle<T, P>
where
    T: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    /// Create a stopped handle, without task
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ThreadConfig) -> Self {
        Self::with_signal(config, CancelSignal::new())
    }

    /// Create a stopped handle driving an existing signal
    ///
    /// Lets an owner built before its handle keep the signal its operation
    /// waits on.
    pub fn with_signal(config: ThreadConfig, signal: CancelSignal) -> Self {
        Self {
            config,
            shared: Arc::new(Shared {
                signal,
                ..Default::default()
            }),
            worker: Mutex::new(None),
            thread_id: Mutex::new(None),
            exit_code: Mutex::new(None),
        }
    }

    /// Create a stopped handle bound to the given task
    ///
    /// The operation reaches the handle's signal through
    /// [CancelSignal::current]. See [ThreadHandle::assign_task]
    pub fn with_task(
        owner: Weak<T>,
        operation: Option<Operation<T, P>>,
        parameter: Option<Arc<P>>,
    ) -> Result<Self> {
        let ret = Self::new();
        ret.assign_task(owner, operation, parameter)?;
        Ok(ret)
    }

    pub fn config(&self) -> &ThreadConfig {
        &self.config
    }

    /// Bind the task run by the next [ThreadHandle::start]
    ///
    /// Fails without altering the current binding when `owner` is gone or
    /// `operation` is missing. A thread already running keeps its own task.
    #[tracing::instrument(level = "DEBUG", skip_all, fields(name = self.config.name))]
    pub fn assign_task(
        &self,
        owner: Weak<T>,
        operation: Option<Operation<T, P>>,
        parameter: Option<Arc<P>>,
    ) -> Result<()> {
        let binding = Binding::new(owner, operation, parameter)
            .inspect_err(|err| tracing::debug!(%err, "task rejected"))?;
        *self.shared.binding.lock().unwrap() = Some(binding);
        Ok(())
    }

    /// Spawn the worker thread
    ///
    /// No-op when already running. A thread that exited on its own is reaped
    /// first.
    #[tracing::instrument(skip(self), fields(name = self.config.name))]
    pub fn start(&self) -> Result<()> {
        let mut guard = self.worker.lock().unwrap();
        if guard.as_ref().is_some_and(|w| !w.is_finished()) {
            tracing::trace!("already running");
            return Ok(());
        }
        if let Some(stale) = guard.take() {
            let code = stale.join();
            tracing::debug!(code, "reaped previous thread");
            *self.exit_code.lock().unwrap() = Some(code);
        }

        // workers of previous runs stay cancelled
        let generation = self.shared.signal.renew();
        let run = Arc::new(Run::new(generation, self.config.priority));
        // set before spawning, dispatch must observe it
        self.shared.running.store(true, Ordering::Release);

        match Worker::spawn(self.config.builder(), Arc::clone(&self.shared), run) {
            Ok(worker) => {
                tracing::debug!(id = ?worker.id(), "thread started");
                *self.thread_id.lock().unwrap() = Some(worker.id());
                *guard = Some(worker);
                Ok(())
            }
            Err(err) => {
                self.shared.running.store(false, Ordering::Release);
                tracing::error!(?err, "failed to spawn thread");
                Err(Error::Spawn(err))
            }
        }
    }

    /// Request cooperative termination and reap the thread
    ///
    /// Waits up to `timeout` (`None` waits forever) for the operation to
    /// return. A thread that does not exit in time can't be killed safely: it
    /// is detached, left running, and [StopStatus::Abandoned] is returned.
    /// Either way the handle is stopped and may be started again.
    #[tracing::instrument(skip(self), fields(name = self.config.name))]
    pub fn stop(&self, timeout: Option<Duration>) -> StopStatus {
        self.shared.running.store(false, Ordering::Release);
        let Some(worker) = self.worker.lock().unwrap().take() else {
            tracing::trace!("not running");
            return StopStatus::NotRunning;
        };

        // also lifts suspension
        self.shared.signal.set();
        if worker.id() == std::thread::current().id() {
            // dropped from its own operation, the thread can't wait on itself
            tracing::debug!("stopped from the worker thread, detached");
            worker.detach();
            return StopStatus::Abandoned;
        }
        if worker.run().wait(timeout) {
            let code = worker.join();
            tracing::debug!(code, "thread exited");
            *self.exit_code.lock().unwrap() = Some(code);
            StopStatus::Exited(code)
        } else {
            tracing::warn!(?timeout, id = ?worker.id(), "thread did not exit in time, abandoned");
            worker.detach();
            StopStatus::Abandoned
        }
    }

    /// Run the bound operation on the calling thread
    ///
    /// Returns the operation's result, `None` without task or once the owner
    /// is gone. Independent from the worker thread.
    #[tracing::instrument(level = "DEBUG", skip(self), fields(name = self.config.name))]
    pub fn execute(&self) -> Option<i32> {
        let binding = self.shared.binding.lock().unwrap().clone()?;
        binding.invoke()
    }

    /// Run `fun` on the live worker, [Error::NotRunning] otherwise
    fn with_live_worker<R, F>(&self, fun: F) -> Result<R>
    where
        F: FnOnce(&Worker) -> Result<R>,
    {
        match self.worker.lock().unwrap().as_ref() {
            Some(worker) if !worker.is_finished() => fun(worker),
            _ => Err(Error::NotRunning),
        }
    }

    /// Park the worker on its next cancellation checkpoint
    ///
    /// Does not affect the running state, [ThreadHandle::stop] lifts it.
    #[tracing::instrument(level = "DEBUG", skip(self), fields(name = self.config.name))]
    pub fn suspend(&self) -> Result<()> {
        self.with_live_worker(|_| {
            self.shared.signal.suspend();
            Ok(())
        })
    }

    #[tracing::instrument(level = "DEBUG", skip(self), fields(name = self.config.name))]
    pub fn resume(&self) -> Result<()> {
        self.with_live_worker(|_| {
            self.shared.signal.resume();
            Ok(())
        })
    }

    /// Scheduling hint for the live worker thread
    ///
    /// Queued until the worker has attached if it has just been started.
    #[tracing::instrument(level = "DEBUG", skip(self), fields(name = self.config.name))]
    pub fn set_priority(&self, priority: Priority) -> Result<()> {
        if !cfg!(target_os = "linux") {
            return Err(Error::Unsupported);
        }
        self.with_live_worker(|worker| worker.run().set_priority(priority))
    }

    /// Identifier of the most recently started thread
    pub fn thread_id(&self) -> Option<ThreadId> {
        *self.thread_id.lock().unwrap()
    }

    /// Exit code of the last reaped thread
    pub fn last_exit_code(&self) -> Option<i32> {
        *self.exit_code.lock().unwrap()
    }

    /// Signal to be observed by the operation
    pub fn cancel_signal(&self) -> CancelSignal {
        self.shared.signal.clone()
    }

    pub fn state(&self) -> State {
        match self.worker.lock().unwrap().as_ref() {
            Some(worker) if !worker.is_finished() => {
                if self.shared.signal.is_suspended() {
                    State::Suspended
                } else {
                    State::Running
                }
            }
            _ => State::Stopped,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() != State::Stopped
    }
}

impl<T, P> Drop for ThreadHandle<T, P>
where
    T: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    fn drop(&mut self) {
        let on_worker = self.thread_id() == Some(std::thread::current().id());
        if self.stop(Some(self.config.drop_timeout)) == StopStatus::Abandoned && !on_worker {
            tracing::error!(name = self.config.name, "worker thread leaked on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{Counter, wait_for};
    use anyhow::Result;
    use serial_test::serial;
    use std::time::Instant;

    fn counter<P>(handle: &ThreadHandle<Counter, P>) -> Arc<Counter>
    where
        P: Send + Sync + 'static,
    {
        Arc::new(Counter::new(handle.cancel_signal()))
    }

    #[test]
    fn counter_scenario() -> Result<()> {
        let handle = ThreadHandle::<Counter, Duration>::new();
        let owner = counter(&handle);
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::work), None)?;

        handle.start()?;
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(
            handle.stop(Some(Duration::from_secs(1))),
            StopStatus::Exited(0)
        );
        assert!(owner.get() > 0);
        assert_eq!(handle.state(), State::Stopped);
        assert!(!handle.is_running());
        assert_eq!(handle.last_exit_code(), Some(0));
        Ok(())
    }

    #[test]
    fn double_start() -> Result<()> {
        let handle = ThreadHandle::<Counter, Duration>::new();
        let owner = counter(&handle);
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::work), None)?;

        handle.start()?;
        let id = handle.thread_id();
        handle.start()?;
        assert!(id.is_some());
        assert_eq!(id, handle.thread_id());
        assert!(handle.is_running());

        assert!(matches!(
            handle.stop(Some(Duration::from_secs(1))),
            StopStatus::Exited(_)
        ));
        Ok(())
    }

    #[test]
    fn stop_never_started() {
        let handle = ThreadHandle::<Counter>::new();
        let start = Instant::now();
        assert_eq!(handle.stop(None), StopStatus::NotRunning);
        assert!(start.elapsed() < Duration::from_millis(100));
        assert_eq!(handle.state(), State::Stopped);
        assert_eq!(handle.thread_id(), None);
        assert_eq!(handle.last_exit_code(), None);
    }

    #[test]
    fn assign_invalid() -> Result<()> {
        let handle = ThreadHandle::<Counter, usize>::new();
        let owner = counter(&handle);
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::count_to), Some(Arc::new(5)))?;

        assert!(matches!(
            handle.assign_task(Arc::downgrade(&owner), None, None),
            Err(Error::InvalidTask(_))
        ));
        assert!(matches!(
            handle.assign_task(Weak::new(), Some(Counter::count_to), None),
            Err(Error::InvalidTask(_))
        ));

        // previous binding still in place
        handle.start()?;
        wait_for!(!handle.is_running())?;
        assert_eq!(handle.stop(None), StopStatus::Exited(5));
        assert_eq!(owner.get(), 5);
        Ok(())
    }

    #[test]
    fn no_task() -> Result<()> {
        let handle = ThreadHandle::<Counter>::new();
        handle.start()?;
        assert_eq!(handle.stop(Some(Duration::from_secs(1))), StopStatus::Exited(0));
        Ok(())
    }

    #[test]
    fn owner_dropped() -> Result<()> {
        let handle = ThreadHandle::<Counter, Duration>::new();
        let owner = counter(&handle);
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::work), None)?;
        drop(owner);

        handle.start()?;
        assert_eq!(handle.stop(Some(Duration::from_secs(1))), StopStatus::Exited(0));
        Ok(())
    }

    #[test]
    fn natural_exit_restart() -> Result<()> {
        let handle = ThreadHandle::<Counter, usize>::new();
        let owner = counter(&handle);
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::count_to), Some(Arc::new(3)))?;

        handle.start()?;
        wait_for!(handle.state() == State::Stopped)?;
        let first = handle.thread_id();

        // stale thread is reaped, a new one is spawned
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::count_to), Some(Arc::new(6)))?;
        handle.start()?;
        assert_eq!(handle.last_exit_code(), Some(3));
        assert_ne!(first, handle.thread_id());
        assert_eq!(handle.stop(None), StopStatus::Exited(6));
        assert_eq!(handle.last_exit_code(), Some(6));
        Ok(())
    }

    #[test]
    #[serial(timing)]
    fn cooperative_cycles() -> Result<()> {
        let handle = ThreadHandle::<Counter, Duration>::new();
        let owner = counter(&handle);
        let period = Duration::from_millis(2);
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::work), Some(Arc::new(period)))?;

        for cycle in 0..100 {
            handle.start()?;
            // any timeout above the polling period, with room for a loaded host
            assert_eq!(
                handle.stop(Some(period * 250)),
                StopStatus::Exited(0),
                "cycle {cycle}"
            );
            assert_eq!(handle.state(), State::Stopped);
        }
        Ok(())
    }

    #[test]
    #[serial(timing)]
    fn unresponsive() -> Result<()> {
        let handle = ThreadHandle::<Counter, Duration>::new();
        let owner = counter(&handle);
        let _release = crate::utils::OnDrop::new(|| owner.release());
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::ignore), None)?;

        handle.start()?;
        wait_for!(owner.get() > 0)?;

        let timeout = Duration::from_millis(200);
        let start = Instant::now();
        assert_eq!(handle.stop(Some(timeout)), StopStatus::Abandoned);
        let elapsed = start.elapsed();
        assert!(elapsed >= timeout, "{elapsed:?}");
        assert!(elapsed < timeout * 5, "{elapsed:?}");

        // no thread associated anymore
        assert_eq!(handle.state(), State::Stopped);
        assert!(matches!(handle.suspend(), Err(Error::NotRunning)));
        assert_eq!(handle.stop(None), StopStatus::NotRunning);
        Ok(())
    }

    #[test]
    fn suspend_resume() -> Result<()> {
        let handle = ThreadHandle::<Counter, usize>::new();
        let owner = counter(&handle);
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::count_to), Some(Arc::new(50)))?;

        assert!(matches!(handle.suspend(), Err(Error::NotRunning)));
        assert!(matches!(handle.resume(), Err(Error::NotRunning)));

        handle.start()?;
        handle.suspend()?;
        handle.resume()?;
        wait_for!(handle.state() == State::Stopped)?;
        assert_eq!(handle.stop(None), StopStatus::Exited(50));
        Ok(())
    }

    #[test]
    fn suspended_pauses() -> Result<()> {
        let handle = ThreadHandle::<Counter, usize>::new();
        let owner = counter(&handle);
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::count_to), Some(Arc::new(100_000)))?;

        handle.start()?;
        wait_for!(owner.get() > 0)?;
        handle.suspend()?;
        assert_eq!(handle.state(), State::Suspended);

        // at most one more loop after suspension
        std::thread::sleep(Duration::from_millis(20));
        let paused = owner.get();
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(paused, owner.get());

        handle.resume()?;
        wait_for!(owner.get() > paused)?;
        owner.count.store(100_000, std::sync::atomic::Ordering::Release);
        assert!(matches!(handle.stop(Some(Duration::from_secs(1))), StopStatus::Exited(_)));
        Ok(())
    }

    #[test]
    fn stop_while_suspended() -> Result<()> {
        let handle = ThreadHandle::<Counter, Duration>::new();
        let owner = counter(&handle);
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::work), None)?;

        handle.start()?;
        wait_for!(owner.get() > 0)?;
        handle.suspend()?;
        assert_eq!(handle.stop(Some(Duration::from_secs(1))), StopStatus::Exited(0));
        assert!(!handle.cancel_signal().is_suspended());
        Ok(())
    }

    #[test]
    fn stop_before_dispatch() -> Result<()> {
        // whatever the interleaving, stop must return and leave no thread
        let handle = ThreadHandle::<Counter, Duration>::new();
        let owner = counter(&handle);
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::work), None)?;
        for _ in 0..50 {
            handle.start()?;
            assert!(matches!(handle.stop(Some(Duration::from_secs(1))), StopStatus::Exited(0)));
        }
        Ok(())
    }

    #[test]
    fn priority() -> Result<()> {
        let handle = ThreadHandle::<Counter, Duration>::new();
        assert!(matches!(
            handle.set_priority(Priority::Idle),
            Err(Error::NotRunning) | Err(Error::Unsupported)
        ));

        let owner = counter(&handle);
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::work), None)?;
        handle.start()?;
        if cfg!(target_os = "linux") {
            handle.set_priority(Priority::Idle)?;
        } else {
            assert!(matches!(handle.set_priority(Priority::Idle), Err(Error::Unsupported)));
        }
        handle.stop(None);
        Ok(())
    }

    #[test]
    fn config() -> Result<()> {
        let handle = ThreadHandle::<Counter, ()>::with_config(
            ThreadConfig::default()
                .with_name("configured")
                .with_stack_size(128 * 1024)
                .with_priority(Priority::BelowNormal),
        );
        let owner = Arc::new(Counter::new(handle.cancel_signal()));

        fn name(_: &Counter, _: Option<&()>) -> i32 {
            (std::thread::current().name() == Some("configured")) as i32
        }
        handle.assign_task(Arc::downgrade(&owner), Some(name), None)?;
        handle.start()?;
        assert_eq!(handle.stop(None), StopStatus::Exited(1));
        Ok(())
    }

    #[test]
    fn drop_stops() -> Result<()> {
        let owner;
        {
            let handle = ThreadHandle::<Counter, Duration>::with_config(
                ThreadConfig::default().with_drop_timeout(Duration::from_secs(1)),
            );
            owner = counter(&handle);
            handle.assign_task(Arc::downgrade(&owner), Some(Counter::work), None)?;
            handle.start()?;
            wait_for!(owner.get() > 0)?;
        }
        assert!(owner.signal.is_set());
        Ok(())
    }

    #[test]
    fn panicking_operation() -> Result<()> {
        let handle = ThreadHandle::<Counter>::new();
        let owner = counter(&handle);

        fn boom(_: &Counter, _: Option<&()>) -> i32 {
            panic!("on purpose")
        }
        handle.assign_task(Arc::downgrade(&owner), Some(boom), None)?;
        handle.start()?;
        assert_eq!(handle.stop(None), StopStatus::Exited(EXIT_PANICKED));
        Ok(())
    }

    #[test]
    #[serial(timing)]
    fn restart_after_abandon() -> Result<()> {
        let handle = ThreadHandle::<Counter, Duration>::new();
        let owner = counter(&handle);
        let delay = Duration::from_millis(200);
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::late), Some(Arc::new(delay)))?;

        handle.start()?;
        wait_for!(owner.active() == 1)?;
        assert_eq!(handle.stop(Some(Duration::from_millis(50))), StopStatus::Abandoned);

        handle.start()?;
        std::thread::sleep(delay * 3);
        // the abandoned run saw its cancellation, only the new one remains
        assert_eq!(owner.active(), 1);
        assert_eq!(handle.state(), State::Running);

        assert_eq!(handle.stop(Some(Duration::from_secs(1))), StopStatus::Exited(2));
        wait_for!(owner.active() == 0)?;
        Ok(())
    }

    #[test]
    fn dropped_from_worker() -> Result<()> {
        use std::sync::{atomic::AtomicBool, mpsc};

        struct SelfOwned {
            handle: ThreadHandle<SelfOwned>,
            entered: AtomicBool,
            // dropped after the handle
            _done: mpsc::Sender<()>,
        }

        impl SelfOwned {
            fn nap(&self, _: Option<&()>) -> i32 {
                self.entered.store(true, std::sync::atomic::Ordering::Release);
                std::thread::sleep(Duration::from_millis(50));
                0
            }
        }

        let (done, dropped) = mpsc::channel();
        let owner = Arc::new(SelfOwned {
            handle: ThreadHandle::with_config(
                ThreadConfig::default().with_drop_timeout(Duration::from_secs(2)),
            ),
            entered: AtomicBool::new(false),
            _done: done,
        });
        owner.handle.assign_task(Arc::downgrade(&owner), Some(SelfOwned::nap), None)?;
        owner.handle.start()?;
        wait_for!(owner.entered.load(std::sync::atomic::Ordering::Acquire))?;

        // the worker now holds the last reference
        drop(owner);
        assert!(matches!(
            dropped.recv_timeout(Duration::from_secs(1)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        ));
        Ok(())
    }

    #[test]
    fn with_task_cooperative() -> Result<()> {
        use std::sync::atomic::AtomicUsize;

        fn poll(count: &AtomicUsize, _: Option<&()>) -> i32 {
            let Some(signal) = CancelSignal::current() else {
                return -1;
            };
            while !signal.wait(Some(Duration::from_millis(1))) {
                count.fetch_add(1, Ordering::AcqRel);
            }
            0
        }

        let owner = Arc::new(AtomicUsize::new(0));
        let handle = ThreadHandle::<AtomicUsize>::with_task(Arc::downgrade(&owner), Some(poll), None)?;
        handle.start()?;
        wait_for!(owner.load(Ordering::Acquire) > 0)?;
        assert_eq!(handle.stop(Some(Duration::from_secs(1))), StopStatus::Exited(0));

        // not a worker thread
        assert_eq!(handle.execute(), Some(-1));
        Ok(())
    }

    #[test]
    fn with_signal() -> Result<()> {
        let signal = CancelSignal::new();
        let owner = Arc::new(Counter::new(signal.clone()));
        let handle = ThreadHandle::<Counter, Duration>::with_signal(ThreadConfig::default(), signal);
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::work), None)?;

        handle.start()?;
        wait_for!(owner.get() > 0)?;
        assert_eq!(handle.stop(Some(Duration::from_secs(1))), StopStatus::Exited(0));
        Ok(())
    }

    #[test]
    fn execute() -> Result<()> {
        let handle = ThreadHandle::<Counter, usize>::new();
        assert_eq!(handle.execute(), None);

        let owner = counter(&handle);
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::count_to), Some(Arc::new(4)))?;
        assert_eq!(handle.execute(), Some(4));
        assert_eq!(owner.get(), 4);
        // no thread involved
        assert_eq!(handle.thread_id(), None);

        drop(owner);
        assert_eq!(handle.execute(), None);
        Ok(())
    }

    #[test]
    #[cfg(all(target_os = "linux", target_pointer_width = "64"))]
    fn spawn_failure() -> Result<()> {
        // beyond the user address space
        let handle = ThreadHandle::<Counter, Duration>::with_config(
            ThreadConfig::default().with_stack_size(1 << 50),
        );
        let owner = counter(&handle);
        handle.assign_task(Arc::downgrade(&owner), Some(Counter::work), None)?;

        assert!(matches!(handle.start(), Err(Error::Spawn(_))));
        assert_eq!(handle.state(), State::Stopped);
        assert_eq!(handle.thread_id(), None);
        assert_eq!(handle.stop(None), StopStatus::NotRunning);
        assert_eq!(owner.get(), 0);
        Ok(())
    }
}
