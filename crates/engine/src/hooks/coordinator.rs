//! Completion coordination for after-hooks
//!
//! An action's effects may finish synchronously, on one or more worker
//! threads, or never (when the action is cancelled). The
//! [`CompletionCoordinator`] tracks the single active [`Execution`] and decides
//! when its after-commands run:
//!
//! - [`start`](CompletionCoordinator::start) installs an execution (overwriting
//!   whatever was tracked before)
//! - [`register_completion`](CompletionCoordinator::register_completion) hands a
//!   [`CompletionToken`] to each piece of deferred work
//! - [`finalize`](CompletionCoordinator::finalize) resolves immediately when no
//!   deferred work was registered
//! - [`abort`](CompletionCoordinator::abort) discards the execution
//!
//! Each execution is resolved exactly once: its after-commands run, or it is
//! discarded. The lock only guards bookkeeping; after-commands always run once
//! the guard has been released.

use super::manager::Execution;
use actionhooks_core::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

#[derive(Debug, Default)]
struct CoordinatorState {
    /// Execution awaiting resolution; `None` once resolved (idle)
    active: Option<Execution>,
    /// Identity of the most recently started execution
    generation: u64,
    /// Outstanding completion tokens for `active`
    pending: usize,
}

fn lock(state: &Mutex<CoordinatorState>) -> MutexGuard<'_, CoordinatorState> {
    // The state is plain bookkeeping, so a panic elsewhere cannot leave it torn
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Decides when the active execution's after-commands run
///
/// One coordinator per application session. Clones share state, so a clone can
/// be moved into worker threads.
#[derive(Debug, Clone, Default)]
pub struct CompletionCoordinator {
    state: Arc<Mutex<CoordinatorState>>,
}

impl CompletionCoordinator {
    /// Create an idle coordinator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `execution`, or go idle when it is `None`
    ///
    /// Unconditionally replaces the previous state. A previous execution that
    /// was still pending is dropped without running its after-commands, and
    /// its outstanding tokens become no-ops.
    pub fn start(&self, execution: Option<Execution>) {
        let mut state = lock(&self.state);

        if let Some(previous) = state.active.as_ref() {
            tracing::warn!(
                context = previous.context(),
                key = previous.key(),
                pending = state.pending,
                "Replacing unresolved action hook execution; its after hooks will not run"
            );
        }

        state.generation += 1;
        state.pending = 0;
        state.active = execution;

        if let Some(execution) = state.active.as_ref() {
            tracing::debug!(
                generation = state.generation,
                context = execution.context(),
                key = execution.key(),
                "Tracking action hook execution"
            );
        }
    }

    /// Register a piece of deferred work that must finish before the after-commands run
    ///
    /// Returns `None` when no execution is active; there is nothing to report back.
    #[must_use]
    pub fn register_completion(&self) -> Option<CompletionToken> {
        let mut state = lock(&self.state);
        state.active.as_ref()?;

        state.pending += 1;
        tracing::trace!(
            generation = state.generation,
            pending = state.pending,
            "Registered completion"
        );

        Some(CompletionToken {
            state: Arc::clone(&self.state),
            generation: state.generation,
            used: AtomicBool::new(false),
        })
    }

    /// Resolve the execution when no deferred work was registered
    ///
    /// No-op when idle, or while tokens are outstanding (the last token to
    /// report resolves the execution instead).
    pub fn finalize(&self) -> Result<()> {
        let execution = {
            let mut state = lock(&self.state);
            if state.pending > 0 {
                tracing::trace!(pending = state.pending, "Finalize deferred to completions");
                return Ok(());
            }
            state.active.take()
        };

        match execution {
            Some(execution) => execution.execute_after(),
            None => Ok(()),
        }
    }

    /// Discard the active execution without running its after-commands
    pub fn abort(&self) {
        let mut state = lock(&self.state);
        if state.active.take().is_some() {
            tracing::debug!(
                generation = state.generation,
                pending = state.pending,
                "Action hook execution aborted"
            );
        }
        state.pending = 0;
    }

    /// Whether an execution is awaiting resolution
    #[must_use]
    pub fn is_active(&self) -> bool {
        lock(&self.state).active.is_some()
    }

    /// Number of outstanding completion tokens for the active execution
    #[must_use]
    pub fn pending(&self) -> usize {
        lock(&self.state).pending
    }

    /// Run `operation` as deferred work of the active execution
    ///
    /// The operation's own error wins; otherwise an error from the after-commands
    /// (if this was the last outstanding work) is returned.
    pub fn track<T, E, F>(&self, operation: F) -> std::result::Result<T, E>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: From<Error>,
    {
        let token = self.register_completion();
        let result = operation();
        report(token, result)
    }

    /// Like [`track`](Self::track), but runs `operation` on a new thread
    ///
    /// The completion is registered before the thread starts, so a following
    /// [`finalize`](Self::finalize) leaves resolution to the worker. To start
    /// several workers for one execution, use
    /// [`track_spawn_all`](Self::track_spawn_all): calling this in a loop lets an
    /// early finisher resolve the execution before later siblings register.
    pub fn track_spawn<T, E, F>(&self, operation: F) -> JoinHandle<std::result::Result<T, E>>
    where
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<Error> + Send + 'static,
    {
        let token = self.register_completion();
        std::thread::spawn(move || report(token, operation()))
    }

    /// Run every operation on its own thread as deferred work of the active execution
    ///
    /// All completions are registered before the first thread starts, so the
    /// after-commands run only once every operation has reported. Handles are
    /// returned in input order.
    pub fn track_spawn_all<T, E, F, I>(
        &self,
        operations: I,
    ) -> Vec<JoinHandle<std::result::Result<T, E>>>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<Error> + Send + 'static,
    {
        let operations: Vec<F> = operations.into_iter().collect();
        let tokens: Vec<_> = operations
            .iter()
            .map(|_| self.register_completion())
            .collect();

        operations
            .into_iter()
            .zip(tokens)
            .map(|(operation, token)| std::thread::spawn(move || report(token, operation())))
            .collect()
    }
}

/// Report `result` through `token` and hand it back
///
/// A failed operation keeps its own error; a completion error from a failed
/// operation is dropped since failure never runs after-commands.
fn report<T, E>(
    token: Option<CompletionToken>,
    result: std::result::Result<T, E>,
) -> std::result::Result<T, E>
where
    E: From<Error>,
{
    if let Some(token) = token {
        match &result {
            Ok(_) => token.complete(true)?,
            Err(_) => {
                let _ = token.complete(false);
            }
        }
    }
    result
}

/// Handle for one piece of deferred work, returned by
/// [`CompletionCoordinator::register_completion`]
///
/// Bound to the execution that was active at registration. Only the first
/// [`complete`](Self::complete) call has any effect.
#[derive(Debug)]
pub struct CompletionToken {
    state: Arc<Mutex<CoordinatorState>>,
    generation: u64,
    used: AtomicBool,
}

impl CompletionToken {
    /// Report that the work finished, successfully or not
    ///
    /// When this is the last outstanding work and `success` is true, the
    /// after-commands run on the calling thread and their error is returned.
    /// When it is the last and `success` is false, the execution is discarded.
    /// Tokens for a replaced or aborted execution do nothing.
    pub fn complete(&self, success: bool) -> Result<()> {
        if self.used.swap(true, Ordering::AcqRel) {
            tracing::trace!(generation = self.generation, "Completion already reported");
            return Ok(());
        }

        let execution = {
            let mut state = lock(&self.state);
            if state.generation != self.generation || state.active.is_none() {
                tracing::trace!(generation = self.generation, "Stale completion ignored");
                return Ok(());
            }

            state.pending = state.pending.saturating_sub(1);
            if state.pending > 0 {
                tracing::trace!(pending = state.pending, success, "Completion reported");
                return Ok(());
            }

            let execution = state.active.take();
            if !success {
                tracing::debug!(
                    generation = self.generation,
                    "Last completion failed; discarding after hooks"
                );
                return Ok(());
            }
            execution
        };

        match execution {
            Some(execution) => execution.execute_after(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::hooks::testing::{hook, manager_with};
    use std::sync::atomic::AtomicUsize;

    fn started() -> (CompletionCoordinator, std::sync::Arc<crate::hooks::testing::RecordingRunner>) {
        let (manager, runner) =
            manager_with(vec![hook("files", "c", "echo before", "echo after")]);
        let coordinator = CompletionCoordinator::new();
        coordinator.start(manager.execute_before("files", "c").unwrap());
        (coordinator, runner)
    }

    #[test]
    fn test_immediate_completion() {
        let (coordinator, runner) = started();
        assert!(coordinator.is_active());

        coordinator.finalize().unwrap();
        assert_eq!(runner.count_containing("echo after"), 1);
        assert!(!coordinator.is_active());

        // Already resolved
        coordinator.finalize().unwrap();
        assert_eq!(runner.count_containing("echo after"), 1);
    }

    #[test]
    fn test_deferred_completion() {
        let (coordinator, runner) = started();

        let token = coordinator.register_completion().unwrap();
        coordinator.finalize().unwrap();
        assert_eq!(runner.count_containing("echo after"), 0);
        assert_eq!(coordinator.pending(), 1);

        token.complete(true).unwrap();
        assert_eq!(runner.count_containing("echo after"), 1);

        token.complete(true).unwrap();
        assert_eq!(runner.count_containing("echo after"), 1);
    }

    #[test]
    fn test_multiple_deferred_completions() {
        let (coordinator, runner) = started();

        let first = coordinator.register_completion().unwrap();
        let second = coordinator.register_completion().unwrap();
        coordinator.finalize().unwrap();

        first.complete(true).unwrap();
        assert_eq!(runner.count_containing("echo after"), 0);

        second.complete(true).unwrap();
        assert_eq!(runner.count_containing("echo after"), 1);
    }

    #[test]
    fn test_token_is_idempotent() {
        let (coordinator, runner) = started();

        let first = coordinator.register_completion().unwrap();
        let _second = coordinator.register_completion().unwrap();

        first.complete(true).unwrap();
        first.complete(true).unwrap();
        assert_eq!(coordinator.pending(), 1);
        assert_eq!(runner.count_containing("echo after"), 0);
    }

    #[test]
    fn test_abort_skips_after() {
        let (coordinator, runner) = started();

        let token = coordinator.register_completion().unwrap();
        coordinator.abort();
        assert!(!coordinator.is_active());
        assert_eq!(coordinator.pending(), 0);

        token.complete(true).unwrap();
        assert_eq!(runner.count_containing("echo before"), 1);
        assert_eq!(runner.count_containing("echo after"), 0);
    }

    #[test]
    fn test_abort_with_failed_completion_skips_after() {
        let (coordinator, runner) = started();

        let token = coordinator.register_completion().unwrap();
        coordinator.abort();
        token.complete(false).unwrap();
        assert_eq!(runner.count_containing("echo after"), 0);
    }

    #[test]
    fn test_last_failed_completion_discards() {
        let (coordinator, runner) = started();

        let token = coordinator.register_completion().unwrap();
        token.complete(false).unwrap();

        assert!(!coordinator.is_active());
        coordinator.finalize().unwrap();
        assert_eq!(runner.count_containing("echo after"), 0);
    }

    #[test]
    fn test_failure_then_success_still_fires() {
        let (coordinator, runner) = started();

        let failed = coordinator.register_completion().unwrap();
        let succeeded = coordinator.register_completion().unwrap();

        failed.complete(false).unwrap();
        assert!(coordinator.is_active());

        succeeded.complete(true).unwrap();
        assert_eq!(runner.count_containing("echo after"), 1);
    }

    #[test]
    fn test_success_then_failure_discards() {
        let (coordinator, runner) = started();

        let succeeded = coordinator.register_completion().unwrap();
        let failed = coordinator.register_completion().unwrap();

        succeeded.complete(true).unwrap();
        failed.complete(false).unwrap();
        assert!(!coordinator.is_active());
        assert_eq!(runner.count_containing("echo after"), 0);
    }

    #[test]
    fn test_register_when_idle_returns_none() {
        let coordinator = CompletionCoordinator::new();
        assert!(coordinator.register_completion().is_none());

        coordinator.start(None);
        assert!(coordinator.register_completion().is_none());
        coordinator.finalize().unwrap();
    }

    #[test]
    fn test_start_replaces_pending_execution() {
        let (manager, runner) = manager_with(vec![
            hook("files", "c", "", "echo after files"),
            hook("branches", "c", "", "echo after branches"),
        ]);
        let coordinator = CompletionCoordinator::new();

        coordinator.start(manager.execute_before("files", "c").unwrap());
        let stale = coordinator.register_completion().unwrap();

        coordinator.start(manager.execute_before("branches", "c").unwrap());
        stale.complete(true).unwrap();
        assert!(coordinator.is_active());
        assert!(runner.calls().is_empty());

        coordinator.finalize().unwrap();
        assert_eq!(runner.scripts(), vec!["echo after branches"]);
    }

    #[test]
    fn test_completion_propagates_after_error() {
        let (manager, runner) = manager_with(vec![hook("files", "c", "", "echo after")]);
        runner.fail_on("echo after", "after broke");
        let coordinator = CompletionCoordinator::new();
        coordinator.start(manager.execute_before("files", "c").unwrap());

        let token = coordinator.register_completion().unwrap();
        let err = token.complete(true).unwrap_err();
        assert_eq!(err.to_string(), "action hook (after) failed: after broke");
        assert!(!coordinator.is_active());
    }

    #[test]
    fn test_finalize_propagates_after_abort() {
        let mut aborting = hook("files", "c", "", "echo after");
        aborting.abort_on_success = true;
        let (manager, _runner) = manager_with(vec![aborting]);
        let coordinator = CompletionCoordinator::new();
        coordinator.start(manager.execute_before("files", "c").unwrap());

        let err = coordinator.finalize().unwrap_err();
        assert!(err.is_abort());
    }

    #[test]
    fn test_multiple_hooks_all_fire() {
        let (manager, runner) = manager_with(vec![
            hook("files", "c", "echo before1", "echo after1"),
            hook("files", "c", "echo before2", "echo after2"),
        ]);
        let coordinator = CompletionCoordinator::new();
        coordinator.start(manager.execute_before("files", "c").unwrap());
        coordinator.finalize().unwrap();

        assert_eq!(
            runner.scripts(),
            vec!["echo before1", "echo before2", "echo after1", "echo after2"]
        );
    }

    #[test]
    fn test_track_reports_success_and_failure() {
        let (coordinator, runner) = started();

        let value: Result<u32> = coordinator.track(|| Ok(7));
        assert_eq!(value.unwrap(), 7);
        assert_eq!(runner.count_containing("echo after"), 1);

        let (coordinator, runner) = started();
        let failed: Result<()> = coordinator.track(|| Err(Error::Message("boom".to_string())));
        assert_eq!(failed.unwrap_err().to_string(), "boom");
        assert!(!coordinator.is_active());
        assert_eq!(runner.count_containing("echo after"), 0);
    }

    #[test]
    fn test_track_spawn_all_fires_once_after_every_worker() {
        let (coordinator, runner) = started();
        let done = Arc::new(AtomicUsize::new(0));
        let done_at_after = Arc::new(Mutex::new(Vec::new()));
        {
            let done = Arc::clone(&done);
            let done_at_after = Arc::clone(&done_at_after);
            runner.on_call(move || {
                done_at_after.lock().unwrap().push(done.load(Ordering::SeqCst));
            });
        }

        let operations = (0..8u64).map(|i| {
            let done = Arc::clone(&done);
            move || -> Result<()> {
                std::thread::sleep(std::time::Duration::from_millis(i * 5));
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });
        let handles = coordinator.track_spawn_all(operations);
        coordinator.finalize().unwrap();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert!(!coordinator.is_active());
        assert_eq!(runner.count_containing("echo after"), 1);
        assert_eq!(*done_at_after.lock().unwrap(), vec![8]);
    }

    #[test]
    fn test_track_spawn_all_fast_worker_waits_for_slow_sibling() {
        let (coordinator, runner) = started();
        let (release, blocked) = std::sync::mpsc::channel::<()>();

        let fast: Box<dyn FnOnce() -> Result<()> + Send> = Box::new(|| Ok(()));
        let slow: Box<dyn FnOnce() -> Result<()> + Send> = Box::new(move || {
            blocked.recv().unwrap();
            Ok(())
        });
        let mut handles = coordinator.track_spawn_all([fast, slow]).into_iter();

        handles.next().unwrap().join().unwrap().unwrap();
        assert_eq!(runner.count_containing("echo after"), 0);
        assert_eq!(coordinator.pending(), 1);

        release.send(()).unwrap();
        handles.next().unwrap().join().unwrap().unwrap();
        assert_eq!(runner.count_containing("echo after"), 1);
        assert!(!coordinator.is_active());
    }

    #[test]
    fn test_track_spawn_single_worker() {
        let (coordinator, runner) = started();

        let handle = coordinator.track_spawn(|| -> Result<u8> { Ok(3) });
        coordinator.finalize().unwrap();

        assert_eq!(handle.join().unwrap().unwrap(), 3);
        assert_eq!(runner.count_containing("echo after"), 1);
    }

    #[test]
    fn test_concurrent_tokens_and_abort_never_fire_twice() {
        for _ in 0..20 {
            let (coordinator, runner) = started();
            let tokens: Vec<_> = (0..4)
                .map(|_| coordinator.register_completion().unwrap())
                .collect();

            std::thread::scope(|scope| {
                for token in &tokens {
                    scope.spawn(move || token.complete(true).unwrap());
                }
                scope.spawn(|| coordinator.abort());
            });

            assert!(runner.count_containing("echo after") <= 1);
            assert!(!coordinator.is_active());
        }
    }
}
