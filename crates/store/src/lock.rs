//! Scope-keyed critical sections.
//!
//! Mutating services serialize on a [`LockScope`] rather than on one global
//! lock: work on different blood types proceeds in parallel, work on the
//! same type never overlaps. Every service touching stock for a type must
//! run its load-check-commit sequence under that type's scope.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use hemobank_core::{BloodType, DonationId};

/// Key for one critical section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockScope {
    /// All stock movement for one blood type.
    BloodType(BloodType),
    /// Screening of one donation.
    Donation(DonationId),
}

/// Registry of per-scope mutexes, created lazily on first use.
#[derive(Debug, Default)]
pub struct LockManager {
    scopes: Mutex<HashMap<LockScope, Arc<Mutex<()>>>>,
}

impl LockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the mutex for `scope`.
    ///
    /// Closures under the same scope never overlap; different scopes do not
    /// block each other. Scopes are not reentrant: `f` must not take its
    /// own scope again.
    pub fn with_lock<T>(&self, scope: LockScope, f: impl FnOnce() -> T) -> T {
        let scope_mutex = {
            // The registry and the scope mutexes guard no data of their
            // own, so poison from a panicked closure is recovered.
            let mut scopes = self.scopes.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(scopes.entry(scope).or_default())
        };
        let _held = scope_mutex.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn closure_result_is_returned() {
        let manager = LockManager::new();
        let total = manager.with_lock(LockScope::BloodType(BloodType::BPos), || 450 + 50);
        assert_eq!(total, 500);
    }

    #[test]
    fn same_scope_closures_never_overlap() {
        let manager = Arc::new(LockManager::new());
        let inside = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let manager = Arc::clone(&manager);
            let inside = Arc::clone(&inside);
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    manager.with_lock(LockScope::BloodType(BloodType::APos), || {
                        assert!(!inside.swap(true, Ordering::SeqCst));
                        thread::yield_now();
                        inside.store(false, Ordering::SeqCst);
                    });
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn different_scopes_do_not_block_each_other() {
        let manager = Arc::new(LockManager::new());
        let (holding_tx, holding_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let background = {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                manager.with_lock(LockScope::BloodType(BloodType::APos), || {
                    holding_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                });
            })
        };
        holding_rx.recv_timeout(Duration::from_secs(1)).unwrap();

        let value = manager.with_lock(LockScope::BloodType(BloodType::ONeg), || 7);
        assert_eq!(value, 7);

        release_tx.send(()).unwrap();
        background.join().unwrap();
    }

    #[test]
    fn panicked_closure_does_not_wedge_its_scope() {
        let manager = Arc::new(LockManager::new());
        let scope = LockScope::Donation(DonationId::new());

        let crashed = {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                manager.with_lock(scope, || panic!("screening failed mid-flight"));
            })
        };
        assert!(crashed.join().is_err());

        let value = manager.with_lock(scope, || 42);
        assert_eq!(value, 42);
    }
}
