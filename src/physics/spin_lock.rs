use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::hint;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use tracing::warn;

use crate::config::{EscalationPolicy, SpinPolicy};

const UNLOCKED: u32 = 0;
const LOCKED: u32 = 1;

/// Spin wait that moves to yielding the timeslice after a handful of exponentially growing spins.
///
/// The protected sections are a few dozen instructions long, so if the word isn't released within
/// several spins the holder has most likely been descheduled and yielding is the better bet.
pub(crate) struct LocalSpinWait {
    pub wait_count: u32,
    pub yield_threshold: u32,
}

impl LocalSpinWait {
    #[inline(always)]
    pub fn new(yield_threshold: u32) -> Self {
        Self {
            wait_count: 0,
            yield_threshold,
        }
    }

    #[inline(always)]
    pub fn spin_once(&mut self) {
        if self.wait_count >= self.yield_threshold {
            thread::yield_now();
        } else {
            let spin_count = 1u32 << self.wait_count.min(16);
            for _ in 0..spin_count {
                hint::spin_loop();
            }
            self.wait_count += 1;
        }
    }
}

/// Word-sized lock guarding a small value, acquired by compare/exchange with bounded retries.
///
/// Once `max_attempts` compare/exchanges have failed the configured [`EscalationPolicy`] decides
/// what happens; both policies preserve mutual exclusion.
pub struct SpinLock<T> {
    state: CachePadded<AtomicU32>,
    policy: SpinPolicy,
    value: UnsafeCell<T>,
}

// The value is only reachable through a guard, and a guard only exists while `state` is LOCKED.
unsafe impl<T: Send> Send for SpinLock<T> {}
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    pub fn new(value: T, policy: SpinPolicy) -> Self {
        Self {
            state: CachePadded::new(AtomicU32::new(UNLOCKED)),
            policy,
            value: UnsafeCell::new(value),
        }
    }

    #[inline(always)]
    pub fn policy(&self) -> &SpinPolicy {
        &self.policy
    }

    /// Returns true if some guard currently holds the lock. Only a snapshot.
    #[inline(always)]
    pub fn is_locked(&self) -> bool {
        self.state.load(Ordering::Relaxed) == LOCKED
    }

    /// Makes a single acquisition attempt.
    #[inline(always)]
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        self.state
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| SpinLockGuard { lock: self })
    }

    /// Acquires the lock, spinning and yielding for up to `max_attempts` tries before escalating.
    #[inline]
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        let mut spin_wait = LocalSpinWait::new(self.policy.yield_threshold);
        for _ in 0..self.policy.max_attempts {
            if let Some(guard) = self.try_lock() {
                return guard;
            }
            spin_wait.spin_once();
        }
        self.escalate()
    }

    #[cold]
    fn escalate(&self) -> SpinLockGuard<'_, T> {
        warn!(
            max_attempts = self.policy.max_attempts,
            escalation = ?self.policy.escalation,
            "spin lock attempt bound exhausted"
        );
        match self.policy.escalation.sleep_interval() {
            Some(interval) => loop {
                if let Some(guard) = self.try_lock() {
                    return guard;
                }
                thread::sleep(interval);
            },
            None => {
                debug_assert_eq!(self.policy.escalation, EscalationPolicy::Panic);
                panic!(
                    "spin lock still contended after {} attempts",
                    self.policy.max_attempts
                );
            }
        }
    }

    /// Mutable access without locking; the exclusive borrow already rules out other holders.
    #[inline(always)]
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Default> Default for SpinLock<T> {
    fn default() -> Self {
        Self::new(T::default(), SpinPolicy::default())
    }
}

/// Scoped acquisition of a [`SpinLock`]. Dropping the guard resets the word to unlocked.
pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

impl<T> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> DerefMut for SpinLockGuard<'_, T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    #[inline(always)]
    fn drop(&mut self) {
        self.lock.state.store(UNLOCKED, Ordering::Release);
    }
}
