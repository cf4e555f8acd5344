//! The ammunition depot: a bounded counter shared by one producer (the supply
//! truck) and one consumer (the helicopter reload).
//!
//! The truck blocks in [`Depot::deposit`] until there is headroom and no
//! reload is running. Everything the helicopter calls returns immediately so
//! the control loop never stalls. Every state change wakes all waiters on
//! both conditions.

use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::{Condvar, Mutex, MutexGuard};

/// How often a blocked producer re-checks its cancellation predicate.
const WAIT_SLICE: Duration = Duration::from_millis(25);

#[derive(Debug)]
struct Stock {
    ammo: u32,
    truck_unloading: bool,
    helicopter_reloading: bool,
}

/// Point-in-time copy of the depot, for display and assertions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepotStatus {
    pub ammo: u32,
    pub capacity: u32,
    pub truck_unloading: bool,
    pub helicopter_reloading: bool,
}

/// Outcome of asking to start a reload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloadGate {
    Granted,
    Empty,
    TruckUnloading,
}

#[derive(Debug)]
pub struct Depot {
    capacity: u32,
    stock: Mutex<Stock>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl Depot {
    /// `initial` is clamped to `capacity`.
    pub fn new(capacity: u32, initial: u32) -> Self {
        Depot {
            capacity,
            stock: Mutex::new(Stock {
                ammo: initial.min(capacity),
                truck_unloading: false,
                helicopter_reloading: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn ammo(&self) -> u32 {
        self.stock.lock().ammo
    }

    pub fn status(&self) -> DepotStatus {
        let stock = self.stock.lock();
        DepotStatus {
            ammo: stock.ammo,
            capacity: self.capacity,
            truck_unloading: stock.truck_unloading,
            helicopter_reloading: stock.helicopter_reloading,
        }
    }

    // ── Producer ──────────────────────────────────────────────────────────────

    /// Unload up to `amount` rounds.
    ///
    /// Blocks while the depot is full, a reload is in progress, or another
    /// unload is running. Once admitted, the clamped amount is added at once
    /// and the depot stays marked as unloading for `unload_time`.
    ///
    /// `keep_going` is polled while blocked and while unloading; when it
    /// turns false the call returns `None`. Rounds already added by an
    /// interrupted unload stay in the depot and the busy flag is cleared.
    /// It may run with the depot lock held and must not take other locks.
    pub fn deposit(
        &self,
        amount: u32,
        unload_time: Duration,
        keep_going: impl Fn() -> bool,
    ) -> Option<u32> {
        let mut stock = self.stock.lock();
        while stock.ammo >= self.capacity || stock.helicopter_reloading || stock.truck_unloading {
            if !keep_going() {
                return None;
            }
            let _ = self.not_full.wait_for(&mut stock, WAIT_SLICE);
        }

        stock.truck_unloading = true;
        let added = amount.min(self.capacity - stock.ammo);
        stock.ammo += added;
        debug!("depot: unloading {added} rounds, now {}/{}", stock.ammo, self.capacity);

        let finished = MutexGuard::unlocked(&mut stock, || nap(unload_time, &keep_going));

        stock.truck_unloading = false;
        self.broadcast();
        finished.then_some(added)
    }

    // ── Consumer ──────────────────────────────────────────────────────────────

    /// Take up to `amount` rounds without blocking. Returns what was taken.
    pub fn withdraw(&self, amount: u32) -> u32 {
        let mut stock = self.stock.lock();
        let taken = take(&mut stock, amount);
        if taken > 0 {
            self.broadcast();
        }
        taken
    }

    /// Try to mark a reload as in progress.
    pub fn begin_reload(&self) -> ReloadGate {
        let mut stock = self.stock.lock();
        if stock.truck_unloading {
            return ReloadGate::TruckUnloading;
        }
        if stock.ammo == 0 {
            return ReloadGate::Empty;
        }
        stock.helicopter_reloading = true;
        ReloadGate::Granted
    }

    /// Withdraw up to `needed` rounds and clear the reload marker, as one
    /// critical section. Returns the amount transferred.
    pub fn finish_reload(&self, needed: u32) -> u32 {
        let mut stock = self.stock.lock();
        let taken = take(&mut stock, needed);
        stock.helicopter_reloading = false;
        self.broadcast();
        taken
    }

    /// Clear the reload marker without transferring anything.
    pub fn cancel_reload(&self) {
        let mut stock = self.stock.lock();
        stock.helicopter_reloading = false;
        self.broadcast();
    }

    /// Wait until the depot holds at least one round or `timeout` passes.
    pub fn wait_for_stock(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut stock = self.stock.lock();
        while stock.ammo == 0 {
            if self.not_empty.wait_until(&mut stock, deadline).timed_out() {
                return stock.ammo > 0;
            }
        }
        true
    }

    fn broadcast(&self) {
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }
}

fn take(stock: &mut Stock, amount: u32) -> u32 {
    let taken = amount.min(stock.ammo);
    stock.ammo -= taken;
    taken
}

/// Sleep for `duration` in slices, giving up early when `keep_going` fails.
fn nap(duration: Duration, keep_going: &impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + duration;
    loop {
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        if !keep_going() {
            return false;
        }
        thread::sleep((deadline - now).min(WAIT_SLICE));
    }
}
