//! Write Slot
//!
//! A FIFO ticket lock limiting each table to one in-flight write.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex};

/// Per-table write serializer
///
/// ## Ordering:
/// - `ticket()` hands out numbers from an atomic counter; the order in which
///   tickets are taken is the order in which writes are admitted
/// - `now_serving` advances each time a holder releases the slot, skipping
///   tickets that were dropped without being redeemed
/// - Waiters park on `turn` and re-check after every release
///
/// A plain mutex gives mutual exclusion but not arrival order; the ticket
/// counter is what makes a later-issued write always land after an earlier one.
pub struct WriteSlot {
    /// Next ticket number to hand out (atomic, lock-free)
    next_ticket: AtomicU64,

    /// Serving position and abandoned tickets
    queue: Mutex<Queue>,

    /// Signalled whenever `now_serving` advances
    turn: Condvar,
}

struct Queue {
    /// Ticket currently allowed to write
    now_serving: u64,

    /// Tickets dropped before their turn; skipped when reached
    abandoned: BTreeSet<u64>,
}

impl Queue {
    fn advance(&mut self) {
        self.now_serving += 1;
        while self.abandoned.remove(&self.now_serving) {
            self.now_serving += 1;
        }
    }
}

impl WriteSlot {
    /// Create an idle slot
    pub fn new() -> Self {
        Self {
            next_ticket: AtomicU64::new(0),
            queue: Mutex::new(Queue {
                now_serving: 0,
                abandoned: BTreeSet::new(),
            }),
            turn: Condvar::new(),
        }
    }

    /// Take a place in the queue without waiting
    pub fn ticket(&self) -> Ticket<'_> {
        let number = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        Ticket { slot: self, number }
    }

    /// Take a ticket and block until it is served
    pub fn acquire(&self) -> SlotGuard<'_> {
        self.ticket().wait()
    }

    /// Writers holding or waiting for the slot, including abandoned tickets
    /// not yet skipped
    pub fn pending(&self) -> u64 {
        let serving = self.queue.lock().now_serving;
        self.next_ticket.load(Ordering::SeqCst).saturating_sub(serving)
    }

    fn wait_for(&self, number: u64) {
        let mut queue = self.queue.lock();
        while queue.now_serving != number {
            self.turn.wait(&mut queue);
        }
    }

    fn release(&self) {
        self.queue.lock().advance();
        self.turn.notify_all();
    }

    fn abandon(&self, number: u64) {
        let mut queue = self.queue.lock();
        if queue.now_serving == number {
            queue.advance();
            drop(queue);
            self.turn.notify_all();
        } else {
            queue.abandoned.insert(number);
        }
    }
}

impl Default for WriteSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// A reserved position in a slot's queue
///
/// Dropping an unredeemed ticket gives up its position without blocking; the
/// slot skips it when its turn comes, so writers queued behind it proceed.
#[must_use = "a ticket holds a place in the write queue"]
pub struct Ticket<'a> {
    slot: &'a WriteSlot,
    number: u64,
}

impl<'a> Ticket<'a> {
    /// Position in the queue
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Block until every earlier ticket has released the slot
    ///
    /// Waiting on a ticket while holding a guard of the same slot deadlocks.
    pub fn wait(self) -> SlotGuard<'a> {
        let slot = self.slot;
        slot.wait_for(self.number);
        std::mem::forget(self);
        SlotGuard { slot }
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        self.slot.abandon(self.number);
    }
}

/// Exclusive hold on a write slot; releases on drop (including unwinding)
pub struct SlotGuard<'a> {
    slot: &'a WriteSlot,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.slot.release();
    }
}
