use core::{
    cell::RefCell,
    sync::atomic::{
        AtomicBool, AtomicUsize,
        Ordering::{AcqRel, Acquire, Relaxed},
    },
};

use critical_section::Mutex;

/// Single-slot handoff from an interrupt (one [`Poster`]) to a task (one
/// [`Collector`]).
///
/// Holds at most one value. Posting while a value is still waiting replaces
/// it: the newest value wins and the loss is counted in
/// [`Collector::overwritten`]. There is no backpressure on the poster.
pub struct Mailbox<T> {
    is_split: AtomicBool,
    slot: Mutex<RefCell<Option<T>>>,
    posted: AtomicUsize,
    overwritten: AtomicUsize,
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mailbox<T> {
    pub const fn new() -> Self {
        Self {
            is_split: AtomicBool::new(false),
            slot: Mutex::new(RefCell::new(None)),
            posted: AtomicUsize::new(0),
            overwritten: AtomicUsize::new(0),
        }
    }

    /// Hands out the poster and collector. Only the first call succeeds.
    pub fn try_split(&'static self) -> Option<(Poster<T>, Collector<T>)> {
        if self.is_split.fetch_or(true, AcqRel) {
            None
        } else {
            Some((Poster(self), Collector(self)))
        }
    }

    fn is_empty(&self) -> bool {
        critical_section::with(|cs| self.slot.borrow_ref(cs).is_none())
    }
}

pub struct Poster<T: 'static>(&'static Mailbox<T>);

impl<T: 'static> Poster<T> {
    /// Stores `val`, returning the unconsumed value it displaced, if any.
    pub fn post(&self, val: T) -> Option<T> {
        let displaced = critical_section::with(|cs| self.0.slot.borrow_ref_mut(cs).replace(val));
        self.0.posted.fetch_add(1, Relaxed);
        if displaced.is_some() {
            self.0.overwritten.fetch_add(1, Relaxed);
            debug!("mailbox: unconsumed value overwritten");
        }
        displaced
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct Collector<T: 'static>(&'static Mailbox<T>);

impl<T: 'static> Collector<T> {
    /// Takes the waiting value, leaving the slot empty.
    pub fn take(&self) -> Option<T> {
        critical_section::with(|cs| self.0.slot.borrow_ref_mut(cs).take())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values posted since start-up.
    pub fn posted(&self) -> usize {
        self.0.posted.load(Acquire)
    }

    /// Values replaced before anyone took them.
    pub fn overwritten(&self) -> usize {
        self.0.overwritten.load(Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leak<T: 'static>() -> &'static Mailbox<T> {
        Box::leak(Box::new(Mailbox::new()))
    }

    #[test]
    fn splits_once() {
        let mailbox = leak::<u8>();
        assert!(mailbox.try_split().is_some());
        assert!(mailbox.try_split().is_none());
    }

    #[test]
    fn take_clears_slot() {
        let (poster, collector) = leak::<u32>().try_split().unwrap();
        assert_eq!(collector.take(), None);
        assert_eq!(poster.post(7), None);
        assert!(!collector.is_empty());
        assert_eq!(collector.take(), Some(7));
        assert_eq!(collector.take(), None);
        assert!(poster.is_empty());
    }

    #[test]
    fn newest_value_wins() {
        let (poster, collector) = leak::<u32>().try_split().unwrap();
        poster.post(1);
        assert_eq!(poster.post(2), Some(1));
        assert_eq!(poster.post(3), Some(2));
        assert_eq!(collector.take(), Some(3));
        assert_eq!(collector.posted(), 3);
        assert_eq!(collector.overwritten(), 2);
    }

    #[test]
    fn poster_and_collector_on_separate_threads() {
        static MAILBOX: Mailbox<u32> = Mailbox::new();
        let (poster, collector) = MAILBOX.try_split().unwrap();

        let producer = std::thread::spawn(move || {
            for v in 1..=1000 {
                poster.post(v);
            }
        });

        let mut last = 0;
        let mut taken = 0;
        while taken < 1000 {
            match collector.take() {
                Some(v) => {
                    assert!(v > last, "values only move forward");
                    last = v;
                    taken += 1;
                }
                None if producer.is_finished() && collector.is_empty() => break,
                None => std::thread::yield_now(),
            }
        }
        producer.join().unwrap();

        assert_eq!(collector.posted(), 1000);
        assert_eq!(collector.overwritten() + taken, 1000);
    }
}
