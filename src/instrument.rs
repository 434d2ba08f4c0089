//! This module is for testing only
//!
//! Element types that count their constructions, clones, clone-assignments
//! and drops through a shared ledger, and that can be told to fail a chosen
//! construction or clone call.

use std::cell::RefCell;
use std::rc::Rc;

use crate::Relocate;

/// Lifecycle event counters shared by all instrumented values of one test.
#[derive(Default, Debug)]
pub struct Events {
    pub created: usize,
    pub cloned: usize,
    pub clone_assigned: usize,
    pub dropped: usize,
    /// When set, the create call after this many more successes panics.
    pub fail_create_after: Option<usize>,
    /// When set, the clone call after this many more successes panics.
    pub fail_clone_after: Option<usize>,
}

pub type Shared = Rc<RefCell<Events>>;

impl Events {
    pub fn shared() -> Shared {
        Rc::new(RefCell::new(Events::default()))
    }

    fn on_create(&mut self) {
        if let Some(left) = self.fail_create_after {
            if left == 0 {
                panic!("injected constructor failure");
            }
            self.fail_create_after = Some(left - 1);
        }
        self.created += 1;
    }

    fn on_clone(&mut self) {
        if let Some(left) = self.fail_clone_after {
            if left == 0 {
                panic!("injected clone failure");
            }
            self.fail_clone_after = Some(left - 1);
        }
        self.cloned += 1;
    }

    /// Values currently alive according to the ledger.
    pub fn live(&self) -> isize {
        (self.created + self.cloned) as isize - self.dropped as isize
    }
}

/// Instrumented element whose clone may be made to fail. Declares that its
/// move may fail too, so every relocation must go through a countable copy.
pub struct Fragile {
    pub value: i64,
    events: Shared,
}

impl Fragile {
    pub fn new(value: i64, events: &Shared) -> Fragile {
        events.borrow_mut().on_create();
        Fragile { value, events: events.clone() }
    }
}

impl Clone for Fragile {
    fn clone(&self) -> Fragile {
        self.events.borrow_mut().on_clone();
        Fragile { value: self.value, events: self.events.clone() }
    }

    fn clone_from(&mut self, source: &Fragile) {
        self.events.borrow_mut().clone_assigned += 1;
        self.value = source.value;
    }
}

impl Drop for Fragile {
    fn drop(&mut self) {
        self.events.borrow_mut().dropped += 1;
    }
}

impl Relocate for Fragile {
    const MOVE_NEVER_FAILS: bool = false;

    fn duplicate(&self) -> Fragile {
        self.clone()
    }

    fn duplicate_from(&mut self, source: &Fragile) {
        self.clone_from(source);
    }
}

impl PartialEq for Fragile {
    fn eq(&self, other: &Fragile) -> bool {
        self.value == other.value
    }
}

/// Instrumented element whose move is declared to never fail, so
/// relocations transfer it bitwise and the ledger records nothing for them.
pub struct Sturdy {
    pub value: i64,
    events: Shared,
}

impl Sturdy {
    pub fn new(value: i64, events: &Shared) -> Sturdy {
        events.borrow_mut().on_create();
        Sturdy { value, events: events.clone() }
    }
}

impl Clone for Sturdy {
    fn clone(&self) -> Sturdy {
        self.events.borrow_mut().on_clone();
        Sturdy { value: self.value, events: self.events.clone() }
    }
}

impl Drop for Sturdy {
    fn drop(&mut self) {
        self.events.borrow_mut().dropped += 1;
    }
}

impl Relocate for Sturdy {
    const MOVE_NEVER_FAILS: bool = true;

    fn duplicate(&self) -> Sturdy {
        self.clone()
    }
}

/// Instrumented element that cannot be duplicated at all; relocation has no
/// choice but to move it.
pub struct Solo {
    pub value: i64,
    events: Shared,
}

impl Solo {
    pub fn new(value: i64, events: &Shared) -> Solo {
        events.borrow_mut().on_create();
        Solo { value, events: events.clone() }
    }
}

impl Drop for Solo {
    fn drop(&mut self) {
        self.events.borrow_mut().dropped += 1;
    }
}

impl Relocate for Solo {
    const MOVE_NEVER_FAILS: bool = true;
}

#[test]
fn ledger_counts_lifecycle_events() {
    let events = Events::shared();
    let a = Fragile::new(1, &events);
    let b = a.clone();
    let mut c = Fragile::new(3, &events);
    c.clone_from(&a);
    std::mem::drop(b);
    {
        let snap = events.borrow();
        assert_eq!(2, snap.created);
        assert_eq!(1, snap.cloned);
        assert_eq!(1, snap.clone_assigned);
        assert_eq!(1, snap.dropped);
        assert_eq!(2, snap.live());
    }
    std::mem::drop(a);
    std::mem::drop(c);
    assert_eq!(0, events.borrow().live());
}

#[test]
fn injected_clone_failure_fires_after_budget() {
    let events = Events::shared();
    events.borrow_mut().fail_clone_after = Some(1);
    let a = Fragile::new(1, &events);
    let _b = a.clone();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| a.clone()));
    assert!(result.is_err());
    assert_eq!(1, events.borrow().cloned);
}
