//! Concurrent first access to a resource's action table.
//!
//! Many threads race to read the table of a resource that has never been
//! declared. Declaration must run once and every thread must see the same,
//! fully built table.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use rested_core::{
    ActionCell, ActionMeta, ActionRegistry, Capabilities, Outcome, RegistrationError, Resource,
    Target, Verb,
};

static DECLARATIONS: AtomicUsize = AtomicUsize::new(0);
static ORDERS_ACTIONS: ActionCell<Orders> = ActionCell::new();

struct Orders;

impl Resource for Orders {
    fn name(&self) -> &str {
        "orders"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::read_only()
    }

    fn declare_actions(&self, actions: &mut ActionRegistry<Self>) -> Result<(), RegistrationError> {
        DECLARATIONS.fetch_add(1, Ordering::SeqCst);
        // Widen the window in which other threads arrive mid-declaration.
        thread::sleep(std::time::Duration::from_millis(20));

        actions.register(ActionMeta::new(Verb::Post, "cancel"), |_, _| {
            Box::pin(async { Ok(Outcome::empty()) })
        })?;
        actions.register(ActionMeta::new(Verb::Post, "refund"), |_, _| {
            Box::pin(async { Ok(Outcome::empty()) })
        })?;
        actions.register(
            ActionMeta::new(Verb::Get, "summary").collection().public(),
            |_, _| Box::pin(async { Ok(Outcome::empty()) }),
        )
    }
}

#[test]
fn concurrent_first_access_declares_once() {
    const THREADS: usize = 16;
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let registry = ORDERS_ACTIONS.get(&Orders).expect("declaration succeeds");
                assert_eq!(registry.len(), 3);
                registry as *const ActionRegistry<Orders> as usize
            })
        })
        .collect();

    let addresses: Vec<usize> = handles
        .into_iter()
        .map(|h| h.join().expect("thread completes"))
        .collect();

    assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(DECLARATIONS.load(Ordering::SeqCst), 1);

    let registry = ORDERS_ACTIONS.get(&Orders).unwrap();
    let summary = registry
        .lookup(Verb::Get, "summary", &Target::Collection)
        .expect("collection action");
    assert!(!summary.meta().requires_authorization);
    assert!(registry.lookup(Verb::Post, "cancel", &Target::Item("1")).is_some());
}
