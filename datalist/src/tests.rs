use crate::*;

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::Cell;
use core::task::Poll;
use std::sync::Mutex;

/// Hooks that never answer; they only record what was asked.
#[derive(Default)]
struct RecordingHooks {
    count_calls: Cell<usize>,
    item_calls: Cell<usize>,
}

impl<T> FetchHooks<T> for RecordingHooks {
    fn fetch_count(&self, _vector: &VirtualizingVector<T, Self>) -> Poll<usize> {
        self.count_calls.set(self.count_calls.get() + 1);
        Poll::Pending
    }

    fn fetch_item(&self, _vector: &VirtualizingVector<T, Self>, _index: usize) -> Poll<T> {
        self.item_calls.set(self.item_calls.get() + 1);
        Poll::Pending
    }
}

/// Hooks that answer synchronously: 42 items, only index 5 (= 15) is known.
#[derive(Default)]
struct ReadyHooks {
    count_calls: Cell<usize>,
}

impl FetchHooks<i32> for ReadyHooks {
    fn fetch_count(&self, _vector: &VirtualizingVector<i32, Self>) -> Poll<usize> {
        self.count_calls.set(self.count_calls.get() + 1);
        Poll::Ready(42)
    }

    fn fetch_item(&self, _vector: &VirtualizingVector<i32, Self>, index: usize) -> Poll<i32> {
        if index == 5 {
            Poll::Ready(15)
        } else {
            Poll::Pending
        }
    }
}

fn record_properties<T, H: FetchHooks<T>>(
    v: &mut VirtualizingVector<T, H>,
) -> Arc<Mutex<Vec<ChangedProperty>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    v.on_property_changed(move |p| sink.lock().unwrap().push(*p));
    seen
}

fn record_changes<T: Clone + Send + 'static, H: FetchHooks<T>>(
    v: &mut VirtualizingVector<T, H>,
) -> Arc<Mutex<Vec<CollectionChange<T>>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    v.on_collection_changed(move |c| sink.lock().unwrap().push(c.clone()));
    seen
}

// ---- VirtualizingList ----

#[test]
fn list_starts_empty() {
    let list = VirtualizingList::<i32>::new();
    assert_eq!(list.len(), 0);
    assert!(list.is_empty());
}

#[test]
fn list_set_then_get_returns_value_and_neighbours_are_unfetched() {
    let mut list = VirtualizingList::with_count(2000);
    list.set(10, 42).unwrap();
    assert_eq!(list.get(10), Ok(Some(&42)));
    assert_eq!(list.get(9), Ok(None));
    assert_eq!(list.get(11), Ok(None));
    assert_eq!(list.get(1990), Ok(None));
}

#[test]
fn list_index_operations_are_bounds_checked() {
    let mut list = VirtualizingList::with_count(20);
    let oob = Err(Error::IndexOutOfRange { index: 20, len: 20 });
    assert_eq!(list.set(20, 100), oob);
    assert_eq!(list.get(20), Err(Error::IndexOutOfRange { index: 20, len: 20 }));
    assert_eq!(
        list.insert(21, 1),
        Err(Error::IndexOutOfRange { index: 21, len: 20 })
    );
    assert_eq!(
        list.remove_at(20),
        Err(Error::IndexOutOfRange { index: 20, len: 20 })
    );
}

#[test]
fn list_insert_at_len_appends() {
    let mut list = VirtualizingList::with_count(3);
    list.insert(3, 7).unwrap();
    assert_eq!(list.len(), 4);
    assert_eq!(list.get(3), Ok(Some(&7)));
}

#[test]
fn list_push_insert_and_remove_shift_slots() {
    let mut list = VirtualizingList::with_count(20);
    list.set(2, 8).unwrap();
    list.set(10, 42).unwrap();

    list.insert(5, 123).unwrap();
    assert_eq!(list.len(), 21);
    assert_eq!(list.get(2), Ok(Some(&8)));
    assert_eq!(list.get(5), Ok(Some(&123)));
    assert_eq!(list.get(11), Ok(Some(&42)));

    assert!(list.remove(&123));
    assert!(!list.remove(&999));
    assert_eq!(list.remove_at(0), Ok(Slot::Unfetched));
    assert_eq!(list.len(), 19);
    assert_eq!(list.get(1), Ok(Some(&8)));
    assert_eq!(list.get(9), Ok(Some(&42)));

    list.push(5);
    assert_eq!(list.len(), 20);
    assert_eq!(list.get(19), Ok(Some(&5)));

    list.clear();
    assert!(list.is_empty());
}

#[test]
fn list_value_queries_ignore_unfetched_slots() {
    let mut list = VirtualizingList::with_count(20);
    list.set(10, 0).unwrap();
    assert_eq!(list.index_of(&0), Some(10));
    assert!(list.contains(&0));
    assert!(!list.contains(&1));
}

#[test]
fn list_update_count_grows_and_shrinks() {
    let mut list = VirtualizingList::with_count(5);
    list.set(1, 11).unwrap();
    list.set(4, 44).unwrap();

    list.update_count(8);
    assert_eq!(list.len(), 8);
    assert_eq!(list.get(1), Ok(Some(&11)));
    assert_eq!(list.get(4), Ok(Some(&44)));
    assert_eq!(list.get(7), Ok(None));

    list.update_count(3);
    assert_eq!(list.len(), 3);
    assert_eq!(list.get(1), Ok(Some(&11)));
    assert!(list.get(4).is_err());
}

#[test]
fn list_copy_to_fills_placeholders_at_offset() {
    let mut list = VirtualizingList::with_count(4);
    list.set(1, 8).unwrap();
    let mut dest = [9; 6];
    list.copy_to(&mut dest, 2, &0).unwrap();
    assert_eq!(dest, [9, 9, 0, 8, 0, 0]);

    let mut short = [0; 3];
    assert_eq!(
        list.copy_to(&mut short, 0, &0),
        Err(Error::DestinationTooSmall {
            needed: 4,
            available: 3
        })
    );
}

#[test]
fn list_iterates_slots_in_order() {
    let mut list = VirtualizingList::with_count(3);
    list.set(2, 8).unwrap();
    let slots: Vec<_> = list.iter().cloned().collect();
    assert_eq!(slots, vec![Slot::Unfetched, Slot::Unfetched, Slot::Fetched(8)]);

    let collected: VirtualizingList<i32> = [1, 2].into_iter().collect();
    assert!(collected.iter().all(Slot::is_fetched));
}

#[test]
fn fetched_default_is_distinguishable_from_unfetched() {
    let mut list = VirtualizingList::with_count(2);
    list.set(0, 0).unwrap();
    assert_eq!(list.is_fetched(0), Ok(true));
    assert_eq!(list.is_fetched(1), Ok(false));
    assert_eq!(list.slot(0).unwrap().value_or(&7), &0);
    assert_eq!(list.slot(1).unwrap().value_or(&7), &7);
}

// ---- VirtualizingVector ----

#[test]
fn count_is_zero_until_updated_and_fetches_once() {
    let mut v = VirtualizingVector::<i32, _>::new(RecordingHooks::default());
    assert_eq!(v.len(), 0);
    assert!(!v.count_requested());

    for _ in 0..4 {
        assert_eq!(v.count(), 0);
    }
    assert!(v.count_requested());
    assert_eq!(v.hooks().count_calls.get(), 1);
}

#[test]
fn ready_count_is_applied_immediately() {
    let mut v = VirtualizingVector::new(ReadyHooks::default());
    assert_eq!(v.count(), 42);
    assert_eq!(v.count(), 42);
    assert_eq!(v.hooks().count_calls.get(), 1);
}

#[test]
fn ready_item_is_returned_and_others_read_as_placeholder() {
    let mut v = VirtualizingVector::new(ReadyHooks::default());
    v.update_count(42);
    assert_eq!(v.get(5), Ok(&15));
    assert_eq!(v.get(4), Ok(&0));
    assert_eq!(v.get(6), Ok(&0));
    assert_eq!(v.get(42), Err(Error::IndexOutOfRange { index: 42, len: 42 }));
}

#[test]
fn pending_item_returns_placeholder_then_value_after_update() {
    let mut v = VirtualizingVector::<i32, _>::new(RecordingHooks::default());
    let changes = record_changes(&mut v);
    v.update_count(20);
    changes.lock().unwrap().clear();

    assert_eq!(v.get(10), Ok(&0));
    assert_eq!(v.get(10), Ok(&0));
    assert_eq!(v.hooks().item_calls.get(), 2);

    v.update_item(10, 42).unwrap();
    assert_eq!(v.get(10), Ok(&42));
    assert_eq!(v.hooks().item_calls.get(), 2);

    let changes = changes.lock().unwrap();
    assert_eq!(
        *changes,
        vec![CollectionChange::Replace {
            index: 10,
            old: 0,
            new: 42
        }]
    );
}

#[test]
fn custom_placeholder_is_used_for_unfetched_items() {
    let mut v = VirtualizingVector::with_placeholder(RecordingHooks::default(), -1);
    v.update_count(3);
    assert_eq!(v.get(1), Ok(&-1));
    assert_eq!(v.iter().copied().collect::<Vec<_>>(), vec![-1, -1, -1]);
}

#[test]
fn update_count_notifies_count_then_reset() {
    let mut v = VirtualizingVector::<i32, _>::new(RecordingHooks::default());
    let props = record_properties(&mut v);
    let changes = record_changes(&mut v);

    v.update_count(42);
    assert_eq!(*props.lock().unwrap(), vec![ChangedProperty::Count]);
    assert_eq!(*changes.lock().unwrap(), vec![CollectionChange::Reset]);
}

#[test]
fn update_count_with_same_value_is_silent() {
    let mut v = VirtualizingVector::<i32, _>::new(RecordingHooks::default());
    v.update_count(42);
    let props = record_properties(&mut v);
    let changes = record_changes(&mut v);

    v.update_count(42);
    assert!(props.lock().unwrap().is_empty());
    assert!(changes.lock().unwrap().is_empty());
}

#[test]
fn update_item_notifies_items_property() {
    let mut v = VirtualizingVector::<i32, _>::new(RecordingHooks::default());
    v.update_count(3);
    let props = record_properties(&mut v);
    v.update_item(1, 9).unwrap();
    assert_eq!(*props.lock().unwrap(), vec![ChangedProperty::Items]);
    assert_eq!(
        v.update_item(3, 9),
        Err(Error::IndexOutOfRange { index: 3, len: 3 })
    );
}

#[test]
fn all_mutators_fail_as_read_only() {
    let mut v = VirtualizingVector::new(ReadyHooks::default());
    v.update_count(42);
    assert!(v.is_read_only());
    assert_eq!(v.push(42), Err(Error::ReadOnly));
    assert_eq!(v.insert(2, 42), Err(Error::ReadOnly));
    assert_eq!(v.set(6, 10), Err(Error::ReadOnly));
    assert_eq!(v.remove(&2), Err(Error::ReadOnly));
    assert_eq!(v.remove_at(2), Err(Error::ReadOnly));
    assert_eq!(v.clear(), Err(Error::ReadOnly));
    assert_eq!(v.len(), 42);
}

#[test]
fn contains_and_index_of_do_not_fetch() {
    let mut v = VirtualizingVector::<i32, _>::new(RecordingHooks::default());
    v.update_count(42);
    v.update_item(5, 15).unwrap();
    assert!(v.contains(&15));
    assert!(!v.contains(&16));
    assert_eq!(v.index_of(&15), Some(5));
    assert_eq!(v.hooks().item_calls.get(), 0);
}

#[test]
fn iteration_is_a_restartable_snapshot_without_fetches() {
    let mut v = VirtualizingVector::<i32, _>::new(RecordingHooks::default());
    v.update_count(6);
    v.update_item(2, 8).unwrap();

    let first: Vec<i32> = v.iter().copied().collect();
    let second: Vec<i32> = (&v).into_iter().copied().collect();
    assert_eq!(first, vec![0, 0, 8, 0, 0, 0]);
    assert_eq!(first, second);
    assert_eq!(v.iter().len(), 6);
    assert_eq!(v.hooks().item_calls.get(), 0);

    let mut dest = [0; 6];
    v.copy_to(&mut dest, 0).unwrap();
    assert_eq!(dest, [0, 0, 8, 0, 0, 0]);
}

#[test]
fn observers_fire_in_registration_order_and_can_unsubscribe() {
    let mut v = VirtualizingVector::<i32, _>::new(RecordingHooks::default());
    let order = Arc::new(Mutex::new(Vec::new()));

    let a = Arc::clone(&order);
    let first = v.on_property_changed(move |_| a.lock().unwrap().push("first"));
    let b = Arc::clone(&order);
    v.on_property_changed(move |_| b.lock().unwrap().push("second"));

    v.update_count(1);
    assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);

    assert!(v.unsubscribe(first));
    assert!(!v.unsubscribe(first));
    v.update_count(2);
    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "second"]);
}

#[test]
fn deferred_notifications_are_held_until_dispatch() {
    let mut v = VirtualizingVector::<i32, _>::new(RecordingHooks::default());
    let props = record_properties(&mut v);

    let ((), pending) = v.with_deferred(|v| {
        v.update_count(3);
        v.update_item(0, 1).unwrap();
    });
    assert!(props.lock().unwrap().is_empty());
    assert_eq!(pending.len(), 4);

    pending.dispatch();
    assert_eq!(
        *props.lock().unwrap(),
        vec![ChangedProperty::Count, ChangedProperty::Items]
    );
}

#[test]
fn nested_deferral_dispatches_only_at_the_outermost_level() {
    let mut v = VirtualizingVector::<i32, _>::new(RecordingHooks::default());
    let props = record_properties(&mut v);

    let ((), outer) = v.with_deferred(|v| {
        let ((), inner) = v.with_deferred(|v| v.update_count(1));
        assert!(inner.is_empty());
        v.notify_property_changed(ChangedProperty::Named("custom"));
    });
    assert_eq!(outer.len(), 3);
    outer.dispatch();
    assert_eq!(
        *props.lock().unwrap(),
        vec![ChangedProperty::Count, ChangedProperty::Named("custom")]
    );
}

#[test]
fn batch_update_dispatches_on_return() {
    let mut v = VirtualizingVector::<i32, _>::new(RecordingHooks::default());
    let changes = record_changes(&mut v);
    v.batch_update(|v| {
        v.update_count(2);
        assert!(changes.lock().unwrap().is_empty());
    });
    assert_eq!(*changes.lock().unwrap(), vec![CollectionChange::Reset]);
}

#[test]
fn hooks_can_raise_their_own_notifications() {
    struct LoudHooks;

    impl FetchHooks<i32> for LoudHooks {
        fn fetch_count(&self, vector: &VirtualizingVector<i32, Self>) -> Poll<usize> {
            vector.notify_property_changed(ChangedProperty::Named("loading"));
            Poll::Pending
        }

        fn fetch_item(&self, _vector: &VirtualizingVector<i32, Self>, _index: usize) -> Poll<i32> {
            Poll::Pending
        }
    }

    let mut v = VirtualizingVector::new(LoudHooks);
    let props = record_properties(&mut v);
    v.count();
    assert_eq!(*props.lock().unwrap(), vec![ChangedProperty::Named("loading")]);
}
