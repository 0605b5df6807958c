// Example: a vector backed by an in-memory "server" that answers on the next tick.
use std::cell::RefCell;
use std::task::Poll;

use datalist::{CollectionChange, FetchHooks, VirtualizingVector};

#[derive(Default)]
struct Requests {
    count: RefCell<bool>,
    items: RefCell<Vec<usize>>,
}

impl FetchHooks<u64> for Requests {
    fn fetch_count(&self, _vector: &VirtualizingVector<u64, Self>) -> Poll<usize> {
        *self.count.borrow_mut() = true;
        Poll::Pending
    }

    fn fetch_item(&self, _vector: &VirtualizingVector<u64, Self>, index: usize) -> Poll<u64> {
        self.items.borrow_mut().push(index);
        Poll::Pending
    }
}

fn main() {
    let mut v = VirtualizingVector::new(Requests::default());
    v.on_collection_changed(|c: &CollectionChange<u64>| println!("changed: {c:?}"));

    println!("count before load: {}", v.count());

    // The "server" answers the count request.
    if v.hooks().count.replace(false) {
        v.update_count(1_000_000);
    }
    println!("count after load: {}", v.count());

    // A UI reads a window of rows; each unfetched row returns the placeholder.
    for i in 500..505 {
        println!("row {i}: {:?}", v.get(i));
    }

    // The "server" answers the item requests.
    let requested: Vec<usize> = v.hooks().items.borrow_mut().drain(..).collect();
    v.batch_update(|v| {
        for i in requested {
            let _ = v.update_item(i, i as u64 * 2);
        }
    });
    println!("window: {:?}", v.iter().skip(500).take(5).collect::<Vec<_>>());
}
