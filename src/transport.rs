//! Seams between the engine and the host application
//!
//! The engine is sans-IO: it never performs HTTP requests or touches
//! browser storage itself. The host application supplies implementations
//! of the traits in this module, and the engine calls them at the points
//! where a real client would issue a request or persist a value. Keeping
//! both seams as traits is what makes the state machines testable with
//! plain recording fakes.

use crate::Request;

/// Trait for dispatching network requests to the backend
///
/// Dispatch is fire-and-forget from the engine's perspective: the host
/// issues the request asynchronously and later feeds the outcome back
/// through the appropriate `receive_*` method on the owning component.
/// The engine never blocks on a dispatch.
pub trait Transport {
    /// Dispatches a request to the backend
    ///
    /// # Arguments
    ///
    /// * `request` - The request to issue; `Request::method` and
    ///   `Request::path` describe the wire call
    fn dispatch(&self, request: &Request);
}

/// Trait for best-effort string key/value persistence
///
/// Backed by browser local storage in the real client. Nothing stored
/// through this trait is authoritative: a missing or corrupted value must
/// always be survivable, so the interface is infallible and lossy by
/// design.
pub trait Storage {
    /// Returns the stored value for a key, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Stores a value under a key, overwriting any previous value
    fn put(&self, key: &str, value: &str);

    /// Removes a key and its value if present
    fn remove(&self, key: &str);
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub(crate) mod testing {
    //! Recording fakes shared by the unit tests across the crate.

    use std::{cell::RefCell, collections::HashMap};

    use super::{Storage, Transport};
    use crate::Request;

    /// Transport fake that records every dispatched request in order
    #[derive(Default)]
    pub struct RecordingTransport {
        requests: RefCell<Vec<Request>>,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn requests(&self) -> Vec<Request> {
            self.requests.borrow().clone()
        }

        pub fn paths(&self) -> Vec<String> {
            self.requests.borrow().iter().map(Request::path).collect()
        }

        pub fn len(&self) -> usize {
            self.requests.borrow().len()
        }

        pub fn clear(&self) {
            self.requests.borrow_mut().clear();
        }
    }

    impl Transport for RecordingTransport {
        fn dispatch(&self, request: &Request) {
            self.requests.borrow_mut().push(request.clone());
        }
    }

    /// In-memory storage fake
    #[derive(Default)]
    pub struct MemoryStorage {
        values: RefCell<HashMap<String, String>>,
    }

    impl MemoryStorage {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl Storage for MemoryStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.values.borrow().get(key).cloned()
        }

        fn put(&self, key: &str, value: &str) {
            self.values
                .borrow_mut()
                .insert(key.to_owned(), value.to_owned());
        }

        fn remove(&self, key: &str) {
            self.values.borrow_mut().remove(key);
        }
    }
}
