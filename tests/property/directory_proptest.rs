//! Property-based tests for the connection directory
//!
//! Replays a random sequence of register/unregister operations against a
//! model map and checks the directory agrees with it.

use std::collections::HashMap;

use circle_chat::backend::realtime::{ConnectionDirectory, ConnectionHandle};
use proptest::prelude::*;
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Op {
    /// Register user `n` on a fresh connection
    Register(usize),
    /// Unregister user `n` using their current connection id
    Unregister(usize),
    /// Unregister user `n` using a stale connection id
    UnregisterStale(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize).prop_map(Op::Register),
        (0..4usize).prop_map(Op::Unregister),
        (0..4usize).prop_map(Op::UnregisterStale),
    ]
}

proptest! {
    #[test]
    fn test_directory_matches_model(ops in prop::collection::vec(op(), 0..40)) {
        let users: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let directory = ConnectionDirectory::new();
        let mut model: HashMap<Uuid, Uuid> = HashMap::new();
        let mut receivers = Vec::new();

        for op in ops {
            match op {
                Op::Register(n) => {
                    let (handle, rx) = ConnectionHandle::channel(1);
                    receivers.push(rx);
                    model.insert(users[n], handle.id());
                    directory.register(users[n], handle);
                }
                Op::Unregister(n) => {
                    if let Some(id) = model.remove(&users[n]) {
                        prop_assert!(directory.unregister(&users[n], id));
                    }
                }
                Op::UnregisterStale(n) => {
                    prop_assert!(!directory.unregister(&users[n], Uuid::new_v4()));
                }
            }

            prop_assert_eq!(directory.online_count(), model.len());
            for user in &users {
                let current = directory.lookup(user).map(|h| h.id());
                prop_assert_eq!(current, model.get(user).copied());
            }
        }
    }
}
