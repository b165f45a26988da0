//! Property-based tests for the authorization gate

use std::collections::HashSet;

use circle_chat::backend::authorization::{
    can_delete_message, can_join_group, can_moderate_group, can_read_group, can_remove_member,
    DenyReason, GroupSnapshot,
};
use proptest::prelude::*;
use uuid::Uuid;

/// Group over `n` users: user 0 is admin, then each user is a member,
/// pending or neither according to `roles`
fn group_from(roles: &[u8]) -> (GroupSnapshot, Vec<Uuid>) {
    let users: Vec<Uuid> = (0..=roles.len()).map(|_| Uuid::new_v4()).collect();
    let admin = users[0];
    let mut members: HashSet<Uuid> = HashSet::from([admin]);
    let mut pending = HashSet::new();
    for (user, role) in users[1..].iter().zip(roles) {
        match role % 3 {
            0 => {
                members.insert(*user);
            }
            1 => {
                pending.insert(*user);
            }
            _ => {}
        }
    }
    (
        GroupSnapshot {
            id: Uuid::new_v4(),
            admin,
            members,
            pending,
        },
        users,
    )
}

proptest! {
    #[test]
    fn test_only_admin_moderates(roles in prop::collection::vec(any::<u8>(), 0..12)) {
        let (group, users) = group_from(&roles);
        for user in &users {
            prop_assert_eq!(can_moderate_group(&group, user).is_ok(), *user == group.admin);
        }
    }

    #[test]
    fn test_read_iff_admin_or_member(roles in prop::collection::vec(any::<u8>(), 0..12)) {
        let (group, users) = group_from(&roles);
        for user in &users {
            let expected = *user == group.admin || group.members.contains(user);
            prop_assert_eq!(can_read_group(&group, user).is_ok(), expected);
        }
    }

    #[test]
    fn test_join_allowed_iff_outsider(roles in prop::collection::vec(any::<u8>(), 0..12)) {
        let (group, users) = group_from(&roles);
        for user in &users {
            let outsider = *user != group.admin
                && !group.members.contains(user)
                && !group.pending.contains(user);
            prop_assert_eq!(can_join_group(&group, user).is_ok(), outsider);
        }
    }

    #[test]
    fn test_admin_is_never_removable(roles in prop::collection::vec(any::<u8>(), 0..12)) {
        let (group, users) = group_from(&roles);
        for actor in &users {
            prop_assert!(can_remove_member(&group, actor, &group.admin).is_err());
        }
        prop_assert_eq!(
            can_remove_member(&group, &group.admin, &group.admin),
            Err(DenyReason::CannotRemoveAdmin)
        );
    }

    #[test]
    fn test_sender_can_always_delete(roles in prop::collection::vec(any::<u8>(), 0..12), pick in any::<prop::sample::Index>()) {
        let (group, users) = group_from(&roles);
        let sender = users[pick.index(users.len())];
        prop_assert!(can_delete_message(&sender, &sender, Some(&group)).is_ok());
        prop_assert!(can_delete_message(&sender, &sender, None).is_ok());
        prop_assert!(can_delete_message(&sender, &group.admin, Some(&group)).is_ok());
    }

    #[test]
    fn test_non_sender_never_deletes_direct_message(a in any::<u128>(), b in any::<u128>()) {
        prop_assume!(a != b);
        let (sender, actor) = (Uuid::from_u128(a), Uuid::from_u128(b));
        prop_assert_eq!(can_delete_message(&sender, &actor, None), Err(DenyReason::Forbidden));
    }
}
