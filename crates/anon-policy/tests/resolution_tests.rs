//! Masking policy resolution against a label store.

use anon_core::{ObjectRef, PolicyList, PolicyName, Principal, RoleId};
use anon_policy::{InMemoryLabelStore, LabelStore, PolicyRegistry, PolicyResolver, SecurityLabelCommand};

const BATMAN: RoleId = RoleId(16390);
const BRUCE: RoleId = RoleId(16391);

fn policy(name: &str) -> PolicyName {
    PolicyName::new(name).unwrap()
}

fn policies(raw: &str) -> PolicyList {
    PolicyList::parse(raw).policies
}

#[test]
fn empty_policy_list_resolves_to_nothing() {
    let store = InMemoryLabelStore::new();
    let resolver = PolicyResolver::new(&store);
    assert_eq!(resolver.resolve(BATMAN, &PolicyList::default()), None);
    assert_eq!(resolver.resolve(BATMAN, &policies("")), None);
}

#[test]
fn unlabelled_role_gets_first_policy() {
    let store = InMemoryLabelStore::new();
    store.put_label(&ObjectRef::role(BATMAN.0), &policy("p2"), Some("MASKED"));

    let resolver = PolicyResolver::new(&store);
    assert_eq!(resolver.resolve(BATMAN, &policies("p1,p2")), Some(policy("p1")));
}

#[test]
fn exempt_role_falls_through_to_next_policy() {
    let store = InMemoryLabelStore::new();
    store.put_label(&ObjectRef::role(BATMAN.0), &policy("p1"), Some("MASKED"));

    let resolver = PolicyResolver::new(&store);
    assert_eq!(resolver.resolve(BATMAN, &policies("p1,p2")), Some(policy("p2")));
}

#[test]
fn role_exempt_everywhere_is_not_masked() {
    let store = InMemoryLabelStore::new();
    for name in ["p1", "p2"] {
        store.put_label(&ObjectRef::role(BATMAN.0), &policy(name), Some("MASKED"));
    }

    let resolver = PolicyResolver::new(&store);
    assert_eq!(resolver.resolve(BATMAN, &policies("p1,p2")), None);
    // labels on another role change nothing for this one
    assert_eq!(resolver.resolve(BRUCE, &policies("p1,p2")), Some(policy("p1")));
}

#[test]
fn policy_names_are_matched_exactly() {
    let store = InMemoryLabelStore::new();
    store.put_label(&ObjectRef::role(BATMAN.0), &policy("p1"), Some("MASKED"));
    store.put_label(&ObjectRef::role(BATMAN.0), &policy("p2"), Some("MASKED"));

    let resolver = PolicyResolver::new(&store);
    // " p2" is not "p2": the label under "p2" does not exempt the role
    assert_eq!(
        resolver.resolve(BATMAN, &policies("p1, p2")),
        Some(policy(" p2"))
    );
}

#[test]
fn labels_written_through_commands_drive_resolution() {
    let mut registry = PolicyRegistry::default();
    let list = registry.apply_config("anon,gdpr");
    let store = InMemoryLabelStore::new();
    let admin = Principal::superuser(RoleId(10));

    // grammar accepts any case, the resolver only honours the exact marker
    SecurityLabelCommand::new(policy("anon"), ObjectRef::role(BATMAN.0), Some("masked"))
        .execute(&registry, &store, &admin)
        .unwrap();
    SecurityLabelCommand::new(policy("gdpr"), ObjectRef::role(BRUCE.0), Some("MASKED"))
        .execute(&registry, &store, &admin)
        .unwrap();

    let resolver = PolicyResolver::new(&store);
    assert_eq!(resolver.resolve(BATMAN, &list), Some(policy("anon")));
    assert_eq!(resolver.resolve(BRUCE, &list), Some(policy("anon")));

    SecurityLabelCommand::new(policy("anon"), ObjectRef::role(BRUCE.0), Some("MASKED"))
        .execute(&registry, &store, &admin)
        .unwrap();
    assert_eq!(resolver.resolve(BRUCE, &list), None);
}
