// Set integration tests through the public API.
//
// Properties exercised:
// - Deduplication when building from repetitive input.
// - Copying operators against hand-computed results.
// - In-place operators agree with their copying counterparts.
// - Equality is by member set, not by identity or table layout.
use opendict::Set;
use std::collections::BTreeSet;

fn set_of(s: &str) -> Set<char> {
    let mut out = Set::new();
    for c in s.chars() {
        out.add_owned(c).unwrap();
    }
    out
}

fn members(s: &Set<char>) -> String {
    s.iter().copied().collect::<BTreeSet<char>>().into_iter().collect()
}

// Scenario: "abracadabra" dedups to five letters and its union with
// "alacazam" has eight.
#[test]
fn abracadabra_union() {
    let a = set_of("abracadabra");
    assert_eq!(a.len(), 5);
    assert_eq!(members(&a), "abcdr");

    let b = set_of("alacazam");
    assert_eq!(members(&b), "aclmz");

    let u = a.union(&b).unwrap();
    assert_eq!(u.len(), 8);
    assert_eq!(members(&u), "abcdlmrz");
}

#[test]
fn copying_operators() {
    let a = set_of("abracadabra");
    let b = set_of("alacazam");
    assert_eq!(members(&a.intersection(&b).unwrap()), "ac");
    assert_eq!(members(&a.difference(&b).unwrap()), "bdr");
    assert_eq!(members(&b.difference(&a).unwrap()), "lmz");
    assert_eq!(members(&a.symmetric_difference(&b).unwrap()), "bdlmrz");
    // Operands are untouched.
    assert_eq!(members(&a), "abcdr");
    assert_eq!(members(&b), "aclmz");
}

#[test]
fn in_place_matches_copying() {
    let a = set_of("the quick brown fox");
    let b = set_of("jumps over the lazy dog");

    let mut x = a.copy().unwrap();
    x.union_with(&b).unwrap();
    assert_eq!(x, a.union(&b).unwrap());

    let mut x = a.copy().unwrap();
    x.intersect_with(&b);
    assert_eq!(x, a.intersection(&b).unwrap());

    let mut x = a.copy().unwrap();
    x.difference_with(&b);
    assert_eq!(x, a.difference(&b).unwrap());

    let mut x = a.copy().unwrap();
    x.symmetric_difference_with(&b).unwrap();
    assert_eq!(x, a.symmetric_difference(&b).unwrap());
}

// A set combined with itself: union and intersection keep it, difference
// and symmetric difference empty it.
#[test]
fn same_operand_twice() {
    let a = set_of("hello");
    assert_eq!(a.union(&a).unwrap(), a);
    assert_eq!(a.intersection(&a).unwrap(), a);
    assert!(a.difference(&a).unwrap().is_empty());
    assert!(a.symmetric_difference(&a).unwrap().is_empty());
}

#[test]
fn subset_superset_and_equality() {
    let small = set_of("ab");
    let big = set_of("abc");
    assert!(small.is_subset(&big));
    assert!(big.is_superset(&small));
    assert!(!small.is_superset(&big));
    assert_ne!(small, big);

    // Equal member sets built in different orders and through deletions.
    let mut churned = set_of("abcdefgh");
    for c in "defgh".chars() {
        churned.delete(&c);
    }
    assert_eq!(churned, set_of("cba"));
    assert!(churned.is_subset(&big) && big.is_subset(&churned));
}

#[test]
fn string_members_with_borrowed_lookup() {
    let mut s: Set<String> = Set::new();
    assert!(s.add("alpha").unwrap());
    assert!(!s.add("alpha").unwrap());
    s.add_from(["beta", "gamma", "beta"]).unwrap();
    assert_eq!(s.len(), 3);
    assert!(s.contains("gamma"));
    assert!(s.discard("beta"));
    assert!(!s.discard("beta"));
    assert_eq!(s.take("alpha"), Some("alpha".to_string()));
    assert_eq!(s.len(), 1);
}

#[test]
fn grows_and_clears() {
    let mut s: Set<u32> = Set::with_capacity(4).unwrap();
    for i in 0..10_000 {
        s.add_owned(i).unwrap();
    }
    assert_eq!(s.len(), 10_000);
    assert!((0..10_000).all(|i| s.contains(&i)));
    s.clear();
    s.clear();
    assert!(s.is_empty());
    assert_eq!(s.capacity(), 8);
}

#[test]
fn debug_lists_members() {
    let s = set_of("z");
    assert_eq!(format!("{s:?}"), "{'z'}");
}

// The member cursor replays the same walk after a restart.
#[test]
fn cursor_restart() {
    let mut s = set_of("abracadabra");
    s.delete(&'c');
    let mut it = s.iter();
    assert_eq!(it.len(), 4);
    let first: Vec<char> = it.by_ref().copied().collect();
    assert_eq!(it.next(), None);
    it.restart();
    let second: Vec<char> = it.copied().collect();
    assert_eq!(first, second);
    assert_eq!(first.iter().collect::<BTreeSet<_>>().len(), 4);
}
