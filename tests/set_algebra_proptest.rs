// Set algebra property tests.
//
// Property 1: |A ∪ B| + |A ∩ B| == |A| + |B|.
// Property 2: A ∆ B == (A ∪ B) - (A ∩ B), and equals the in-place XOR.
// Property 3: A ⊆ B && B ⊆ A  <=>  A == B, with A and B built
//             independently so equality never relies on identity.
// Property 4: every copying operator agrees with BTreeSet.
use opendict::Set;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn build(items: &[u8]) -> Set<u8> {
    let mut s = Set::new();
    for &i in items {
        s.add_owned(i).unwrap();
    }
    s
}

fn model(s: &Set<u8>) -> BTreeSet<u8> {
    s.iter().copied().collect()
}

fn arb_items() -> impl Strategy<Value = Vec<u8>> {
    // Narrow value range so operands overlap often.
    proptest::collection::vec(0u8..48, 0..64)
}

proptest! {
    #[test]
    fn prop_inclusion_exclusion(a in arb_items(), b in arb_items()) {
        let (a, b) = (build(&a), build(&b));
        let u = a.union(&b).unwrap();
        let i = a.intersection(&b).unwrap();
        prop_assert_eq!(u.len() + i.len(), a.len() + b.len());
    }

    #[test]
    fn prop_symmetric_difference_identity(a in arb_items(), b in arb_items()) {
        let (a, b) = (build(&a), build(&b));
        let x = a.symmetric_difference(&b).unwrap();
        let via = a
            .union(&b)
            .unwrap()
            .difference(&a.intersection(&b).unwrap())
            .unwrap();
        prop_assert_eq!(&x, &via);

        let mut in_place = a.copy().unwrap();
        in_place.symmetric_difference_with(&b).unwrap();
        prop_assert_eq!(&in_place, &x);
    }

    #[test]
    fn prop_mutual_subset_iff_equal(a in arb_items(), b in arb_items(), same in any::<bool>()) {
        let a_set = build(&a);
        // Same members in reverse insertion order, or an unrelated set.
        let b_set = if same {
            let mut rev = a.clone();
            rev.reverse();
            build(&rev)
        } else {
            build(&b)
        };
        let mutual = a_set.is_subset(&b_set) && b_set.is_subset(&a_set);
        prop_assert_eq!(mutual, a_set == b_set);
        prop_assert_eq!(a_set == b_set, model(&a_set) == model(&b_set));
    }

    #[test]
    fn prop_operators_match_btreeset(a in arb_items(), b in arb_items()) {
        let (sa, sb) = (build(&a), build(&b));
        let (ma, mb) = (model(&sa), model(&sb));
        prop_assert_eq!(model(&sa.union(&sb).unwrap()), &ma | &mb);
        prop_assert_eq!(model(&sa.intersection(&sb).unwrap()), &ma & &mb);
        prop_assert_eq!(model(&sa.difference(&sb).unwrap()), &ma - &mb);
        prop_assert_eq!(model(&sa.symmetric_difference(&sb).unwrap()), &ma ^ &mb);
        prop_assert_eq!(sa.is_subset(&sb), ma.is_subset(&mb));
        prop_assert_eq!(sa.is_superset(&sb), ma.is_superset(&mb));

        let mut x = sa.copy().unwrap();
        x.intersect_with(&sb);
        prop_assert_eq!(model(&x), &ma & &mb);
        let mut x = sa.copy().unwrap();
        x.difference_with(&sb);
        prop_assert_eq!(model(&x), &ma - &mb);
        let mut x = sa.copy().unwrap();
        x.update(&sb).unwrap();
        prop_assert_eq!(model(&x), &ma | &mb);
    }
}
