use std::collections::HashSet;

use anicompare::identity::extract_code;
use anicompare::pair::PairKey;

#[test]
fn normalization_is_commutative() {
    let codes: Vec<_> = ["GCA_000009765", "GCF_000203835", "GCA_000009765", "GCA_00001_x"]
        .iter()
        .map(|f| extract_code(f).expect("code"))
        .collect();
    for a in &codes {
        for b in &codes {
            assert_eq!(PairKey::new(a.clone(), b.clone()), PairKey::new(b.clone(), a.clone()));
        }
    }
}

#[test]
fn key_is_sorted() {
    let a = extract_code("GCF_000203835").unwrap();
    let b = extract_code("GCA_000009765").unwrap();
    let key = PairKey::new(a.clone(), b.clone());
    assert_eq!(key.first(), &b);
    assert_eq!(key.second(), &a);
    assert!(key.contains(&a) && key.contains(&b));
    assert_eq!(key.to_string(), "(GCA_000009765, GCF_000203835)");
}

#[test]
fn reversed_pairs_hash_together() {
    let a = extract_code("GCA_00001_x").unwrap();
    let b = extract_code("GCA_00002_y").unwrap();
    let mut set = HashSet::new();
    set.insert(PairKey::new(a.clone(), b.clone()));
    set.insert(PairKey::new(b, a));
    assert_eq!(set.len(), 1);
}
