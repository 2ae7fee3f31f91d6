use crate::fixtures::rng;
use veil_core::{Error, NamePool};

#[test]
fn test_from_words_filters_short_and_invalid_tokens() {
    let pool = NamePool::from_words(["ab", "torch", "lemma", "has space", "x"]);
    assert_eq!(pool.remaining(), 2);
}

#[test]
fn test_take_never_repeats_a_name() {
    let mut pool = NamePool::from_words(["alpha", "bravo", "charlie"]);
    let mut rng = rng(7);

    let mut seen = Vec::new();
    for _ in 0..3 {
        let name = pool.take(&mut rng).expect("pool has names");
        assert!(!seen.contains(&name), "name {name} handed out twice");
        seen.push(name);
    }
    assert_eq!(pool.remaining(), 0);
    assert_eq!(pool.drawn(), 3);
}

#[test]
fn test_exhaustion_is_a_typed_error() {
    let mut pool = NamePool::synthetic(1);
    let mut rng = rng(7);

    pool.take(&mut rng).expect("first draw succeeds");
    match pool.take(&mut rng) {
        Err(Error::NamePoolExhausted(drawn)) => assert_eq!(drawn, 1),
        other => panic!("expected exhaustion error, got {other:?}"),
    }
}

#[test]
fn test_synthetic_names_are_identifiers() {
    let mut pool = NamePool::synthetic(16);
    let mut rng = rng(3);
    let name = pool.take(&mut rng).expect("pool has names");
    assert!(name.starts_with("vn_"));
}
