/// Tests for change pool acquisition, idempotence, capacity degradation,
/// and the O(1) bulk reset

use netstate_shared::{
    ChangeBinding, ChangePool, MarkOutcome, CHANGE_POOL_CAPACITY, CHANGE_RECORD_CAPACITY,
};

#[test]
fn first_mark_acquires_a_record() {
    let mut pool = ChangePool::new();
    let mut binding = ChangeBinding::unbound();

    assert_eq!(pool.mark(&mut binding, 4), MarkOutcome::Recorded);
    assert!(binding.is_bound_to(&pool));
    assert_eq!(pool.records_in_use(), 1);
    assert_eq!(pool.record(&binding).unwrap().offsets(), &[4]);
}

#[test]
fn marking_the_same_field_twice_is_idempotent() {
    let mut pool = ChangePool::new();
    let mut binding = ChangeBinding::unbound();

    assert_eq!(pool.mark(&mut binding, 7), MarkOutcome::Recorded);
    assert_eq!(pool.mark(&mut binding, 7), MarkOutcome::AlreadyRecorded);
    assert_eq!(pool.record(&binding).unwrap().offsets(), &[7]);
}

#[test]
fn offsets_keep_discovery_order() {
    let mut pool = ChangePool::new();
    let mut binding = ChangeBinding::unbound();

    for field in [9, 2, 5] {
        pool.mark(&mut binding, field);
    }
    assert_eq!(pool.record(&binding).unwrap().offsets(), &[9, 2, 5]);
}

#[test]
fn record_overflow_invalidates_the_binding() {
    let mut pool = ChangePool::new();
    let mut binding = ChangeBinding::unbound();

    for field in 0..CHANGE_RECORD_CAPACITY as u16 {
        assert_eq!(pool.mark(&mut binding, field), MarkOutcome::Recorded);
    }

    assert_eq!(
        pool.mark(&mut binding, CHANGE_RECORD_CAPACITY as u16),
        MarkOutcome::RecordOverflow
    );
    assert!(!binding.is_bound_to(&pool));
    assert!(pool.record(&binding).is_none());
}

#[test]
fn exhausted_pool_degrades_instead_of_failing() {
    let mut pool = ChangePool::new();

    let mut bindings = vec![ChangeBinding::unbound(); CHANGE_POOL_CAPACITY];
    for binding in &mut bindings {
        assert_eq!(pool.mark(binding, 0), MarkOutcome::Recorded);
    }
    assert_eq!(pool.records_in_use(), CHANGE_POOL_CAPACITY);

    let mut late = ChangeBinding::unbound();
    assert_eq!(pool.mark(&mut late, 0), MarkOutcome::PoolExhausted);
    assert!(!late.is_bound_to(&pool));
}

#[test]
fn reset_invalidates_every_binding_at_once() {
    let mut pool = ChangePool::new();

    let mut first = ChangeBinding::unbound();
    let mut second = ChangeBinding::unbound();
    pool.mark(&mut first, 1);
    pool.mark(&mut second, 2);

    pool.reset();

    assert!(!first.is_bound_to(&pool));
    assert!(!second.is_bound_to(&pool));
    assert!(pool.record(&first).is_none());
    assert_eq!(pool.records_in_use(), 0);

    // a stale binding acquires fresh storage rather than reusing old data
    assert_eq!(pool.mark(&mut first, 8), MarkOutcome::Recorded);
    assert_eq!(pool.record(&first).unwrap().offsets(), &[8]);
    assert_eq!(pool.records_in_use(), 1);
}
