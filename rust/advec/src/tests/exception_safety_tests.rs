use advec_testkit::{FaultPlan, Tracked, expect_panic};

use crate::{CloneElements, MoveElements, Relocate, Vector};

fn filled<R: Relocate<Tracked>>(values: &[i64]) -> Vector<Tracked, R> {
    values.iter().copied().map(Tracked::new).collect()
}

fn values<R>(v: &Vector<Tracked, R>) -> Vec<i64> {
    v.iter().map(Tracked::value).collect()
}

/// Observable state of a vector: length, capacity, storage address and values.
fn snapshot<R>(v: &Vector<Tracked, R>) -> (usize, usize, *const Tracked, Vec<i64>) {
    (v.len(), v.capacity(), v.as_ptr(), values(v))
}

#[test]
fn test_with_len_failure_destroys_constructed_prefix() {
    for k in 1..=5 {
        Tracked::reset_stats();
        let plan = FaultPlan::fail_default_at(k);
        let msg = expect_panic(|| Vector::<Tracked>::with_len(5));
        assert_eq!(msg, "injected Default failure");
        assert!(!plan.is_pending());
        let stats = Tracked::stats();
        assert_eq!(stats.constructed, k - 1);
        assert_eq!(stats.live(), 0);
    }
}

#[test]
fn test_clone_failure_leaves_source_intact() {
    let source = filled::<MoveElements>(&[1, 2, 3, 4]);
    Tracked::reset_stats();
    let _plan = FaultPlan::fail_clone_at(3);
    expect_panic(|| source.clone());
    assert_eq!(values(&source), vec![1, 2, 3, 4]);
    let stats = Tracked::stats();
    assert_eq!(stats.clones, 2);
    assert_eq!(stats.drops, 2);
}

#[test]
fn test_growth_failure_preserves_state() {
    for k in 1..=4 {
        let mut v = filled::<CloneElements>(&[1, 2, 3, 4]);
        assert_eq!(v.len(), v.capacity());
        let before = snapshot(&v);
        Tracked::reset_stats();

        let _plan = FaultPlan::fail_clone_at(k);
        expect_panic(|| {
            v.push(Tracked::new(99));
        });

        assert_eq!(snapshot(&v), before);
        let stats = Tracked::stats();
        // The pushed value and every clone made before the failure are gone.
        assert_eq!(stats.clones, k - 1);
        assert_eq!(stats.drops, k);
        assert_eq!(stats.live(), 0);
    }
}

#[test]
fn test_growth_failure_then_recovery() {
    let mut v = filled::<CloneElements>(&[1, 2]);
    {
        let _plan = FaultPlan::fail_clone_at(2);
        expect_panic(|| {
            v.push(Tracked::new(3));
        });
    }
    v.push(Tracked::new(3));
    assert_eq!(values(&v), vec![1, 2, 3]);
    assert_eq!(v.capacity(), 4);
}

#[test]
fn test_reserve_failure_preserves_state() {
    let mut v = filled::<CloneElements>(&[1, 2, 3]);
    let before = snapshot(&v);
    Tracked::reset_stats();
    let _plan = FaultPlan::fail_clone_at(2);
    expect_panic(|| v.reserve(64));
    assert_eq!(snapshot(&v), before);
    assert_eq!(Tracked::stats().live(), 0);
}

#[test]
fn test_insert_at_full_capacity_failure_preserves_state() {
    // Clones 1..=2 relocate the prefix, 3..=4 the suffix.
    for k in 1..=4 {
        let mut v = filled::<CloneElements>(&[1, 2, 3, 4]);
        let before = snapshot(&v);
        Tracked::reset_stats();

        let _plan = FaultPlan::fail_clone_at(k);
        expect_panic(|| {
            v.insert(2, Tracked::new(99));
        });

        assert_eq!(snapshot(&v), before);
        let stats = Tracked::stats();
        assert_eq!(stats.clones, k - 1);
        assert_eq!(stats.live(), 0);
    }
}

#[test]
fn test_insert_at_full_capacity_with_clone_relocation() {
    let mut v = filled::<CloneElements>(&[1, 2, 3, 4]);
    Tracked::reset_stats();
    v.insert(1, Tracked::new(10));
    assert_eq!(values(&v), vec![1, 10, 2, 3, 4]);
    let stats = Tracked::stats();
    assert_eq!(stats.clones, 4);
    assert_eq!(stats.drops, 4);
    assert_eq!(stats.live(), 1);
}

#[test]
fn test_move_relocation_never_clones() {
    let mut v = filled::<MoveElements>(&[1, 2, 3, 4]);
    Tracked::reset_stats();
    let _plan = FaultPlan::fail_clone_at(1);
    v.push(Tracked::new(5));
    v.insert(0, Tracked::new(0));
    v.reserve(100);
    assert_eq!(values(&v), vec![0, 1, 2, 3, 4, 5]);
    let stats = Tracked::stats();
    assert_eq!(stats.clones, 0);
    assert_eq!(stats.drops, 0);
}

#[test]
fn test_clone_relocation_clones_then_drops_originals() {
    let mut v = filled::<CloneElements>(&[1, 2, 3, 4]);
    Tracked::reset_stats();
    v.push(Tracked::new(5));
    let stats = Tracked::stats();
    assert_eq!(stats.clones, 4);
    assert_eq!(stats.drops, 4);
    assert_eq!(values(&v), vec![1, 2, 3, 4, 5]);
    assert_eq!(v.capacity(), 8);
}

#[test]
fn test_emplace_back_failure_before_growth_changes_nothing() {
    let mut v = filled::<MoveElements>(&[1, 2]);
    let before = snapshot(&v);
    expect_panic(|| {
        v.emplace_back(|| panic!("constructor failed"));
    });
    assert_eq!(snapshot(&v), before);

    let _plan = FaultPlan::fail_clone_at(1);
    let source = Tracked::new(7);
    expect_panic(|| {
        v.push_clone(&source);
    });
    assert_eq!(snapshot(&v), before);
}

#[test]
fn test_resize_failure_destroys_partial_tail() {
    let mut v = filled::<MoveElements>(&[1, 2]);
    v.reserve(10);
    let before = snapshot(&v);
    Tracked::reset_stats();
    let _plan = FaultPlan::fail_default_at(3);
    expect_panic(|| v.resize(6));
    assert_eq!(snapshot(&v), before);
    let stats = Tracked::stats();
    assert_eq!(stats.constructed, 2);
    assert_eq!(stats.live(), 0);
}

#[test]
fn test_clone_from_reallocating_path_is_strong() {
    let mut target = filled::<MoveElements>(&[1]);
    let source = filled::<MoveElements>(&[5, 6, 7]);
    let before = snapshot(&target);
    Tracked::reset_stats();
    let _plan = FaultPlan::fail_clone_at(2);
    expect_panic(|| target.clone_from(&source));
    assert_eq!(snapshot(&target), before);
    assert_eq!(Tracked::stats().live(), 0);
}

#[test]
fn test_push_growth_keeps_new_element_when_original_drop_panics() {
    Tracked::reset_stats();
    let mut v = filled::<CloneElements>(&[1]);
    assert_eq!(v.capacity(), 1);
    {
        let _plan = FaultPlan::fail_drop_at(1);
        let msg = expect_panic(|| {
            v.push(Tracked::new(2));
        });
        assert_eq!(msg, "injected Drop failure");
    }
    assert_eq!(values(&v), vec![1, 2]);
    assert_eq!(v.capacity(), 2);
    drop(v);
    assert_eq!(Tracked::stats().live(), 0);
}

#[test]
fn test_insert_growth_keeps_new_element_when_original_drop_panics() {
    Tracked::reset_stats();
    let mut v = filled::<CloneElements>(&[1, 2]);
    assert_eq!(v.len(), v.capacity());
    {
        let _plan = FaultPlan::fail_drop_at(1);
        expect_panic(|| {
            v.insert(0, Tracked::new(9));
        });
    }
    assert_eq!(values(&v), vec![9, 1, 2]);
    drop(v);
    // Both originals were dropped even though the first destructor panicked.
    assert_eq!(Tracked::stats().live(), 0);
}

/// Known weak spot: assigning into existing storage is not transactional.
#[test]
fn test_clone_from_reuse_path_keeps_partial_assignment() {
    let mut target = filled::<MoveElements>(&[1, 2, 3, 4]);
    let source = filled::<MoveElements>(&[9, 8, 7]);
    let (len, capacity, base, _) = snapshot(&target);
    let _plan = FaultPlan::fail_assign_at(2);
    expect_panic(|| target.clone_from(&source));
    assert_eq!(values(&target), vec![9, 2, 3, 4]);
    assert_eq!(target.len(), len);
    assert_eq!(target.capacity(), capacity);
    assert_eq!(target.as_ptr(), base);
}

#[test]
fn test_clone_from_reuse_path_tail_failure() {
    let mut target = filled::<MoveElements>(&[1, 2]);
    target.reserve(5);
    let source = filled::<MoveElements>(&[9, 8, 7, 6, 5]);
    Tracked::reset_stats();
    let _plan = FaultPlan::fail_clone_at(2);
    expect_panic(|| target.clone_from(&source));
    // The prefix was assigned, the one clone made for the tail was dropped.
    assert_eq!(values(&target), vec![9, 8]);
    let stats = Tracked::stats();
    assert_eq!(stats.assigns, 2);
    assert_eq!(stats.clones, 1);
    assert_eq!(stats.drops, 1);
}
