use super::*;

#[test]
fn test_enter_and_leave() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::new(10, 100);
    assert!(guard.enter(1).is_entered());
    assert!(guard.is_active(&1));
    assert_eq!(guard.depth(), 1);
    guard.leave(1);
    assert!(!guard.is_active(&1));
    assert_eq!(guard.depth(), 0);
}

#[test]
fn test_reentering_active_key_is_cycle() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::new(10, 100);
    assert!(guard.enter(7).is_entered());
    let again = guard.enter(7);
    assert!(again.is_cycle(), "got {again:?}");
    assert_eq!(guard.depth(), 1, "a cycle does not deepen");
    assert!(!guard.is_exceeded(), "a cycle is not a limit");
    guard.leave(7);
}

#[test]
fn test_depth_limit_is_sticky() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::new(2, 100);
    assert!(guard.enter(1).is_entered());
    assert!(guard.enter(2).is_entered());
    assert_eq!(guard.enter(3), RecursionResult::DepthExceeded);
    guard.leave(2);
    guard.leave(1);
    assert!(guard.is_exceeded(), "exceeded stays set after unwinding");
    assert!(guard.enter(3).is_entered(), "the path is short again");
    guard.leave(3);
}

#[test]
fn test_step_limit_counts_every_enter() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::new(10, 3);
    for key in 0..3 {
        assert!(guard.enter(key).is_entered());
        guard.leave(key);
    }
    assert_eq!(guard.steps(), 3);
    let result = guard.enter(99);
    assert_eq!(result, RecursionResult::IterationExceeded);
    assert!(result.is_exceeded());
    assert!(guard.is_exceeded());
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "active entries")]
fn test_drop_with_active_entries_panics_in_debug() {
    let mut guard: RecursionGuard<u32> = RecursionGuard::new(10, 100);
    let _ = guard.enter(1);
    drop(guard);
}
