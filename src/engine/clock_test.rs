use super::*;

#[test]
fn tick_should_increment_by_one() {
    let mut clock = LamportClock::default();
    assert_eq!(clock.tick(), 1);
    assert_eq!(clock.tick(), 2);
    assert_eq!(clock.current(), 2);
}

#[test]
fn merge_should_jump_past_a_remote_clock_ahead_of_us() {
    let mut clock = LamportClock::new(3);
    assert_eq!(clock.merge(10), 11);
}

#[test]
fn merge_should_jump_past_an_equal_remote_clock() {
    let mut clock = LamportClock::new(7);
    assert_eq!(clock.merge(7), 8);
}

#[test]
fn merge_should_increment_when_remote_is_behind() {
    let mut clock = LamportClock::new(9);
    assert_eq!(clock.merge(2), 10);
}

#[test]
fn merge_result_exceeds_both_inputs() {
    for local in -3..6 {
        for remote in -3..6 {
            let mut clock = LamportClock::new(local);
            let merged = clock.merge(remote);
            assert!(merged > local, "local={local} remote={remote} merged={merged}");
            assert!(merged > remote, "local={local} remote={remote} merged={merged}");
            assert_eq!(merged, local.max(remote) + 1);
        }
    }
}

#[test]
fn observe_should_correct_stale_clock() {
    let mut clock = LamportClock::new(5);
    assert_eq!(clock.observe(0), 6);
    assert_eq!(clock.current(), 6);
}

#[test]
fn observe_should_adopt_clock_strictly_ahead() {
    let mut clock = LamportClock::new(5);
    assert_eq!(clock.observe(42), 42);
    assert_eq!(clock.current(), 42);
}

#[test]
fn observe_same_clock_twice_yields_distinct_values() {
    let mut clock = LamportClock::new(0);
    let first = clock.observe(4);
    let second = clock.observe(4);
    assert_eq!(first, 4);
    assert_eq!(second, 5);
}

#[test]
fn clock_never_decreases() {
    let mut clock = LamportClock::default();
    let mut last = clock.current();
    for remote in [5, -10, 3, 100, 0, 99, 101, -1] {
        let next = if remote % 2 == 0 {
            clock.observe(remote)
        } else {
            clock.merge(remote)
        };
        assert!(next > last);
        last = next;
    }
}

#[test]
fn clock_saturates_at_max() {
    let mut clock = LamportClock::new(ClockValue::MAX);
    assert_eq!(clock.tick(), ClockValue::MAX);
    assert_eq!(clock.merge(ClockValue::MAX), ClockValue::MAX);
}
