use crate::mock::MockBoard;
use crate::{
    IntervalTimer, Registry, Scale, SitConfig, SitError, Slot, SlotRequest, Status, NUM_SLOTS,
};
use itimer_hal::{ClockDivision, CountMode, IrqPriority, TimeBase};

fn noop() {}

#[test]
fn begin_programs_peripheral_and_routes_interrupt() {
    let registry = Registry::new();
    let board = MockBoard::new();
    let mut timer = IntervalTimer::with_registry(board.clone(), &registry);

    let slot = timer
        .begin(noop, 1000, Scale::Micros, SlotRequest::Auto)
        .unwrap();
    assert_eq!(slot, Slot::ALL[0]);
    assert_eq!(timer.status(), Status::Running(slot));

    let state = board.timer_state(slot);
    assert_eq!(state.time_base, Some(TimeBase::new(71, 1000)));
    let time_base = state.time_base.unwrap();
    assert_eq!(time_base.count_mode, CountMode::Up);
    assert_eq!(time_base.clock_division, ClockDivision::Div1);
    assert_eq!(time_base.repetition_counter, 0);
    assert!(state.counting);
    assert!(state.update_interrupt);
    assert!(!state.pending, "initialisation update must be cleared");

    assert!(board.clock_enabled(slot));
    assert_eq!(board.irq_priority(slot), Some(IrqPriority::new(0, 1)));
    assert!(registry.is_in_use(slot));
    assert!(registry.is_bound(slot));
}

#[test]
fn coarse_scale_uses_half_millisecond_prescaler() {
    let registry = Registry::new();
    let board = MockBoard::new();
    let mut timer = IntervalTimer::with_registry(board.clone(), &registry);

    let slot = timer
        .begin(noop, 500, Scale::HalfMillis, Slot::ALL[2])
        .unwrap();
    assert_eq!(slot, Slot::ALL[2]);
    assert_eq!(board.timer_state(slot).prescaler, 35_999);
    assert_eq!(board.timer_state(slot).reload, 500);
    assert_eq!(timer.interval().unwrap().as_micros(), 250_000);
}

#[test]
fn board_config_drives_prescaler_and_priority() {
    let config = SitConfig::builder()
        .timer_clock_hz(48_000_000)
        .priority(2, 3)
        .build();
    let registry = Registry::new();
    let board = MockBoard::with_config(config);
    let mut timer = IntervalTimer::with_registry(board.clone(), &registry);

    let slot = timer.begin(noop, 10, Scale::Micros, SlotRequest::Auto).unwrap();
    assert_eq!(board.timer_state(slot).prescaler, 47);
    assert_eq!(board.irq_priority(slot), Some(IrqPriority::new(2, 3)));
}

#[test]
fn end_tears_down_everything() {
    let registry = Registry::new();
    let board = MockBoard::new();
    let mut timer = IntervalTimer::with_registry(board.clone(), &registry);
    let slot = timer.begin(noop, 100, Scale::Micros, SlotRequest::Auto).unwrap();

    timer.end();

    assert_eq!(timer.status(), Status::Off);
    assert_eq!(timer.is_allocated(), None);
    let state = board.timer_state(slot);
    assert!(!state.counting);
    assert!(!state.pending);
    assert_eq!(state.resets, 1);
    assert!(!board.irq_enabled(slot));
    assert!(!registry.is_in_use(slot));
    assert!(!registry.is_bound(slot));
}

#[test]
fn end_is_idempotent() {
    let registry = Registry::new();
    let board = MockBoard::new();
    let mut timer = IntervalTimer::with_registry(board.clone(), &registry);
    let slot = timer.begin(noop, 100, Scale::Micros, SlotRequest::Auto).unwrap();

    timer.end();
    let once = (board.timer_state(slot), board.interrupt_log(), registry.stats());
    timer.end();
    let twice = (board.timer_state(slot), board.interrupt_log(), registry.stats());

    assert_eq!(once, twice);
    assert_eq!(timer.status(), Status::Off);
}

#[test]
fn auto_allocation_is_deterministic() {
    let registry = Registry::new();
    let board = MockBoard::new();
    let mut handles: Vec<_> = (0..=NUM_SLOTS)
        .map(|_| IntervalTimer::with_registry(board.clone(), &registry))
        .collect();

    for (i, handle) in handles.iter_mut().take(NUM_SLOTS).enumerate() {
        assert_eq!(
            handle.begin(noop, 50, Scale::Micros, SlotRequest::Auto),
            Ok(Slot::ALL[i])
        );
    }

    let last = &mut handles[NUM_SLOTS];
    assert_eq!(
        last.begin(noop, 50, Scale::Micros, SlotRequest::Auto),
        Err(SitError::ResourceExhausted)
    );
    assert_eq!(last.status(), Status::Off);
    assert!(registry.stats().is_exhausted());
}

#[test]
fn specific_slot_conflict_leaves_second_handle_off() {
    let registry = Registry::new();
    let board = MockBoard::new();
    let mut a = IntervalTimer::with_registry(board.clone(), &registry);
    let mut b = IntervalTimer::with_registry(board.clone(), &registry);

    assert_eq!(a.begin(noop, 10, Scale::Micros, Slot::ALL[1]), Ok(Slot::ALL[1]));
    assert_eq!(
        b.begin(noop, 10, Scale::Micros, Slot::ALL[1]),
        Err(SitError::ResourceExhausted)
    );
    assert_eq!(b.status(), Status::Off);
    assert_eq!(a.is_allocated(), Some(Slot::ALL[1]));
    assert_eq!(registry.in_use_slots().as_slice(), &[Slot::ALL[1]]);
}

#[test]
fn running_handles_never_share_a_slot() {
    let registry = Registry::new();
    let board = MockBoard::new();
    let mut handles: Vec<_> = (0..5)
        .map(|_| IntervalTimer::with_registry(board.clone(), &registry))
        .collect();

    // (handle, request) pairs; None = end
    let script: [(usize, Option<SlotRequest>); 12] = [
        (0, Some(SlotRequest::Auto)),
        (1, Some(SlotRequest::Specific(Slot::ALL[2]))),
        (2, Some(SlotRequest::Auto)),
        (3, Some(SlotRequest::Auto)),
        (0, None),
        (3, Some(SlotRequest::Specific(Slot::ALL[0]))),
        (4, Some(SlotRequest::Specific(Slot::ALL[0]))),
        (1, Some(SlotRequest::Auto)),
        (2, None),
        (4, Some(SlotRequest::Auto)),
        (1, None),
        (0, Some(SlotRequest::Auto)),
    ];

    for (idx, request) in script {
        match request {
            Some(request) => {
                let _ = handles[idx].begin(noop, 20, Scale::Micros, request);
            }
            None => handles[idx].end(),
        }

        let mut owned: Vec<Slot> = handles.iter().filter_map(|h| h.is_allocated()).collect();
        let running = owned.len();
        owned.sort();
        owned.dedup();
        assert_eq!(owned.len(), running, "two handles own the same slot");
        assert!(running <= NUM_SLOTS);
        assert_eq!(registry.stats().used_slots, running);
        assert_eq!(registry.in_use_slots().as_slice(), owned.as_slice());
    }
}

#[test]
fn released_slot_is_claimable_again() {
    let registry = Registry::new();
    let board = MockBoard::new();
    let mut a = IntervalTimer::with_registry(board.clone(), &registry);
    let mut b = IntervalTimer::with_registry(board.clone(), &registry);

    let slot = a.begin(noop, 10, Scale::Micros, Slot::ALL[0]).unwrap();
    a.end();
    assert_eq!(b.begin(noop, 10, Scale::Micros, slot), Ok(slot));
}

#[test]
fn rearm_releases_previous_slot_first() {
    let registry = Registry::new();
    let board = MockBoard::new();
    let mut timer = IntervalTimer::with_registry(board.clone(), &registry);

    let first = timer.begin(noop, 10, Scale::Micros, SlotRequest::Auto).unwrap();
    // auto re-arm lands on the slot it just freed
    assert_eq!(timer.begin(noop, 20, Scale::Micros, SlotRequest::Auto), Ok(first));
    assert_eq!(registry.stats().used_slots, 1);
    assert_eq!(board.timer_state(first).resets, 1);
    assert_eq!(board.timer_state(first).reload, 20);

    let moved = timer.begin(noop, 30, Scale::Micros, Slot::ALL[2]).unwrap();
    assert_eq!(moved, Slot::ALL[2]);
    assert!(!registry.is_in_use(first));
    assert!(!board.irq_enabled(first));
    assert_eq!(registry.stats().used_slots, 1);
}

#[test]
fn failed_rearm_leaves_handle_off_without_leak() {
    let registry = Registry::new();
    let board = MockBoard::new();
    let mut timer = IntervalTimer::with_registry(board.clone(), &registry);
    let mut holder = IntervalTimer::with_registry(board.clone(), &registry);

    let own = timer.begin(noop, 10, Scale::Micros, Slot::ALL[0]).unwrap();
    holder.begin(noop, 10, Scale::Micros, Slot::ALL[1]).unwrap();

    assert_eq!(
        timer.begin(noop, 10, Scale::Micros, Slot::ALL[1]),
        Err(SitError::ResourceExhausted)
    );
    assert_eq!(timer.status(), Status::Off);
    assert!(!registry.is_in_use(own));
    assert_eq!(registry.stats().used_slots, 1);
}

#[test]
fn drop_releases_running_slot() {
    let registry = Registry::new();
    let board = MockBoard::new();
    let slot = {
        let mut timer = IntervalTimer::with_registry(board.clone(), &registry);
        timer.begin(noop, 10, Scale::Micros, SlotRequest::Auto).unwrap()
    };

    assert!(!registry.is_in_use(slot));
    assert!(!registry.is_bound(slot));
    assert!(!board.irq_enabled(slot));
    assert!(!board.timer_state(slot).counting);
}

#[test]
fn process_wide_registry_is_used_by_default() {
    // process-wide registry; slot 2 is not used by any other global test
    let board = MockBoard::new();
    let mut timer = IntervalTimer::new(board.clone());
    let slot = timer.begin(noop, 10, Scale::Micros, Slot::ALL[2]).unwrap();
    assert!(crate::registry().is_in_use(slot));

    drop(timer);
    assert!(!crate::registry().is_in_use(slot));
}
