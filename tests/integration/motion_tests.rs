//! Motion controller and homing coordinator against `FakeBoard`.

use crate::mock_hw::{FakeBoard, IoCall, NoDelay};

use resinprint::app::ports::{PinMode, PinState};
use resinprint::axis::Axis;
use resinprint::config::{AxisConfig, MotionTuning};
use resinprint::drivers::limit::Limit;
use resinprint::error::{IoError, MotionError};
use resinprint::motion::{MotionController, MotionRequest, StepsCompleted, StopToken};

const TRAVEL: i64 = 16_000;

fn rig(position: i64) -> (Axis<FakeBoard>, MotionController<NoDelay>) {
    rig_with(position, MotionTuning::default(), StopToken::new())
}

fn rig_with(
    position: i64,
    tuning: MotionTuning,
    stop: StopToken,
) -> (Axis<FakeBoard>, MotionController<NoDelay>) {
    let cfg = AxisConfig::default();
    let axis = Axis::connect(FakeBoard::new(cfg, position, TRAVEL), cfg).unwrap();
    (axis, MotionController::new(NoDelay, tuning, stop))
}

fn board(axis: &Axis<FakeBoard>) -> &FakeBoard {
    axis.io()
}

// ── connect ──────────────────────────────────────────────────

#[test]
fn connect_configures_every_pin_and_drives_uv_low() {
    let (axis, _) = rig(100);
    let cfg = AxisConfig::default();
    let calls = &board(&axis).calls;
    assert!(calls.contains(&IoCall::Configure(cfg.pin_step, PinMode::Output)));
    assert!(calls.contains(&IoCall::Configure(cfg.pin_dir, PinMode::Output)));
    assert!(calls.contains(&IoCall::Configure(cfg.pin_uv, PinMode::Output)));
    assert!(calls.contains(&IoCall::Configure(cfg.pin_home, PinMode::InputPullup)));
    assert!(calls.contains(&IoCall::Configure(cfg.pin_end, PinMode::InputPullup)));
    assert_eq!(board(&axis).writes_to(cfg.pin_uv), [PinState::Low]);
}

#[test]
fn connect_rejects_invalid_wiring() {
    let mut cfg = AxisConfig::default();
    cfg.pin_end = cfg.pin_home;
    let result = Axis::connect(FakeBoard::new(cfg, 0, TRAVEL), cfg);
    assert!(result.is_err());
}

// ── move_axis ────────────────────────────────────────────────

#[test]
fn one_millimetre_up_is_80_pulses_with_direction_set_once() {
    let (mut axis, mut motion) = rig(100);
    let done = motion.move_axis(&mut axis, MotionRequest::new(1.0)).unwrap();

    assert_eq!(
        done,
        StepsCompleted {
            steps: 80,
            requested: 80,
            stopped_at: None
        }
    );
    assert_eq!(board(&axis).pulses_up, 80);
    assert_eq!(board(&axis).dir_writes(), [PinState::High]);
    assert_eq!(board(&axis).position, 180);
}

#[test]
fn negative_distance_moves_down() {
    let (mut axis, mut motion) = rig(100);
    let done = motion.move_axis(&mut axis, MotionRequest::new(-0.5)).unwrap();
    assert_eq!(done.steps, 40);
    assert_eq!(board(&axis).pulses_down, 40);
    assert_eq!(board(&axis).dir_writes(), [PinState::Low]);
}

#[test]
fn zero_distance_touches_no_pins() {
    let (mut axis, mut motion) = rig(100);
    let before = board(&axis).calls.len();
    let done = motion.move_axis(&mut axis, MotionRequest::new(0.0)).unwrap();
    assert_eq!(done.steps, 0);
    assert!(done.is_complete());
    assert_eq!(board(&axis).calls.len(), before);
}

#[test]
fn non_finite_distance_is_rejected() {
    let (mut axis, mut motion) = rig(100);
    let before = board(&axis).calls.len();
    for d in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert_eq!(
            motion.move_axis(&mut axis, MotionRequest::new(d)),
            Err(MotionError::InvalidDistance)
        );
    }
    assert_eq!(board(&axis).calls.len(), before);
}

#[test]
fn blocked_move_writes_nothing() {
    let (mut axis, mut motion) = rig(TRAVEL);
    let cfg = AxisConfig::default();
    let done = motion.move_axis(&mut axis, MotionRequest::new(5.0)).unwrap();

    assert_eq!(done.steps, 0);
    assert_eq!(done.requested, 400);
    assert_eq!(done.stopped_at, Some(Limit::End));
    assert!(board(&axis).dir_writes().is_empty());
    assert_eq!(board(&axis).writes_to(cfg.pin_step), [PinState::Low]);
}

#[test]
fn end_switch_cuts_the_train_at_the_next_check() {
    // END closes after 25 pulses; checks fall on pulses 10, 20, 30.
    let (mut axis, mut motion) = rig(TRAVEL - 25);
    let done = motion.move_axis(&mut axis, MotionRequest::new(1.0)).unwrap();

    assert_eq!(done.steps, 30);
    assert_eq!(done.stopped_at, Some(Limit::End));
    assert!(!done.is_complete());
    assert_eq!(board(&axis).pulses_up, 30);
    assert!(board(&axis).position - TRAVEL <= 10, "overtravel bounded by the check interval");
}

#[test]
fn moving_down_only_watches_home() {
    let (mut axis, mut motion) = rig(200);
    let cfg = AxisConfig::default();
    motion.move_axis(&mut axis, MotionRequest::new(-1.0)).unwrap();
    assert_eq!(board(&axis).reads_of(cfg.pin_end), 0);
    // Pre-check plus pulses 10..70.
    assert_eq!(board(&axis).reads_of(cfg.pin_home), 8);
}

#[test]
fn step_write_failure_aborts_with_io_failure() {
    let (mut axis, mut motion) = rig(100);
    let cfg = AxisConfig::default();
    // Write #1 is the parking LOW at connect; #6 is the 3rd rising edge.
    axis.io_mut().fail_write = Some((cfg.pin_step, 6));

    let result = motion.move_axis(&mut axis, MotionRequest::new(1.0));
    assert_eq!(
        result,
        Err(MotionError::IoFailure(IoError::Write { pin: cfg.pin_step }))
    );
    assert_eq!(board(&axis).pulses_up, 2);
}

#[test]
fn stop_token_aborts_within_one_check_interval() {
    let stop = StopToken::new();
    let (mut axis, mut motion) = rig_with(100, MotionTuning::default(), stop.clone());
    axis.io_mut().trip_at_pulse = Some((25, stop.clone()));

    let result = motion.move_axis(&mut axis, MotionRequest::new(10.0));
    assert_eq!(result, Err(MotionError::EmergencyStop));
    assert_eq!(board(&axis).pulses_up, 30);
}

#[test]
fn tripped_token_refuses_motion_without_io() {
    let stop = StopToken::new();
    let (mut axis, mut motion) = rig_with(100, MotionTuning::default(), stop.clone());
    stop.trip();
    let before = board(&axis).calls.len();
    assert_eq!(
        motion.move_axis(&mut axis, MotionRequest::new(1.0)),
        Err(MotionError::EmergencyStop)
    );
    assert_eq!(motion.home(&mut axis), Err(MotionError::EmergencyStop));
    assert_eq!(board(&axis).calls.len(), before);
}

// ── home / go_to_end ─────────────────────────────────────────

#[test]
fn home_when_already_home_issues_no_pulses() {
    let (mut axis, mut motion) = rig(0);
    assert_eq!(motion.home(&mut axis), Ok(0));
    assert_eq!(board(&axis).pulses(), 0);
    assert!(board(&axis).dir_writes().is_empty());
}

#[test]
fn home_reads_the_switch_after_every_pulse() {
    let (mut axis, mut motion) = rig(160);
    let cfg = AxisConfig::default();
    assert_eq!(motion.home(&mut axis), Ok(160));
    assert_eq!(board(&axis).position, 0);
    assert_eq!(board(&axis).pulses_down, 160);
    assert_eq!(board(&axis).dir_writes(), [PinState::Low]);
    assert_eq!(board(&axis).reads_of(cfg.pin_home), 161);
}

#[test]
fn go_to_end_is_symmetric() {
    let (mut axis, mut motion) = rig(TRAVEL - 50);
    assert_eq!(motion.go_to_end(&mut axis), Ok(50));
    assert_eq!(board(&axis).dir_writes(), [PinState::High]);

    let (mut axis, mut motion) = rig(TRAVEL);
    assert_eq!(motion.go_to_end(&mut axis), Ok(0));
    assert_eq!(board(&axis).pulses(), 0);
}

#[test]
fn broken_home_switch_times_out() {
    let tuning = MotionTuning {
        max_travel_mm: 1.0,
        ..MotionTuning::default()
    };
    let (mut axis, mut motion) = rig_with(500, tuning, StopToken::new());
    axis.io_mut().home_broken = true;

    assert_eq!(motion.step_budget(80.0), 80);
    assert_eq!(
        motion.home(&mut axis),
        Err(MotionError::HomingTimeout { steps: 80 })
    );
    assert_eq!(board(&axis).pulses_down, 80);
}

#[test]
fn stop_token_aborts_homing_on_the_next_pulse() {
    let stop = StopToken::new();
    let (mut axis, mut motion) = rig_with(1_000, MotionTuning::default(), stop.clone());
    axis.io_mut().trip_at_pulse = Some((7, stop.clone()));

    assert_eq!(motion.home(&mut axis), Err(MotionError::EmergencyStop));
    assert_eq!(board(&axis).pulses_down, 7);
}

#[test]
fn disconnected_board_fails_homing() {
    let (mut axis, mut motion) = rig(100);
    axis.io_mut().disconnected = true;
    assert_eq!(
        motion.home(&mut axis),
        Err(MotionError::IoFailure(IoError::Disconnected))
    );
}

// ── cancel token ─────────────────────────────────────────────

#[test]
fn armed_cancel_interrupts_a_move_at_the_check_interval() {
    let (mut axis, mut motion) = rig(100);
    let cancel = StopToken::new();
    motion.arm_cancel(cancel.clone());
    axis.io_mut().trip_at_pulse = Some((25, cancel.clone()));

    let result = motion.move_axis(&mut axis, MotionRequest::new(10.0));
    assert_eq!(result, Err(MotionError::Cancelled));
    assert_eq!(board(&axis).pulses_up, 30);
}

#[test]
fn armed_cancel_interrupts_homing() {
    let (mut axis, mut motion) = rig(1_000);
    let cancel = StopToken::new();
    motion.arm_cancel(cancel.clone());
    axis.io_mut().trip_at_pulse = Some((12, cancel.clone()));

    assert_eq!(motion.home(&mut axis), Err(MotionError::Cancelled));
    assert_eq!(board(&axis).pulses_down, 12);
}

#[test]
fn disarmed_cancel_is_ignored() {
    let (mut axis, mut motion) = rig(100);
    let cancel = StopToken::new();
    motion.arm_cancel(cancel.clone());
    motion.disarm_cancel();
    cancel.trip();

    let done = motion.move_axis(&mut axis, MotionRequest::new(1.0)).unwrap();
    assert!(done.is_complete());
}

#[test]
fn emergency_stop_wins_over_cancel() {
    let stop = StopToken::new();
    let (mut axis, mut motion) = rig_with(100, MotionTuning::default(), stop.clone());
    let cancel = StopToken::new();
    motion.arm_cancel(cancel.clone());
    cancel.trip();
    stop.trip();

    assert_eq!(
        motion.move_axis(&mut axis, MotionRequest::new(1.0)),
        Err(MotionError::EmergencyStop)
    );
}

// ── limit sampling ───────────────────────────────────────────

#[test]
fn limits_sample_both_switches() {
    let (mut axis, _) = rig(0);
    let state = axis.limits().unwrap();
    assert!(state.home_triggered);
    assert!(!state.end_triggered);

    let (mut axis, _) = rig(TRAVEL);
    let state = axis.limits().unwrap();
    assert!(!state.home_triggered);
    assert!(state.end_triggered);
}
