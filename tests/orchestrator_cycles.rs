use vela::bootstrap::{build_simulation, SimulationConfig};
use vela::kernel::engine::StateEngine;
use vela::kernel::intent::store::IntentStore;
use vela::kernel::intent::types::{GoalSpec, IntentStatus, IntentType};
use vela::kernel::orchestrator::Orchestrator;
use vela::kernel::policy::PolicyGate;
use vela::kernel::safety::SafetyGate;
use vela::kernel::state::{Mode, SystemState};
use vela::kernel::telemetry::TelemetryBus;

fn orchestrator_with(state: SystemState) -> Orchestrator {
    Orchestrator::new(
        IntentStore::new(),
        StateEngine::new(state),
        PolicyGate::new(),
        SafetyGate::new(),
        TelemetryBus::new(),
    )
}

fn state_with(mode: Mode, battery: f64, temperature: f64) -> SystemState {
    let mut state = SystemState::new();
    state.mode = mode;
    state.battery_level = battery;
    state.temperature = temperature;
    state
}

fn mission_goal(reference: f64) -> GoalSpec {
    GoalSpec {
        target: Some("orbital_deviation".to_string()),
        reference: Some(reference),
        metric: Some("position".to_string()),
        tolerance: Some(0.1),
    }
}

#[test]
fn nominal_orbit_correction_converges() {
    let mut orch = orchestrator_with(state_with(Mode::Nominal, 100.0, 25.0));
    let orbit = orch
        .intents
        .submit_with_goal(IntentType::OrbitCorrection, mission_goal(3.0));

    // 1. Six cycles of 0.5 each reach the 3.0 goal.
    orch.run(6);

    let state = orch.engine.state();
    assert!((state.position - 3.0).abs() < 1e-9);
    assert_eq!(state.mode, Mode::Nominal);
    // Per cycle: -1.0 burn, +1.14 charge, -0.6 load.
    assert!((state.battery_level - 97.24).abs() < 1e-9);

    // 2. Completed on cycle 6 and archived the same cycle.
    assert!(orch.intents.is_empty(), "terminal intent must be archived");

    let frames = orch.telemetry.get_frames();
    assert_eq!(frames.len(), 6);
    assert_eq!(
        frames[5].data.execution.executed_intent_id.as_deref(),
        Some(orbit.intent_id.as_str())
    );
    assert!(!frames[5].data.safety.blocked);

    // 3. The next cycle is idle: nothing selected, nothing blocked.
    orch.run(1);
    let frames = orch.telemetry.get_frames();
    assert!(frames[6].data.policy.selected_intent_id.is_none());
    assert!(frames[6].data.policy.scores.is_empty());
    assert!(!frames[6].data.safety.blocked);
    assert!(frames[6].data.execution.executed_intent_id.is_none());
}

#[test]
fn safe_injection_on_low_battery() {
    let mut orch = orchestrator_with(state_with(Mode::Nominal, 4.0, 25.0));
    let orbit = orch
        .intents
        .submit_with_goal(IntentType::OrbitCorrection, mission_goal(3.0));

    // 1. Cycle 1: critical battery forces a recovery into the selection and
    //    execution drops the state into SAFE. Staging still saw NOMINAL.
    orch.run(1);
    assert_eq!(orch.engine.state().mode, Mode::Safe);
    assert!(orch.staged_safe_injections().is_empty());

    let recovery = orch
        .intents
        .get_active_by_type(IntentType::BatteryRecovery)
        .expect("recovery intent submitted by override")
        .clone();

    // 2. Cycle 2: staging now observes SAFE and stages the battery domain;
    //    the recovery intent is the selection.
    orch.run(1);
    assert!(orch
        .staged_safe_injections()
        .contains(&IntentType::BatteryRecovery));

    let frames = orch.telemetry.get_frames();
    assert_eq!(
        frames[1].data.policy.selected_intent_id.as_deref(),
        Some(recovery.intent_id.as_str())
    );
    assert!(!frames[1].data.safety.blocked);

    // 3. The mission intent is untouchable while SAFE.
    let orbit_stored = orch
        .intents
        .get_active(&orbit.intent_id)
        .expect("mission intent still active")
        .clone();
    let decision = orch
        .safety
        .evaluate(Some(&orbit_stored), orch.engine.state());
    assert!(decision.blocked);
    assert_eq!(
        decision.reason.map(|r| r.to_string()).as_deref(),
        Some("safe_mode_mission_blocked")
    );
}

#[test]
fn critical_override_submits_missing_recovery() {
    let mut orch = orchestrator_with(state_with(Mode::Nominal, 4.0, 25.0));
    let orbit = orch
        .intents
        .submit_with_goal(IntentType::OrbitCorrection, mission_goal(3.0));

    orch.run(1);

    let frames = orch.telemetry.get_frames();
    let frame = &frames[0];

    // Policy picked the mission intent; the override replaced it.
    assert_eq!(
        frame.data.policy.selected_intent_id.as_deref(),
        Some(orbit.intent_id.as_str())
    );
    assert!(frame.data.execution.override_applied);
    assert_eq!(
        frame.data.safety.critical_domains,
        vec![vela::kernel::safety::Domain::Battery]
    );

    let recovery = orch
        .intents
        .get_active_by_type(IntentType::BatteryRecovery)
        .expect("override must submit the missing recovery");
    assert_eq!(
        frame.data.execution.executed_intent_id.as_deref(),
        Some(recovery.intent_id.as_str())
    );
    assert_eq!(recovery.status, IntentStatus::Active);
}

#[test]
fn recovery_lock_holds_for_minimum_cycles() {
    // SAFE on thermal grounds, close enough to recovered that policy soon
    // prefers the mission intent again.
    let mut orch = orchestrator_with(state_with(Mode::Safe, 80.0, 110.5));
    let orbit = orch
        .intents
        .submit_with_goal(IntentType::OrbitCorrection, mission_goal(3.0));
    let thermal = orch.intents.submit(IntentType::ThermalRecovery);

    // 1. Cycle 1: thermal severity still outranks the mission base score.
    orch.run(1);
    let frames = orch.telemetry.get_frames();
    assert_eq!(
        frames[0].data.execution.executed_intent_id.as_deref(),
        Some(thermal.intent_id.as_str())
    );
    assert!(!frames[0].data.execution.lock_applied);

    // 2. Cycles 2 and 3: policy would pick the mission intent, the lock
    //    keeps the recovery selected.
    orch.run(2);
    let frames = orch.telemetry.get_frames();
    for frame in &frames[1..3] {
        assert_eq!(
            frame.data.policy.selected_intent_id.as_deref(),
            Some(orbit.intent_id.as_str()),
            "policy preference moved on"
        );
        assert!(frame.data.execution.lock_applied, "lock must hold the recovery");
        assert_eq!(
            frame.data.execution.executed_intent_id.as_deref(),
            Some(thermal.intent_id.as_str())
        );
    }
    assert_eq!(orch.last_selected_id(), Some(thermal.intent_id.as_str()));

    // 3. Cycle 4: streak reached the minimum, the lock releases; the mission
    //    intent is chosen and promptly blocked by SAFE mode.
    orch.run(1);
    let frames = orch.telemetry.get_frames();
    let frame = &frames[3];
    assert!(!frame.data.execution.lock_applied);
    assert!(frame.data.safety.blocked);
    assert_eq!(
        frame.data.safety.reason.as_deref(),
        Some("safe_mode_mission_blocked")
    );
    assert!(frame.data.execution.executed_intent_id.is_none());
    assert_eq!(
        orch.intents.get_active(&orbit.intent_id).unwrap().safety_block_cycles,
        1
    );
}

#[test]
fn hard_invariant_blocks_without_mutation() {
    let mut orch = orchestrator_with(state_with(Mode::Nominal, 100.0, 150.1));
    orch.intents
        .submit_with_goal(IntentType::OrbitCorrection, mission_goal(3.0));

    orch.run(1);

    let frames = orch.telemetry.get_frames();
    let frame = &frames[0];
    assert!(frame.data.safety.blocked);
    assert_eq!(
        frame.data.safety.reason.as_deref(),
        Some("temperature_max_exceeded")
    );
    assert!(frame.data.execution.executed_intent_id.is_none());

    // No state mutation on a blocked cycle: the engine was never invoked.
    let state = orch.engine.state();
    assert_eq!(state.cycle_count, 0);
    assert!((state.temperature - 150.1).abs() < 1e-9);
    assert_eq!(state.mode, Mode::Nominal);
}

#[test]
fn idle_cycles_advance_mode_only() {
    let mut orch = orchestrator_with(state_with(Mode::Nominal, 8.0, 25.0));

    // 1. No intents: the cycle is idle but mode still advances.
    orch.run(1);
    assert_eq!(orch.engine.state().mode, Mode::Safe);
    assert_eq!(orch.engine.state().cycle_count, 0);
    assert!((orch.engine.state().battery_level - 8.0).abs() < 1e-9);

    let frames = orch.telemetry.get_frames();
    assert!(frames[0].data.policy.selected_intent_id.is_none());
    assert!(!frames[0].data.safety.blocked);

    // 2. Two more cycles: SAFE staging injects a battery recovery which then
    //    gets selected and executed.
    orch.run(2);
    let recovery = orch
        .intents
        .get_active_by_type(IntentType::BatteryRecovery)
        .expect("staged injection must land");
    assert_eq!(recovery.status, IntentStatus::Active);

    let frames = orch.telemetry.get_frames();
    assert_eq!(
        frames[2].data.execution.executed_intent_id.as_deref(),
        Some(recovery.intent_id.as_str())
    );
}

#[test]
fn critical_override_works_on_empty_intent_set() {
    let mut orch = orchestrator_with(state_with(Mode::Nominal, 4.0, 25.0));

    orch.run(1);

    let frames = orch.telemetry.get_frames();
    assert!(frames[0].data.execution.override_applied);
    assert!(frames[0].data.policy.selected_intent_id.is_none());
    assert!(
        orch.intents
            .get_active_by_type(IntentType::BatteryRecovery)
            .is_some(),
        "override must inject recovery even with no active intents"
    );
}

#[test]
fn invariants_hold_across_a_long_run() {
    let mut orch = orchestrator_with(state_with(Mode::Nominal, 40.0, 25.0));
    orch.intents
        .submit_with_goal(IntentType::OrbitCorrection, mission_goal(8.0));

    orch.run(50);

    for frame in orch.telemetry.get_frames() {
        let state = &frame.data.state;
        if !frame.data.safety.blocked {
            assert!(state.battery_level >= 0.0);
            assert!(state.temperature <= 150.0);
            assert!(state.position >= -10.0 && state.position <= 10.0);
            assert!(
                !(state.mode == Mode::Nominal && state.battery_level <= 10.0),
                "NOMINAL with battery {} violates mode consistency",
                state.battery_level
            );
        }
    }
}

#[test]
fn runs_are_deterministic() {
    // Identical initial state, insertion order, and cycle count: identical
    // trajectories and decisions (ids and timestamps aside).
    let config = SimulationConfig::default();
    let mut a = build_simulation(&config);
    let mut b = build_simulation(&config);

    a.run(30);
    b.run(30);

    let frames_a = a.telemetry.get_frames();
    let frames_b = b.telemetry.get_frames();
    assert_eq!(frames_a.len(), frames_b.len());

    for (fa, fb) in frames_a.iter().zip(frames_b.iter()) {
        assert_eq!(fa.data.state, fb.data.state);
        assert_eq!(fa.data.safety.blocked, fb.data.safety.blocked);
        assert_eq!(fa.data.safety.reason, fb.data.safety.reason);
        assert_eq!(fa.data.safety.critical_domains, fb.data.safety.critical_domains);
        assert_eq!(fa.data.execution.override_applied, fb.data.execution.override_applied);
        assert_eq!(fa.data.execution.lock_applied, fb.data.execution.lock_applied);

        let scores_a: Vec<f64> = fa.data.policy.scores.values().copied().collect();
        let scores_b: Vec<f64> = fb.data.policy.scores.values().copied().collect();
        assert_eq!(scores_a, scores_b);
    }
}
