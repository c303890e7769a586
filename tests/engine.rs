//! 引擎对外接口的行为测试：发射、撤销、复位、历史上限与分析结果。

use prodnet::engine::{
    HISTORY_CAPACITY, ManualClock, NameClassifier, SimulationEngine, enablement,
};
use prodnet::net::{Net, Place, Transition};

/// P1(1, cap 1) -> T1 -> P2(0, cap 5)
fn line() -> Net {
    let mut net = Net::empty();
    net.add_place(Place::new_with_capacity("P1", "P1", 1, 1));
    net.add_place(Place::new_with_capacity("P2", "P2", 0, 5));
    net.add_transition(Transition::new("T1", "T1"));
    net.add_input_arc("P1", "T1", 1);
    net.add_output_arc("T1", "P2", 1);
    net
}

/// 闭环：a -> t_ab -> b -> t_ba -> a，永不死锁。
fn cycle() -> Net {
    let mut net = Net::empty();
    net.add_place(Place::new_with_capacity("a", "A", 1, 1));
    net.add_place(Place::new_with_capacity("b", "B", 0, 1));
    net.add_transition(Transition::new("t_ab", "AB"));
    net.add_transition(Transition::new("t_ba", "BA"));
    net.add_input_arc("a", "t_ab", 1);
    net.add_output_arc("t_ab", "b", 1);
    net.add_input_arc("b", "t_ba", 1);
    net.add_output_arc("t_ba", "a", 1);
    net
}

fn engine_with_clock(net: Net) -> (SimulationEngine, ManualClock) {
    let clock = ManualClock::new(0);
    let engine = SimulationEngine::with_parts(
        net,
        Box::new(NameClassifier::default()),
        Box::new(clock.clone()),
    );
    (engine, clock)
}

#[test]
fn end_to_end_line() {
    let mut engine = SimulationEngine::new(line());
    assert!(engine.is_transition_enabled("T1"));
    assert!(engine.fire_transition("T1"));

    let marking = engine.marking();
    assert_eq!(marking.tokens("P1"), Some(0));
    assert_eq!(marking.tokens("P2"), Some(1));
    assert_eq!(engine.simulation_state().step(), 1);

    assert!(engine.step_back());
    let marking = engine.marking();
    assert_eq!(marking.tokens("P1"), Some(1));
    assert_eq!(marking.tokens("P2"), Some(0));
    assert_eq!(engine.simulation_state().step(), 0);
}

#[test]
fn enabled_set_only_contains_covered_transitions() {
    let mut net = cycle();
    net.add_transition(Transition::new("heavy", "Heavy"));
    net.add_input_arc("a", "heavy", 2);
    let engine = SimulationEngine::new(net);

    let enabled = engine.enabled_transitions();
    assert_eq!(enabled, vec!["t_ab"]);
    for id in &enabled {
        for arc in engine.net().input_arcs(id.as_str()) {
            let place = engine.net().place(&arc.from).unwrap();
            assert!(place.tokens >= arc.weight);
        }
    }
}

#[test]
fn consecutive_step_backs_retrace_every_marking() {
    let mut engine = SimulationEngine::new(cycle());
    let mut seen = vec![engine.marking()];
    for transition in ["t_ab", "t_ba", "t_ab", "t_ba", "t_ab"] {
        assert!(engine.fire_transition(transition));
        seen.push(engine.marking());
    }
    assert_eq!(engine.simulation_state().step(), 5);

    seen.pop();
    while let Some(expected) = seen.pop() {
        assert!(engine.step_back());
        assert_eq!(engine.marking(), expected);
    }
    assert_eq!(engine.simulation_state().step(), 0);
    assert!(!engine.step_back());
}

#[test]
fn reset_restores_baseline_and_zeroes_counters() {
    let mut net = cycle();
    net.transitions[0] = Transition::new("t_ab", "Finish AB");
    let (mut engine, clock) = engine_with_clock(net);
    let baseline = engine.marking();

    for _ in 0..130 {
        clock.advance(10);
        let next = engine.enabled_transitions()[0].clone();
        assert!(engine.fire_transition(next.as_str()));
    }
    assert_eq!(engine.metrics().total_produced, 65);
    assert!(engine.play());

    engine.reset();
    assert_eq!(engine.marking(), baseline);
    assert_eq!(engine.simulation_state().step(), 0);
    assert!(!engine.simulation_state().is_running());
    assert!(engine.simulation_state().history().is_empty());
    assert_eq!(engine.metrics().total_produced, 0);
    assert_eq!(engine.metrics().cycle_time, 0.0);
    assert!(engine.fire_counts().values().all(|count| *count == 0));
    assert!(engine.analyze().throughput.values().all(|share| *share == 0.0));
    assert!(engine.is_transition_enabled("t_ab"));
}

#[test]
fn history_is_capped_with_fifo_eviction() {
    let mut engine = SimulationEngine::new(cycle());
    for step in 0..(HISTORY_CAPACITY + 20) {
        let transition = if step % 2 == 0 { "t_ab" } else { "t_ba" };
        assert!(engine.fire_transition(transition));
    }
    let history = engine.simulation_state().history();
    assert_eq!(history.len(), HISTORY_CAPACITY);

    let mut undone = 0;
    while engine.step_back() {
        undone += 1;
    }
    assert_eq!(undone, HISTORY_CAPACITY);
    assert_eq!(engine.simulation_state().step(), 20);
}

#[test]
fn throughput_sums_to_one_after_fires() {
    let mut engine = SimulationEngine::new(cycle());
    let before: f64 = engine.analyze().throughput.values().sum();
    assert_eq!(before, 0.0);

    for transition in ["t_ab", "t_ba", "t_ab"] {
        assert!(engine.fire_transition(transition));
    }
    let analysis = engine.analyze();
    let total: f64 = analysis.throughput.values().sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!((analysis.throughput["t_ab"] - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn deadlock_scenario() {
    let mut net = Net::empty();
    net.add_place(Place::new("empty", "Empty", 0));
    net.add_transition(Transition::new("t", "Needs One"));
    net.add_input_arc("empty", "t", 1);

    let mut engine = SimulationEngine::new(net);
    assert!(engine.enabled_transitions().is_empty());
    assert!(engine.analyze().has_deadlock);
    assert!(!engine.fire_transition("t"));
    assert!(!engine.play());
}

#[test]
fn capacity_scenario() {
    let mut net = Net::empty();
    net.add_place(Place::new("src", "Source", 1));
    net.add_place(Place::new_with_capacity("full", "Full", 1, 1));
    net.add_transition(Transition::new("push", "Push"));
    net.add_input_arc("src", "push", 1);
    net.add_output_arc("push", "full", 1);

    let mut engine = SimulationEngine::new(net);
    assert!(engine.fire_transition("push"));
    assert_eq!(engine.marking().tokens("full"), Some(1));
    assert_eq!(engine.marking().tokens("src"), Some(0));
}

#[test]
fn conflict_scenario() {
    let mut net = Net::empty();
    net.add_place(Place::new("shared", "Shared", 1));
    net.add_transition(Transition::new("left", "Left"));
    net.add_transition(Transition::new("right", "Right"));
    net.add_input_arc("shared", "left", 1);
    net.add_input_arc("shared", "right", 1);

    let conflicts = SimulationEngine::new(net).analyze().conflicts;
    assert_eq!(conflicts.len(), 1);
    assert!(conflicts[0].contains("Shared"));
    assert!(conflicts[0].contains("Left") && conflicts[0].contains("Right"));
}

#[test]
fn inconsistent_net_is_tolerated() {
    let mut net = line();
    net.add_output_arc("T1", "ghost", 1);
    net.add_input_arc("P1", "phantom", 1);
    assert!(net.validate().is_err());

    let mut engine = SimulationEngine::new(net);
    assert!(!engine.is_transition_enabled("phantom"));
    assert!(engine.fire_transition("T1"));
    assert_eq!(engine.marking().tokens("P2"), Some(1));
}

#[test]
fn enabled_flags_are_refreshed_after_every_change() {
    let mut engine = SimulationEngine::new(cycle());
    let flags = |engine: &SimulationEngine| -> Vec<bool> {
        engine
            .net()
            .transitions
            .iter()
            .map(|transition| transition.is_enabled())
            .collect()
    };
    assert_eq!(flags(&engine), vec![true, false]);
    assert!(engine.fire_transition("t_ab"));
    assert_eq!(flags(&engine), vec![false, true]);
    assert!(engine.step_back());
    assert_eq!(flags(&engine), vec![true, false]);

    let mut snapshot = engine.net().clone();
    enablement::refresh_enabled(&mut snapshot);
    assert_eq!(&snapshot, engine.net());
}

#[test]
fn parallel_input_arcs_are_not_double_counted() {
    let mut net = Net::empty();
    net.add_place(Place::new("p", "P", 1));
    net.add_place(Place::new("q", "Q", 0));
    net.add_transition(Transition::new("t", "T"));
    net.add_input_arc("p", "t", 1);
    net.add_input_arc("p", "t", 1);
    net.add_output_arc("t", "q", 1);
    assert!(net.validate().is_err());

    let mut engine = SimulationEngine::new(net);
    assert!(!engine.is_transition_enabled("t"));
    assert!(!engine.fire_transition("t"));
    assert_eq!(engine.marking().tokens("p"), Some(1));
    assert_eq!(engine.marking().tokens("q"), Some(0));
    assert!(engine.analyze().has_deadlock);
}
