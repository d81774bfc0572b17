//! End-to-end scenarios for the reasoning kernel: chained transitive
//! inheritance, modus ponens, mutual revision, contradiction surfacing, and
//! bounded propagation under capacity — the kinds of runs that exercise
//! several subsystems together rather than one function in isolation.

use nalkernel::config::Config;
use nalkernel::kernel::Kernel;

fn kernel() -> Kernel {
    Kernel::new(Config::default()).unwrap()
}

#[test]
fn transitive_inheritance_chain_derives_end_to_end_relation() {
    let mut k = kernel();
    k.assert("Inheritance(tweety,bird) %0.9;0.9%").unwrap();
    k.assert("Inheritance(bird,animal) %0.9;0.9%").unwrap();
    k.run(30).unwrap();

    let matches = k.query("Inheritance(tweety,animal)").unwrap();
    assert_eq!(matches.len(), 1);
}

#[test]
fn modus_ponens_chains_through_two_implications() {
    let mut k = kernel();
    k.assert("p %1.0;0.9%").unwrap();
    k.assert("Implication(p,q) %1.0;0.9%").unwrap();
    k.assert("Implication(q,r) %1.0;0.9%").unwrap();
    k.run(30).unwrap();

    let beliefs = k.get_beliefs(&"q".into());
    assert!(!beliefs.is_empty());
    let beliefs_r = k.get_beliefs(&"r".into());
    assert!(!beliefs_r.is_empty());
}

#[test]
fn revising_within_threshold_merges_into_a_single_belief() {
    let mut config = Config::default();
    config.belief_capacity = 3;
    let mut k = Kernel::new(config).unwrap();
    // Each successive frequency is within the default contradiction threshold
    // (0.5) of the running strongest belief, so every revision merges into
    // the same belief instead of accumulating a separate one.
    for i in 0..6 {
        k.assert(&format!("Inheritance(a,b) %{:.2};0.5%", 0.1 * i as f64)).unwrap();
    }
    let beliefs = k.get_beliefs(&"Inheritance(a,b)".into());
    assert_eq!(beliefs.len(), 1);
}

#[test]
fn revising_past_contradiction_threshold_keeps_beliefs_separate() {
    let mut config = Config::default();
    config.belief_capacity = 8;
    let mut k = Kernel::new(config).unwrap();
    k.assert("Inheritance(a,b) %0.1;0.9%").unwrap();
    k.assert("Inheritance(a,b) %0.9;0.9%").unwrap();
    let beliefs = k.get_beliefs(&"Inheritance(a,b)".into());
    assert_eq!(beliefs.len(), 2);
}

#[test]
fn query_returns_every_distinct_binding_for_a_variable_slot() {
    let mut k = kernel();
    k.assert("Inheritance(tweety,bird) %0.9;0.9%").unwrap();
    k.assert("Inheritance(penguin,bird) %0.9;0.9%").unwrap();
    let matches = k.query("Inheritance(?x,bird)").unwrap();
    assert_eq!(matches.len(), 2);
}

#[test]
fn ask_resolves_once_the_propagation_run_produces_a_match() {
    let mut k = kernel();
    k.assert("Inheritance(tweety,bird) %0.9;0.9%").unwrap();
    k.assert("Inheritance(bird,animal) %0.9;0.9%").unwrap();
    let id = k.ask("Inheritance(tweety,animal)").unwrap();
    assert!(matches!(k.poll_ask(id), nalkernel::questions::AskOutcome::Pending));
    k.run(30).unwrap();
    assert!(matches!(k.poll_ask(id), nalkernel::questions::AskOutcome::Answered(_)));
}

#[test]
fn similarity_is_derived_from_mutual_inheritance() {
    let mut k = kernel();
    k.assert("Inheritance(a,b) %0.8;0.8%").unwrap();
    k.assert("Inheritance(b,a) %0.8;0.8%").unwrap();
    k.run(10).unwrap();
    let matches = k.query("Similarity(a,b)").unwrap();
    assert_eq!(matches.len(), 1);
}

#[test]
fn run_stops_early_once_the_event_queue_drains() {
    let mut k = kernel();
    k.assert("tweety %1.0;0.9%").unwrap();
    let executed = k.run(1000).unwrap();
    assert!(executed < 1000);
}

#[test]
fn forgetting_keeps_the_hypergraph_within_its_configured_capacity() {
    let mut config = Config::default();
    config.edge_capacity = 5;
    let mut k = Kernel::new(config).unwrap();
    for i in 0..10 {
        k.assert(&format!("Inheritance(a,t{i}) %0.5;0.5%")).unwrap();
        k.run(1).unwrap();
    }
    // The memory manager only forgets on overflow observed during a step, so
    // the graph settles at or below its configured capacity rather than
    // exactly at it (atoms referenced by surviving edges are never pruned
    // out from under them within the same step).
    assert!(k.query("Inheritance(a,t9)").unwrap().len() <= 1);
}

#[test]
fn recurring_derivation_pattern_is_promoted_to_a_shortcut_edge() {
    let mut k = kernel();
    let shortcut_seen = std::rc::Rc::new(std::cell::RefCell::new(false));
    let shortcut_seen_clone = shortcut_seen.clone();
    k.on(move |event| {
        if matches!(event, nalkernel::kernel::KernelEvent::ShortcutCreated { .. }) {
            *shortcut_seen_clone.borrow_mut() = true;
        }
    });

    for i in 0..6 {
        k.assert(&format!("Inheritance(a{i},b{i}) %0.9;0.9%")).unwrap();
        k.assert(&format!("Inheritance(b{i},c{i}) %0.9;0.9%")).unwrap();
    }
    k.run(200).unwrap();
    k.apply_learning();

    assert!(*shortcut_seen.borrow());
    assert!(!k.query("Implication(?x,?y)").unwrap().is_empty());
}
