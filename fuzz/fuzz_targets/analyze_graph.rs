#![no_main]

//! Build a graph from raw bytes and run every analysis over it.
//!
//! Byte layout: first byte is the component count (mod 16). Each following
//! byte pair `(from, to)` adds a dependency `c{from} -> c{to}`; self edges
//! are skipped. The final byte selects which components are failed.

use libfuzzer_sys::fuzz_target;
use tangle_core::probe::fixed;
use tangle_core::{ComponentSpec, Engine, HealthResult};

fuzz_target!(|data: &[u8]| {
    let Some((&count, rest)) = data.split_first() else {
        return;
    };
    let n = usize::from(count % 16) + 1;
    let mask = rest.last().copied().unwrap_or(0);

    let mut deps: Vec<Vec<String>> = vec![Vec::new(); n];
    for pair in rest.chunks_exact(2) {
        let from = usize::from(pair[0]) % n;
        let to = usize::from(pair[1]) % n;
        if from != to {
            deps[from].push(format!("c{to}"));
        }
    }

    let mut builder = Engine::builder();
    for (i, d) in deps.into_iter().enumerate() {
        let healthy = (usize::from(mask) >> (i % 8)) & 1 == 0;
        builder.define_component(
            ComponentSpec::new(format!("c{i}"), fixed(HealthResult::from_check(healthy, "down")))
                .depends_on(d),
        );
    }
    let Ok(engine) = builder.build() else {
        return;
    };

    for cycle in engine.find_cycles() {
        assert!(cycle.len() >= 3);
        assert_eq!(cycle.first(), cycle.last());
    }

    let report = engine.generate_report();
    let failed = report.unhealthy_components();
    let mut order = engine.recovery_order(&failed).expect("generated ids are defined");
    let mut expected = failed;
    order.sort();
    expected.sort();
    assert_eq!(order, expected);

    for summary in engine.components() {
        let impact = engine.transitive_impact(&summary.id).expect("defined");
        assert!(!impact.contains(&summary.id));
    }
});
