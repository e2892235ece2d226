//! Property tests for the optimizer passes.

use proptest::prelude::*;

use iqm_compile::{
    MergeOneParameterGates, MergeSingleQubitGates, Pass, PropertySet, SimplifyOptions,
    simplify_circuit,
};
use iqm_ir::unitary::allclose_up_to_global_phase;
use iqm_ir::{Circuit, Gate, Qubit};

fn q(i: u32) -> Qubit {
    Qubit::line(i)
}

fn single_qubit_gate() -> impl Strategy<Value = Gate> {
    prop_oneof![
        (-2.0..2.0f64).prop_map(Gate::x_pow),
        (-2.0..2.0f64).prop_map(Gate::y_pow),
        (-2.0..2.0f64).prop_map(Gate::z_pow),
        (-1.0..1.0f64, -1.0..1.0f64).prop_map(|(e, p)| Gate::phased_x(e, p)),
        Just(Gate::h()),
        Just(Gate::t()),
    ]
}

proptest! {
    #[test]
    fn merge_single_qubit_run_preserves_unitary(
        gates in prop::collection::vec(single_qubit_gate(), 1..8),
    ) {
        let mut circuit = Circuit::new();
        for gate in &gates {
            circuit.gate(*gate, [q(0)]).unwrap();
        }
        let out = MergeSingleQubitGates.run(circuit.clone(), &mut PropertySet::new()).unwrap();
        prop_assert!(out.num_operations() <= 2);
        if out.num_operations() > 0 {
            let before = circuit.unitary_on(&[q(0)]).unwrap();
            let after = out.unitary_on(&[q(0)]).unwrap();
            prop_assert!(allclose_up_to_global_phase(&before, &after, 1e-7));
        }
    }

    #[test]
    fn merged_exponent_in_half_open_period(a in -6.0..6.0f64, b in -6.0..6.0f64) {
        let mut circuit = Circuit::new();
        circuit.gate(Gate::iswap_pow(a), [q(0), q(1)]).unwrap();
        circuit.gate(Gate::iswap_pow(b), [q(0), q(1)]).unwrap();
        let out = MergeOneParameterGates::new()
            .run(circuit.clone(), &mut PropertySet::new())
            .unwrap();
        for op in out.all_operations() {
            let e = op.as_gate().and_then(Gate::exponent).unwrap();
            prop_assert!(e > -2.0 && e <= 2.0);
            let before = circuit.unitary().unwrap();
            let after = out.unitary().unwrap();
            prop_assert!(allclose_up_to_global_phase(&before, &after, 1e-8));
        }
    }

    #[test]
    fn simplify_is_idempotent(angles in prop::collection::vec(-1.0..1.0f64, 4)) {
        let mut circuit = Circuit::new();
        circuit
            .gate(Gate::x_pow(angles[0]), [q(0)]).unwrap()
            .gate(Gate::z_pow(angles[1]), [q(1)]).unwrap()
            .cz(q(0), q(1)).unwrap()
            .gate(Gate::y_pow(angles[2]), [q(1)]).unwrap()
            .gate(Gate::zz_pow(angles[3]), [q(0), q(1)]).unwrap()
            .measure("m", [q(0), q(1)]).unwrap();
        let once = simplify_circuit(circuit, SimplifyOptions::default()).unwrap();
        let twice = simplify_circuit(once.clone(), SimplifyOptions::default()).unwrap();
        prop_assert_eq!(once.num_operations(), twice.num_operations());
        prop_assert_eq!(once.depth(), twice.depth());
    }
}
