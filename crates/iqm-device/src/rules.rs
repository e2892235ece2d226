//! Device decomposition rule tables.
//!
//! Each rule rewrites one gate family into gates closer to a device's
//! native set. Every rule is an exact identity, global phase included, so
//! rewritten gates stay correct inside controlled constructions.
//!
//! Two tables are provided:
//!
//! - [`DecompositionRules::common`] for devices with a native CZ coupler
//! - [`DecompositionRules::valkmusa`] for devices with a native iSWAP coupler

use std::f64::consts::FRAC_PI_2;
use std::fmt;

use iqm_compile::{CompileResult, OperationDecomposer};
use iqm_ir::{Gate, GateFamily, IrResult, Operation, Power, Qubit};

/// A decomposition rule: `Ok(None)` when the gate's parameters are outside
/// what the rule handles.
pub type RuleFn = fn(&Gate, &[Qubit]) -> IrResult<Option<Vec<Operation>>>;

/// A table of decomposition rules keyed by gate family.
#[derive(Clone, Default)]
pub struct DecompositionRules {
    rules: Vec<(GateFamily, RuleFn)>,
}

impl DecompositionRules {
    /// A table with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for devices with a native CZ.
    pub fn common() -> Self {
        Self::new()
            .with_rule(GateFamily::CZPow, cz_via_zz)
            .with_rule(GateFamily::ZZPow, zz_via_cz)
            .with_rule(GateFamily::ISwapPow, iswap_via_cz)
            .with_rule(GateFamily::ZPow, z_via_xy)
    }

    /// Rules for devices whose coupler is a native iSWAP power.
    pub fn valkmusa() -> Self {
        Self::new()
            .with_rule(GateFamily::CXPow, cnot_via_iswap)
            .with_rule(GateFamily::CZPow, cz_via_zz)
            .with_rule(GateFamily::ZZPow, zz_via_iswap)
            .with_rule(GateFamily::ZPow, z_via_xy)
    }

    /// Add a rule, replacing any earlier rule for the same family.
    #[must_use]
    pub fn with_rule(mut self, family: GateFamily, rule: RuleFn) -> Self {
        self.rules.retain(|(f, _)| *f != family);
        self.rules.push((family, rule));
        self
    }

    /// Families with a rule.
    pub fn families(&self) -> Vec<GateFamily> {
        self.rules.iter().map(|(f, _)| *f).collect()
    }

    /// Get the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for DecompositionRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecompositionRules")
            .field("families", &self.families())
            .finish()
    }
}

impl OperationDecomposer for DecompositionRules {
    fn decompose(&self, op: &Operation) -> CompileResult<Option<Vec<Operation>>> {
        let Some(gate) = op.as_gate() else {
            return Ok(None);
        };
        let family = gate.family();
        match self.rules.iter().find(|(f, _)| *f == family) {
            Some((_, rule)) => Ok(rule(gate, &op.qubits)?),
            None => Ok(None),
        }
    }
}

// =============================================================================
// Rules
// =============================================================================

/// Quarter turns used as building blocks.
fn lx() -> Gate {
    Gate::rx(FRAC_PI_2)
}

fn lxi() -> Gate {
    Gate::rx(-FRAC_PI_2)
}

fn ly() -> Gate {
    Gate::ry(FRAC_PI_2)
}

fn lyi() -> Gate {
    Gate::ry(-FRAC_PI_2)
}

fn lz() -> Gate {
    Gate::rz(FRAC_PI_2)
}

fn lzi() -> Gate {
    Gate::rz(-FRAC_PI_2)
}

fn on(gate: Gate, qubits: &[Qubit], idx: &[usize]) -> IrResult<Operation> {
    Operation::gate(gate, idx.iter().map(|&i| qubits[i].clone()))
}

/// `CZ^t` as a ZZ interaction plus local Z rotations.
fn cz_via_zz(gate: &Gate, q: &[Qubit]) -> IrResult<Option<Vec<Operation>>> {
    let Gate::CZPow(Power {
        exponent: t,
        global_shift: s,
    }) = *gate
    else {
        return Ok(None);
    };
    let l = Gate::rz(t * FRAC_PI_2);
    Ok(Some(vec![
        on(Gate::ZZPow(Power::new(-0.5 * t, -2.0 * s - 1.0)), q, &[0, 1])?,
        on(l, q, &[0])?,
        on(l, q, &[1])?,
    ]))
}

/// `(Z⊗Z)^t` with two full CZs.
fn zz_via_cz(gate: &Gate, q: &[Qubit]) -> IrResult<Option<Vec<Operation>>> {
    let Gate::ZZPow(Power {
        exponent: t,
        global_shift: s,
    }) = *gate
    else {
        return Ok(None);
    };
    Ok(Some(vec![
        on(lyi(), q, &[1])?,
        on(Gate::cz(), q, &[0, 1])?,
        on(Gate::XPow(Power::new(-t, -1.0 - s)), q, &[1])?,
        on(Gate::cz(), q, &[0, 1])?,
        on(ly(), q, &[1])?,
    ]))
}

/// `iSWAP^t` with two full CZs.
fn iswap_via_cz(gate: &Gate, q: &[Qubit]) -> IrResult<Option<Vec<Operation>>> {
    let Gate::ISwapPow(Power {
        exponent: t,
        global_shift: s,
    }) = *gate
    else {
        return Ok(None);
    };
    let x = -0.5 * t;
    Ok(Some(vec![
        on(lxi(), q, &[0])?,
        on(lxi(), q, &[1])?,
        on(lyi(), q, &[1])?,
        on(Gate::cz(), q, &[0, 1])?,
        on(Gate::XPow(Power::new(x, -0.5 - 2.0 * s)), q, &[0])?,
        on(Gate::XPow(Power::new(-x, -0.5)), q, &[1])?,
        on(Gate::cz(), q, &[0, 1])?,
        on(ly(), q, &[1])?,
        on(lx(), q, &[0])?,
        on(lx(), q, &[1])?,
    ]))
}

/// `Z^t` as a Y rotation conjugated by quarter X turns.
fn z_via_xy(gate: &Gate, q: &[Qubit]) -> IrResult<Option<Vec<Operation>>> {
    let Gate::ZPow(power) = *gate else {
        return Ok(None);
    };
    Ok(Some(vec![
        on(Gate::x_pow(-0.5), q, &[0])?,
        on(Gate::YPow(power), q, &[0])?,
        on(Gate::x_pow(0.5), q, &[0])?,
    ]))
}

/// `(Z⊗Z)^t` with two iSWAP powers.
fn zz_via_iswap(gate: &Gate, q: &[Qubit]) -> IrResult<Option<Vec<Operation>>> {
    let Gate::ZZPow(Power {
        exponent: t,
        global_shift: s,
    }) = *gate
    else {
        return Ok(None);
    };
    let xy = Gate::ISwapPow(Power::new(-t, -(s + 0.5) / 2.0));
    Ok(Some(vec![
        on(lyi(), q, &[0])?,
        on(lyi(), q, &[1])?,
        on(xy, q, &[0, 1])?,
        on(Gate::XPow(Power::new(-1.0, -0.5)), q, &[0])?,
        on(xy, q, &[0, 1])?,
        on(Gate::XPow(Power::new(1.0, -0.5)), q, &[0])?,
        on(ly(), q, &[0])?,
        on(ly(), q, &[1])?,
    ]))
}

/// CNOT with two full iSWAPs. Fractional powers are left to other rules.
fn cnot_via_iswap(gate: &Gate, q: &[Qubit]) -> IrResult<Option<Vec<Operation>>> {
    let Gate::CXPow(Power {
        exponent,
        global_shift: s,
    }) = *gate
    else {
        return Ok(None);
    };
    if exponent != 1.0 {
        return Ok(None);
    }
    let (c, t) = (0, 1);
    let is = Gate::ISwapPow(Power::new(1.0, (s + 0.25) / 2.0));
    Ok(Some(vec![
        on(lx(), q, &[t])?,
        on(lzi(), q, &[c])?,
        on(lz(), q, &[t])?,
        on(is, q, &[c, t])?,
        on(lx(), q, &[c])?,
        on(is, q, &[c, t])?,
        on(lz(), q, &[t])?,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use iqm_ir::Circuit;
    use iqm_ir::unitary::allclose;

    fn qubits() -> Vec<Qubit> {
        vec![Qubit::device(1), Qubit::device(2)]
    }

    /// The rewrite of `gate` reproduces its unitary exactly.
    fn assert_exact(rules: &DecompositionRules, gate: Gate) {
        let qs = qubits();
        let qs = &qs[..gate.num_qubits()];
        let op = Operation::gate(gate, qs.iter().cloned()).unwrap();
        let parts = rules.decompose(&op).unwrap().unwrap();

        let expected = Circuit::from_operations([op]).unwrap().unitary_on(qs).unwrap();
        let actual = Circuit::from_operations(parts).unwrap().unitary_on(qs).unwrap();
        assert!(allclose(&expected, &actual, 1e-10), "{gate} is not reproduced");
    }

    fn powers() -> Vec<Power> {
        vec![
            Power::exponent(1.0),
            Power::new(0.37, 0.2),
            Power::new(-0.8, -0.4),
            Power::new(2.3, 0.7),
        ]
    }

    #[test]
    fn test_common_rules_exact() {
        let rules = DecompositionRules::common();
        for p in powers() {
            assert_exact(&rules, Gate::CZPow(p));
            assert_exact(&rules, Gate::ZZPow(p));
            assert_exact(&rules, Gate::ISwapPow(p));
            assert_exact(&rules, Gate::ZPow(p));
        }
    }

    #[test]
    fn test_valkmusa_rules_exact() {
        let rules = DecompositionRules::valkmusa();
        for p in powers() {
            assert_exact(&rules, Gate::CZPow(p));
            assert_exact(&rules, Gate::ZZPow(p));
            assert_exact(&rules, Gate::ZPow(p));
            assert_exact(&rules, Gate::CXPow(Power::new(1.0, p.global_shift)));
        }
    }

    #[test]
    fn test_fractional_cnot_not_handled() {
        let rules = DecompositionRules::valkmusa();
        let op = Operation::gate(Gate::CXPow(Power::exponent(0.5)), qubits()).unwrap();
        assert!(rules.decompose(&op).unwrap().is_none());
    }

    #[test]
    fn test_missing_family() {
        let rules = DecompositionRules::common();
        let op = Operation::gate(Gate::h(), [Qubit::device(1)]).unwrap();
        assert!(rules.decompose(&op).unwrap().is_none());
        let measure = Operation::measure("m", [Qubit::device(1)]).unwrap();
        assert!(rules.decompose(&measure).unwrap().is_none());
    }

    #[test]
    fn test_with_rule_replaces() {
        let rules = DecompositionRules::common().with_rule(GateFamily::ZPow, cz_via_zz);
        assert_eq!(rules.len(), 4);
        // The replacement rule does not match ZPow gates.
        let op = Operation::gate(Gate::z(), [Qubit::device(1)]).unwrap();
        assert!(rules.decompose(&op).unwrap().is_none());
        assert_eq!(
            format!("{rules:?}"),
            "DecompositionRules { families: [CZPow, ZZPow, ISwapPow, ZPow] }"
        );
    }

    #[test]
    fn test_rules_keep_operand_order() {
        let rules = DecompositionRules::valkmusa();
        let control = Qubit::device(2);
        let target = Qubit::device(1);
        let op = Operation::gate(Gate::cnot(), [control.clone(), target.clone()]).unwrap();
        let parts = rules.decompose(&op).unwrap().unwrap();
        assert_eq!(parts[0].qubits, vec![target]);
        assert_eq!(parts[1].qubits, vec![control]);
    }

    #[test]
    fn test_failing_rule_reports_error() {
        fn cz_on_first(_gate: &Gate, qubits: &[Qubit]) -> IrResult<Option<Vec<Operation>>> {
            let op = Operation::gate(Gate::cz(), qubits.iter().take(1).cloned())?;
            Ok(Some(vec![op]))
        }
        let rules = DecompositionRules::new().with_rule(GateFamily::HPow, cz_on_first);
        let op = Operation::gate(Gate::h(), [Qubit::device(1)]).unwrap();
        assert!(matches!(
            rules.decompose(&op),
            Err(iqm_compile::CompileError::Ir(_))
        ));
    }
}
