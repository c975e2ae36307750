//! Copy propagation through the instruction contract.
//!
//! Coverage:
//! - Copy of a value that simplifies to a constant reports the constant
//! - Repeated simplification with the same map is idempotent
//! - Chains collapse in one definition-order walk
//! - Copies left dead are removed by the pipeline

use garnet_ir::{
    BinOp, BinOpInstr, CopyInstr, Instr, Instruction, Operand, ReturnInstr, Scope, ValueMap, Variable,
    opt::optimize,
};
use proptest::prelude::*;

fn t(id: u32) -> Variable {
    Variable::temp(id)
}

#[test]
fn copy_of_known_constant_reports_constant_twice() {
    let scope = Scope::new("main");
    let mut map = ValueMap::default();
    map.insert(t(0), Operand::fixnum(99));

    let mut copy: Instr = CopyInstr::new(t(1), Operand::var(t(0))).into();
    let first = copy.simplify_and_get_result(&scope, &map);
    let second = copy.simplify_and_get_result(&scope, &map);

    assert_eq!(first, Some(Operand::fixnum(99)));
    assert_eq!(second, Some(Operand::fixnum(99)));
}

#[test]
fn copy_chain_resolves_to_original_source() {
    // a = b; c = a; return c
    let a = t(0);
    let b = Variable::local("b");
    let c = t(1);

    let mut scope = Scope::new("main");
    scope.push(CopyInstr::new(a.clone(), Operand::var(b.clone())));
    scope.push(CopyInstr::new(c.clone(), Operand::var(a)));
    scope.push(ReturnInstr::new(Operand::var(c)));

    optimize(&mut scope);

    assert_eq!(scope.len(), 1);
    assert!(matches!(&scope.instrs()[0], Instr::Return(r) if r.value() == &Operand::var(b)));
}

#[test]
fn inlined_arithmetic_folds_away() {
    // %v_0 = copy(4); %v_1 = mul(%v_0, %v_0); %v_2 = add(%v_1, 1); return(%v_2)
    let mut scope = Scope::new("main");
    scope.push(CopyInstr::new(t(0), Operand::fixnum(4)));
    scope.push(BinOpInstr::new(BinOp::Mul, t(1), Operand::var(t(0)), Operand::var(t(0))));
    scope.push(BinOpInstr::new(BinOp::Add, t(2), Operand::var(t(1)), Operand::fixnum(1)));
    scope.push(ReturnInstr::new(Operand::var(t(2))));

    let stats = optimize(&mut scope);

    assert_eq!(stats.final_size, 1);
    assert_eq!(scope.instrs()[0].operands()[0], &Operand::fixnum(17));
}

/// Value maps as copy propagation builds them: a temporary only ever maps to
/// constants, locals or temporaries defined before it.
fn acyclic_map() -> impl Strategy<Value = ValueMap> {
    proptest::collection::vec((any::<bool>(), any::<i32>(), any::<u32>(), 0u8..3), 8).prop_map(|slots| {
        slots
            .into_iter()
            .enumerate()
            .filter(|(_, (present, ..))| *present)
            .map(|(id, (_, int, pick, kind))| {
                let value = match kind {
                    0 => Operand::fixnum(int as i64),
                    1 if id > 0 => Operand::var(Variable::temp(pick % id as u32)),
                    _ => Operand::var(Variable::local("x")),
                };
                (Variable::temp(id as u32), value)
            })
            .collect()
    })
}

fn arb_source() -> impl Strategy<Value = Operand> {
    prop_oneof![
        any::<i32>().prop_map(|i| Operand::fixnum(i as i64)),
        (0u32..8).prop_map(|id| Operand::var(Variable::temp(id))),
        Just(Operand::var(Variable::local("x"))),
    ]
}

proptest! {
    #[test]
    fn simplify_operands_is_idempotent(map in acyclic_map(), source in arb_source(), force in any::<bool>()) {
        let mut once = CopyInstr::new(Variable::temp(100), source);
        once.simplify_operands(&map, force);
        let mut twice = once.clone();
        twice.simplify_operands(&map, force);

        prop_assert_eq!(once, twice);
    }
}
