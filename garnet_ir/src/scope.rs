//! Instruction scopes.
//!
//! A scope is one method body: a straight-line instruction sequence in
//! definition order, the allocator for its temporaries and the flags the
//! simplifier consults.

use crate::instr::{Instr, Instruction};
use crate::variable::Variable;
use garnet_core::{Symbol, intern};
use std::fmt;

#[derive(Debug, Clone)]
pub struct Scope {
    name: Symbol,
    instrs: Vec<Instr>,
    next_temp: u32,
    next_inline_id: u32,
    inline_depth: usize,
    fixnum_ops_redefined: bool,
}

impl Scope {
    pub fn new(name: &str) -> Self {
        Self {
            name: intern(name),
            instrs: Vec::new(),
            next_temp: 0,
            next_inline_id: 0,
            inline_depth: 0,
            fixnum_ops_redefined: false,
        }
    }

    #[inline]
    pub fn name(&self) -> &Symbol {
        &self.name
    }

    #[inline]
    pub fn instrs(&self) -> &[Instr] {
        &self.instrs
    }

    /// Mutable access for the pass currently owning this scope.
    #[inline]
    pub fn instrs_mut(&mut self) -> &mut Vec<Instr> {
        &mut self.instrs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// Append an instruction. Temporaries it mentions are reserved so
    /// [`Scope::new_temporary`] never hands them out again.
    pub fn push(&mut self, instr: impl Into<Instr>) {
        let instr = instr.into();
        if let Some(result) = instr.result() {
            self.reserve(result);
        }
        for operand in instr.operands() {
            operand.for_each_variable(&mut |v| self.reserve(v));
        }
        self.instrs.push(instr);
    }

    fn reserve(&mut self, var: &Variable) {
        if let Variable::Temp(id) = var {
            self.next_temp = self.next_temp.max(id + 1);
        }
    }

    /// Allocate a temporary unused anywhere in this scope.
    pub fn new_temporary(&mut self) -> Variable {
        let var = Variable::Temp(self.next_temp);
        self.next_temp += 1;
        var
    }

    /// Number of temporaries allocated or reserved so far.
    #[inline]
    pub fn temporary_count(&self) -> u32 {
        self.next_temp
    }

    /// Identifier distinguishing one inlined copy from every other in this scope.
    pub fn next_inline_id(&mut self) -> u32 {
        let id = self.next_inline_id;
        self.next_inline_id += 1;
        id
    }

    /// How many levels of inlining produced this scope's body.
    #[inline]
    pub fn inline_depth(&self) -> usize {
        self.inline_depth
    }

    pub(crate) fn note_inline_depth(&mut self, depth: usize) {
        self.inline_depth = self.inline_depth.max(depth);
    }

    /// Number of arguments the body receives.
    pub fn arity(&self) -> usize {
        self.instrs
            .iter()
            .filter_map(|instr| match instr {
                Instr::ReceiveArg(recv) => Some(recv.index() as usize + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Record that integer operators were redefined, which disables folding.
    pub fn mark_fixnum_ops_redefined(&mut self) {
        self.fixnum_ops_redefined = true;
    }

    #[inline]
    pub fn fixnum_ops_redefined(&self) -> bool {
        self.fixnum_ops_redefined
    }

    /// Detach the instruction list so a pass can rewrite it while still
    /// handing `&self` to the instructions.
    pub(crate) fn take_instrs(&mut self) -> Vec<Instr> {
        std::mem::take(&mut self.instrs)
    }

    pub(crate) fn restore_instrs(&mut self, instrs: Vec<Instr>) {
        self.instrs = instrs;
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scope {}:", self.name)?;
        for (i, instr) in self.instrs.iter().enumerate() {
            writeln!(f, "  {:>3}: {}", i, instr)?;
        }
        Ok(())
    }
}
