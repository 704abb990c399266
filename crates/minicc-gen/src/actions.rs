//! Semantic-routine implementations.
//!
//! Each routine corresponds to one action symbol in the grammar. They
//! mutate the generator's stacks and the program block; none of them
//! consumes tokens. Routines read the semantic stack defensively: on a
//! malformed stack (possible after syntax-error recovery) they skip their
//! emission rather than fabricate instructions.

use minicc_util::{SemanticError, ValueKind};

use crate::item::{Role, ScopeEntry, ScopeItem, Ty};
use crate::program::{Instr, OpCode, Operand};
use crate::{CodeGen, SsItem, SP_ADDR, WORD};

impl CodeGen {
    // ------------------------------------------------------------------
    // Scope and declarations
    // ------------------------------------------------------------------

    pub(crate) fn scope_enter(&mut self) {
        self.scope.push(ScopeEntry::Mark);
    }

    /// Pops up to and including the nearest sentinel.
    pub(crate) fn scope_exit(&mut self) {
        while let Some(entry) = self.scope.pop() {
            if matches!(entry, ScopeEntry::Mark) {
                break;
            }
        }
    }

    pub(crate) fn begin_declaration(&mut self) {
        let id = self.items.alloc(ScopeItem::default());
        self.scope.push(ScopeEntry::Item(id));
    }

    pub(crate) fn type_specifier(&mut self, ty: Ty) {
        if let Some(id) = self.top_item() {
            self.items[id].ty = Some(ty);
        }
    }

    pub(crate) fn assign_name(&mut self, name: &str) {
        if let Some(id) = self.top_item() {
            self.items[id].name = name.to_string();
        }
    }

    pub(crate) fn declaration_role_variable(&mut self, line: u32) {
        let Some(id) = self.top_item() else { return };
        self.items[id].role = Some(Role::Variable);
        self.items[id].mem = Some(self.mem);
        if self.items[id].ty == Some(Ty::Int) {
            let addr = self.mem;
            self.mem += WORD;
            self.pb.emit(Instr::new(
                OpCode::Assign,
                Operand::Imm(0),
                Operand::Direct(addr),
                None,
            ));
        } else {
            let name = self.items[id].name.clone();
            self.errors.push(SemanticError::illegal_void(line, &name));
        }
    }

    /// The element count is the immediate left by PNUM; the array gets
    /// `n + 1` words, with the base word pointing at element 0.
    pub(crate) fn declaration_role_array(&mut self, line: u32) {
        let Some(id) = self.top_item() else { return };
        self.items[id].role = Some(Role::Array);
        self.items[id].mem = Some(self.mem);
        let words = match self.ss.last() {
            Some(SsItem::Imm(n)) => u32::try_from(n.saturating_add(1)).unwrap_or(1),
            _ => 1,
        };
        self.ss_pop(1);
        if self.items[id].ty == Some(Ty::Int) {
            let base = self.mem;
            self.mem = self.mem.saturating_add(WORD.saturating_mul(words));
            self.pb.emit(Instr::new(
                OpCode::Assign,
                Operand::Imm((base + WORD) as i64),
                Operand::Direct(base),
                None,
            ));
        } else {
            let name = self.items[id].name.clone();
            self.errors.push(SemanticError::illegal_void(line, &name));
        }
    }

    pub(crate) fn declaration_role_function(&mut self) {
        let Some(id) = self.top_item() else { return };
        self.items[id].role = Some(Role::Function);
        self.items[id].params = Vec::new();
        // One word for the return-jump address, one for the return value.
        self.items[id].mem = Some(self.mem);
        self.mem += 2 * WORD;
        self.decl_stack.push(id);
    }

    pub(crate) fn param_role(&mut self, role: Role) {
        let Some(id) = self.top_item() else { return };
        self.items[id].role = Some(role);
        self.items[id].mem = Some(self.mem);
        self.mem += WORD;
        if let Some(&func) = self.decl_stack.last() {
            self.items[func].params.push(id);
        }
    }

    pub(crate) fn begin_function_statement(&mut self) {
        let Some(&func) = self.decl_stack.last() else { return };
        let entry = self.pb.cursor();
        self.items[func].code = Some(entry);
        if self.items[func].name == "main" {
            self.pb.set(
                crate::JUMP_TO_MAIN_SLOT,
                Instr::new(OpCode::Jp, Operand::Direct(entry as u32), None, None),
            );
        }
    }

    /// Drops the function's params and locals from the scope stack but
    /// keeps its own entry visible to later declarations.
    pub(crate) fn end_function_statement(&mut self) {
        let Some(&func) = self.decl_stack.last() else { return };
        while let Some(entry) = self.scope.last() {
            if matches!(entry, ScopeEntry::Item(id) if *id == func) {
                break;
            }
            self.scope.pop();
        }
        self.decl_stack.pop();
    }

    pub(crate) fn function_return_value(&mut self, line: u32) {
        let Some(&func) = self.decl_stack.last() else { return };
        if self.items[func].ty == Some(Ty::Void) {
            let name = self.items[func].name.clone();
            self.errors.push(SemanticError::illegal_void(line, &name));
            self.ss_pop(1);
            return;
        }
        let value = self.ss.last().and_then(|item| self.operand(item));
        if let (Some(value), Some(mem)) = (value, self.items[func].mem) {
            self.pb.emit(Instr::new(
                OpCode::Assign,
                value,
                Operand::Direct(mem + WORD),
                None,
            ));
        }
        self.ss_pop(1);
    }

    /// Jump back through the caller's saved return address. `main` falls
    /// off the end of the program instead.
    pub(crate) fn function_return_jump(&mut self) {
        let Some(&func) = self.decl_stack.last() else { return };
        if self.items[func].name != "main" {
            let mem = self.items[func].mem.unwrap_or(0);
            self.pb
                .emit(Instr::new(OpCode::Jp, Operand::Indirect(mem), None, None));
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    pub(crate) fn pid(&mut self, line: u32, name: &str) {
        match self.lookup(name) {
            Some(id) => match self.items[id].mem {
                Some(addr) => self.ss.push(SsItem::Addr(addr)),
                // The synthetic `output` entry has no data address.
                None => self.ss.push(SsItem::Imm(0)),
            },
            None => {
                self.errors.push(SemanticError::undefined(line, name));
                self.ss.push(SsItem::Imm(0));
            }
        }
    }

    pub(crate) fn pnum(&mut self, lexeme: &str) {
        self.ss.push(SsItem::Imm(lexeme.parse().unwrap_or(0)));
    }

    pub(crate) fn push_op(&mut self, op: OpCode) {
        self.ss.push(SsItem::Op(op));
    }

    pub(crate) fn negate_ss_top(&mut self) {
        let Some(top) = self.ss.last().cloned() else { return };
        if let SsItem::Imm(n) = top {
            if let Some(slot) = self.ss.last_mut() {
                *slot = SsItem::Imm(-n);
            }
            return;
        }
        let Some(value) = self.operand(&top) else { return };
        let temp = self.new_temp();
        self.pb.emit(Instr::new(
            OpCode::Sub,
            Operand::Imm(0),
            value,
            Operand::Direct(temp),
        ));
        self.ss_pop(1);
        self.ss.push(SsItem::Addr(temp));
    }

    /// DO_ADDOP and DO_RELOP: the staged opcode sits between its operands,
    /// `[left, op, right]` from the bottom.
    pub(crate) fn apply_operator(&mut self, line: u32) {
        let (right, op, left) = match (self.ss_get(0), self.ss_get(1), self.ss_get(2)) {
            (Some(right), Some(SsItem::Op(op)), Some(left)) => (right.clone(), *op, left.clone()),
            _ => return,
        };
        self.check_operand_kinds(line, &left, &right);
        let (Some(a), Some(b)) = (self.operand(&left), self.operand(&right)) else {
            self.ss_pop(3);
            self.ss.push(SsItem::Imm(0));
            return;
        };
        let temp = self.new_temp();
        self.pb.emit(Instr::new(op, a, b, Operand::Direct(temp)));
        self.ss_pop(3);
        self.ss.push(SsItem::Addr(temp));
    }

    pub(crate) fn do_multiply(&mut self, line: u32) {
        let (right, left) = match (self.ss_get(0), self.ss_get(1)) {
            (Some(right), Some(left)) => (right.clone(), left.clone()),
            _ => return,
        };
        self.check_operand_kinds(line, &left, &right);
        let (Some(a), Some(b)) = (self.operand(&right), self.operand(&left)) else {
            self.ss_pop(2);
            self.ss.push(SsItem::Imm(0));
            return;
        };
        let temp = self.new_temp();
        self.pb
            .emit(Instr::new(OpCode::Mult, a, b, Operand::Direct(temp)));
        self.ss_pop(2);
        self.ss.push(SsItem::Addr(temp));
    }

    /// Assignment: emits the store and pops the value only, so the
    /// destination stays behind as the expression result for chaining.
    pub(crate) fn pid_assign(&mut self, line: u32) {
        let (value, dest) = match (self.ss_get(0), self.ss_get(1)) {
            (Some(value), Some(dest)) => (value.clone(), dest.clone()),
            _ => return,
        };
        self.check_operand_kinds(line, &dest, &value);
        if let (Some(src), Some(dst)) = (self.operand(&value), self.operand(&dest)) {
            self.pb.emit(Instr::new(OpCode::Assign, src, dst, None));
        }
        self.ss_pop(1);
    }

    /// `base[index]`: scale the index by the word size, add the base
    /// pointer, and leave an indirect operand on the stack.
    pub(crate) fn index_array_pop(&mut self) {
        let Some(index) = self.ss.last().cloned() else { return };
        let Some(index) = self.operand(&index) else {
            self.ss_pop(1);
            return;
        };
        let temp = self.new_temp();
        self.pb.emit(Instr::new(
            OpCode::Mult,
            index,
            Operand::Imm(WORD as i64),
            Operand::Direct(temp),
        ));
        self.ss_pop(1);

        let Some(base) = self.ss.last().cloned() else { return };
        let Some(base) = self.operand(&base) else {
            self.ss_pop(1);
            return;
        };
        self.pb.emit(Instr::new(
            OpCode::Add,
            base,
            Operand::Direct(temp),
            Operand::Direct(temp),
        ));
        self.ss_pop(1);
        self.ss.push(SsItem::Ind(temp));
    }

    fn check_operand_kinds(&mut self, line: u32, expected_from: &SsItem, got_from: &SsItem) {
        let expected = self.value_kind(expected_from);
        let got = self.value_kind(got_from);
        if expected != got {
            self.errors
                .push(SemanticError::operand_mismatch(line, got, expected));
        }
    }

    // ------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------

    /// Discards the value of an expression statement. Control-flow
    /// bookkeeping (saved slots, staged opcodes) is never a statement
    /// value, so an empty statement leaves the stack alone.
    pub(crate) fn pop(&mut self) {
        if matches!(
            self.ss.last(),
            Some(SsItem::Addr(_) | SsItem::Imm(_) | SsItem::Ind(_))
        ) {
            self.ss.pop();
        }
    }

    pub(crate) fn save(&mut self) {
        let slot = self.pb.reserve();
        self.ss.push(SsItem::Slot(slot));
    }

    pub(crate) fn label(&mut self) {
        self.ss.push(SsItem::Slot(self.pb.cursor()));
    }

    pub(crate) fn jp(&mut self) {
        if let Some(&SsItem::Slot(slot)) = self.ss_get(0) {
            let target = self.pb.cursor() as u32;
            self.pb
                .set(slot, Instr::new(OpCode::Jp, Operand::Direct(target), None, None));
        }
        self.ss_pop(1);
    }

    pub(crate) fn jpf(&mut self) {
        self.fill_jpf(0);
        self.ss_pop(2);
    }

    /// As JPF, but the branch target skips one extra slot, which is then
    /// reserved for the jump past the else part.
    pub(crate) fn jpf_save(&mut self) {
        self.fill_jpf(1);
        self.ss_pop(2);
        let slot = self.pb.reserve();
        self.ss.push(SsItem::Slot(slot));
    }

    fn fill_jpf(&mut self, offset: usize) {
        let (slot, cond) = match (self.ss_get(0), self.ss_get(1)) {
            (Some(&SsItem::Slot(slot)), Some(cond)) => (slot, cond.clone()),
            _ => return,
        };
        let Some(cond) = self.operand(&cond) else { return };
        let target = (self.pb.cursor() + offset) as u32;
        self.pb.set(
            slot,
            Instr::new(OpCode::Jpf, cond, Operand::Direct(target), None),
        );
    }

    /// The for-loop guard: fills `(EQ, e2, #0, t)` at the cursor and
    /// reserves two jump slots behind it, leaving `[body-slot, t,
    /// skip-slot]` on the stack.
    pub(crate) fn save_jump(&mut self) {
        let Some(cond) = self.ss.last().cloned() else { return };
        let Some(cond) = self.operand(&cond) else { return };
        let temp = self.new_temp();
        let here = self.pb.cursor();
        self.pb.set(
            here,
            Instr::new(OpCode::Eq, cond, Operand::Imm(0), Operand::Direct(temp)),
        );
        self.ss.push(SsItem::Slot(here + 2));
        self.ss.push(SsItem::Addr(temp));
        self.ss.push(SsItem::Slot(here + 1));
        self.pb.skip(3);
    }

    /// Runs after the step expression: emit the jump back to the
    /// condition, route the guard into the body, and open a break list.
    pub(crate) fn jump_fill(&mut self) {
        // The step expression is evaluated for effect only.
        self.ss_pop(1);
        if let Some(&SsItem::Slot(cond_index)) = self.ss_get(4) {
            self.pb.emit(Instr::new(
                OpCode::Jp,
                Operand::Direct(cond_index as u32),
                None,
                None,
            ));
            self.fill_jpf(0);
            self.ss_pop(2);
        }
        self.break_stack.push(Vec::new());
    }

    /// Closes the loop: jump from the body back to the step code, patch
    /// the conditional exit, and point every pending break past the loop.
    pub(crate) fn for_loop_end(&mut self) {
        if let Some(&SsItem::Slot(skip_slot)) = self.ss_get(0) {
            // The step code begins right after the three guard slots.
            self.pb.emit(Instr::new(
                OpCode::Jp,
                Operand::Direct((skip_slot + 1) as u32),
                None,
                None,
            ));
            if let Some(cond) = self.ss_get(1).cloned() {
                if let Some(cond) = self.operand(&cond) {
                    let exit = self.pb.cursor() as u32;
                    self.pb.set(
                        skip_slot,
                        Instr::new(OpCode::Jpf, cond, Operand::Direct(exit), None),
                    );
                }
            }
        }
        self.ss_pop(4);
        if let Some(pending) = self.break_stack.pop() {
            let exit = self.pb.cursor() as u32;
            for slot in pending {
                self.pb
                    .set(slot, Instr::new(OpCode::Jp, Operand::Direct(exit), None, None));
            }
        }
    }

    pub(crate) fn check_break(&mut self, line: u32) {
        match self.break_stack.last_mut() {
            Some(pending) => {
                let slot = self.pb.reserve();
                pending.push(slot);
            }
            None => self.errors.push(SemanticError::break_outside_for(line)),
        }
    }

    // ------------------------------------------------------------------
    // Function calls
    // ------------------------------------------------------------------

    pub(crate) fn begin_function_call(&mut self, line: u32, name: &str) {
        let callee = match self.lookup(name) {
            Some(id) if self.items[id].role == Some(Role::Function) => Some(id),
            _ => {
                self.errors.push(SemanticError::undefined(line, name));
                None
            }
        };
        self.call_stack.push(crate::CallFrame {
            callee,
            ss_depth: self.ss.len(),
        });
    }

    pub(crate) fn end_function_call(&mut self, line: u32) {
        let Some(frame) = self.call_stack.pop() else { return };
        let argc = self.ss.len().saturating_sub(frame.ss_depth);

        let Some(callee) = frame.callee else {
            // Unknown callee: drop the arguments and the callable handle,
            // leave a placeholder result.
            self.ss.truncate(frame.ss_depth.saturating_sub(1));
            self.ss.push(SsItem::Imm(0));
            return;
        };

        let name = self.items[callee].name.clone();

        if callee == self.output_id {
            if argc != 1 {
                self.errors
                    .push(SemanticError::arg_count_mismatch(line, &name));
                self.ss.truncate(frame.ss_depth);
                return;
            }
            let value = self
                .ss
                .last()
                .and_then(|item| self.operand(item))
                .unwrap_or(Operand::Imm(0));
            self.pb
                .emit(Instr::new(OpCode::Print, value, None, None));
            self.ss_pop(1);
            return;
        }

        let params = self.items[callee].params.clone();
        if argc != params.len() {
            self.errors
                .push(SemanticError::arg_count_mismatch(line, &name));
            self.ss.truncate(frame.ss_depth.saturating_sub(1));
            self.ss.push(SsItem::Imm(0));
            return;
        }

        // A recursive call overwrites the frame being translated: push the
        // return-jump slot and every live local onto the runtime stack
        // first, and pop them back after the callee returns.
        let saved = if self.decl_stack.last() == Some(&callee) {
            self.live_addresses(callee)
        } else {
            Vec::new()
        };
        for &addr in &saved {
            self.pb.emit(Instr::new(
                OpCode::Assign,
                Operand::Direct(addr),
                Operand::Indirect(SP_ADDR),
                None,
            ));
            self.pb.emit(Instr::new(
                OpCode::Add,
                Operand::Imm(WORD as i64),
                Operand::Direct(SP_ADDR),
                Operand::Direct(SP_ADDR),
            ));
        }

        // Bind arguments to formals, last first.
        for (position, &param) in params.iter().enumerate().rev() {
            let Some(arg) = self.ss.last().cloned() else { break };
            let got = self.value_kind(&arg);
            let expected = match self.items[param].role {
                Some(Role::Array) => ValueKind::Array,
                _ => ValueKind::Int,
            };
            if got != expected {
                self.errors.push(SemanticError::arg_type_mismatch(
                    line,
                    position + 1,
                    &name,
                    expected,
                    got,
                ));
            }
            if let (Some(src), Some(dst)) = (self.operand(&arg), self.items[param].mem) {
                self.pb
                    .emit(Instr::new(OpCode::Assign, src, Operand::Direct(dst), None));
            }
            self.ss_pop(1);
        }

        // Store the return address, then enter the callee.
        let ret_slot = self.items[callee].mem.unwrap_or(0);
        let here = self.pb.cursor();
        self.pb.emit(Instr::new(
            OpCode::Assign,
            Operand::Imm((here + 2) as i64),
            Operand::Direct(ret_slot),
            None,
        ));
        let entry = self.items[callee].code.unwrap_or(0);
        self.pb.emit(Instr::new(
            OpCode::Jp,
            Operand::Direct(entry as u32),
            None,
            None,
        ));

        // Restore the saved frame in reverse.
        for &addr in saved.iter().rev() {
            self.pb.emit(Instr::new(
                OpCode::Sub,
                Operand::Direct(SP_ADDR),
                Operand::Imm(WORD as i64),
                Operand::Direct(SP_ADDR),
            ));
            self.pb.emit(Instr::new(
                OpCode::Assign,
                Operand::Indirect(SP_ADDR),
                Operand::Direct(addr),
                None,
            ));
        }

        // The call's value: the callee's return slot for int functions,
        // zero for void ones.
        let temp = self.new_temp();
        let result = if self.items[callee].ty == Some(Ty::Int) {
            Operand::Direct(ret_slot + WORD)
        } else {
            Operand::Imm(0)
        };
        self.pb
            .emit(Instr::new(OpCode::Assign, result, Operand::Direct(temp), None));
        // Replace the callable handle left by PID with the result.
        self.ss_pop(1);
        self.ss.push(SsItem::Addr(temp));
    }

    /// The caller-visible state of `func`: its return-jump slot plus every
    /// live local between its scope entry and the top, scanned top-down.
    fn live_addresses(&self, func: crate::ItemId) -> Vec<u32> {
        let mut addrs = vec![self.items[func].mem.unwrap_or(0)];
        for entry in self.scope.iter().rev() {
            match entry {
                ScopeEntry::Item(id) if *id == func => break,
                ScopeEntry::Item(id) => {
                    if let Some(addr) = self.items[*id].mem {
                        addrs.push(addr);
                    }
                }
                ScopeEntry::Mark => {}
            }
        }
        addrs
    }
}
