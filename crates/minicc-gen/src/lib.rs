//! minicc-gen - Code Generator
//!
//! A stack-machine translator driven by the semantic-action symbols the
//! parser encounters while reducing right-hand sides. It owns the program
//! block, the data-memory cursor, the semantic stack, the scope stack with
//! its sentinels, the declaration/call stacks and the break stack; it never
//! consumes tokens.
//!
//! Addresses are flat data-memory words. Word 0 is the runtime stack
//! pointer `SP`, program-block slot 0 initialises it, slot 1 is reserved
//! for the jump to `main`, and user data starts at word 500.

mod actions;
pub mod item;
pub mod program;

use minicc_par::{ActionSink, SemanticAction};
use minicc_util::{SemanticError, ValueKind};

pub use item::{ItemArena, ItemId, Role, ScopeEntry, ScopeItem, Ty};
pub use program::{Instr, OpCode, Operand, ProgramBlock};

/// Data address of the runtime stack pointer.
pub const SP_ADDR: u32 = 0;
/// Program-block slot reserved for the jump to `main`.
pub const JUMP_TO_MAIN_SLOT: usize = 1;
/// First data address handed out to declarations and temporaries.
pub const DATA_BASE: u32 = 500;
/// Bytes per data word.
pub const WORD: u32 = 4;

/// One semantic-stack entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsItem {
    /// A data-memory address.
    Addr(u32),
    /// An immediate value `#N`.
    Imm(i64),
    /// An indirect address `@N`.
    Ind(u32),
    /// An opcode staged by an operator symbol.
    Op(OpCode),
    /// A reserved program-block index awaiting back-patch.
    Slot(usize),
}

/// A call in flight: the resolved callee (if any) and the semantic-stack
/// depth when the call opened, which fixes the argument count at the end.
#[derive(Debug)]
pub(crate) struct CallFrame {
    pub(crate) callee: Option<ItemId>,
    pub(crate) ss_depth: usize,
}

/// The translator state. Feed it actions through [`ActionSink::dispatch`].
pub struct CodeGen {
    pub(crate) items: ItemArena,
    pub(crate) scope: Vec<ScopeEntry>,
    pub(crate) output_id: ItemId,
    pub(crate) ss: Vec<SsItem>,
    pub(crate) pb: ProgramBlock,
    pub(crate) mem: u32,
    pub(crate) decl_stack: Vec<ItemId>,
    pub(crate) call_stack: Vec<CallFrame>,
    pub(crate) break_stack: Vec<Vec<usize>>,
    pub(crate) errors: Vec<SemanticError>,
}

impl CodeGen {
    pub fn new() -> Self {
        let mut items = ItemArena::new();
        let out_param = items.alloc(ScopeItem {
            ty: Some(Ty::Int),
            role: Some(Role::Variable),
            ..Default::default()
        });
        let output_id = items.alloc(ScopeItem {
            name: "output".to_string(),
            ty: Some(Ty::Void),
            role: Some(Role::Function),
            params: vec![out_param],
            ..Default::default()
        });

        let mut pb = ProgramBlock::new();
        pb.emit(Instr::new(
            OpCode::Assign,
            Operand::Imm(WORD as i64),
            Operand::Direct(SP_ADDR),
            None,
        ));
        let reserved = pb.reserve();
        debug_assert_eq!(reserved, JUMP_TO_MAIN_SLOT);

        Self {
            items,
            scope: vec![ScopeEntry::Item(output_id)],
            output_id,
            ss: Vec::new(),
            pb,
            mem: DATA_BASE,
            decl_stack: Vec::new(),
            call_stack: Vec::new(),
            break_stack: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[SemanticError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn program(&self) -> &ProgramBlock {
        &self.pb
    }

    // ------------------------------------------------------------------
    // Shared helpers for the action routines
    // ------------------------------------------------------------------

    /// Drops up to `count` entries; popping past the bottom is a no-op, as
    /// malformed input recovered by the parser can unbalance the stack.
    pub(crate) fn ss_pop(&mut self, count: usize) {
        let keep = self.ss.len().saturating_sub(count);
        self.ss.truncate(keep);
    }

    /// The entry `depth` positions below the top.
    pub(crate) fn ss_get(&self, depth: usize) -> Option<&SsItem> {
        self.ss
            .len()
            .checked_sub(depth + 1)
            .map(|index| &self.ss[index])
    }

    /// Renders a stack entry as an instruction operand. Staged opcodes and
    /// saved slots are bookkeeping, not operands.
    pub(crate) fn operand(&self, item: &SsItem) -> Option<Operand> {
        match item {
            SsItem::Addr(addr) => Some(Operand::Direct(*addr)),
            SsItem::Imm(value) => Some(Operand::Imm(*value)),
            SsItem::Ind(addr) => Some(Operand::Indirect(*addr)),
            SsItem::Op(_) | SsItem::Slot(_) => None,
        }
    }

    pub(crate) fn new_temp(&mut self) -> u32 {
        let temp = self.mem;
        self.mem += WORD;
        temp
    }

    /// Name resolution: topmost matching item, sentinels skipped.
    pub(crate) fn lookup(&self, name: &str) -> Option<ItemId> {
        self.scope.iter().rev().find_map(|entry| match entry {
            ScopeEntry::Item(id) if self.items[*id].name == name => Some(*id),
            _ => None,
        })
    }

    /// The item currently under construction, when the top of the scope
    /// stack is one.
    pub(crate) fn top_item(&self) -> Option<ItemId> {
        match self.scope.last() {
            Some(ScopeEntry::Item(id)) => Some(*id),
            _ => None,
        }
    }

    /// Array-ness of an operand: a direct address naming a live array's
    /// base word is an array, everything else is an int.
    pub(crate) fn value_kind(&self, item: &SsItem) -> ValueKind {
        if let SsItem::Addr(addr) = item {
            for entry in &self.scope {
                if let ScopeEntry::Item(id) = entry {
                    let candidate = &self.items[*id];
                    if candidate.role == Some(Role::Array) && candidate.mem == Some(*addr) {
                        return ValueKind::Array;
                    }
                }
            }
        }
        ValueKind::Int
    }
}

impl Default for CodeGen {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionSink for CodeGen {
    fn dispatch(&mut self, action: SemanticAction, line: u32, lexeme: &str) {
        use SemanticAction as A;
        match action {
            A::ScopeEnter => self.scope_enter(),
            A::ScopeExit => self.scope_exit(),
            A::TypeSpecifierInt => self.type_specifier(Ty::Int),
            A::TypeSpecifierVoid => self.type_specifier(Ty::Void),
            A::BeginDeclaration => self.begin_declaration(),
            A::AssignName => self.assign_name(lexeme),
            A::DeclarationRoleFunction => self.declaration_role_function(),
            A::DeclarationRoleVariable => self.declaration_role_variable(line),
            A::DeclarationRoleArray => self.declaration_role_array(line),
            A::BeginFunctionStatement => self.begin_function_statement(),
            A::EndFunctionStatement => self.end_function_statement(),
            A::ParamRoleInt => self.param_role(Role::Variable),
            A::ParamRoleArray => self.param_role(Role::Array),
            A::FunctionReturnValue => self.function_return_value(line),
            A::FunctionReturnJump => self.function_return_jump(),
            A::CheckBreakJpSave => self.check_break(line),
            A::BeginFunctionCall => self.begin_function_call(line, lexeme),
            A::EndFunctionCall => self.end_function_call(line),
            A::Pop => self.pop(),
            A::Save => self.save(),
            A::Label => self.label(),
            A::Jpf => self.jpf(),
            A::JpfSave => self.jpf_save(),
            A::Jp => self.jp(),
            A::SaveJump => self.save_jump(),
            A::JumpFill => self.jump_fill(),
            A::For => self.for_loop_end(),
            A::IndexArrayPop => self.index_array_pop(),
            A::Pid => self.pid(line, lexeme),
            A::Pnum => self.pnum(lexeme),
            A::PushPlus => self.push_op(OpCode::Add),
            A::PushMinus => self.push_op(OpCode::Sub),
            A::NegateSsTop => self.negate_ss_top(),
            A::DoAddop => self.apply_operator(line),
            A::PushRelopGreater => self.push_op(OpCode::Lt),
            A::PushRelopEqual => self.push_op(OpCode::Eq),
            A::DoRelop => self.apply_operator(line),
            A::PidAssign => self.pid_assign(line),
            A::DoMultiply => self.do_multiply(line),
        }
    }
}
