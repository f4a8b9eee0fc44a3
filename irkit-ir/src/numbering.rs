//! Local ID assignment
//!
//! Unnamed parameters, basic blocks and value-producing instructions of a
//! function definition receive sequential decimal IDs in the order
//! parameters, then for each block: the block, its non-void instructions and
//! its terminator when it yields a value.
//!
//! Entities that already carry a numeric name must match the running counter.
//! The pass stops at the first mismatch and does not undo the names it has
//! already assigned.

use crate::blocks::Term;
use crate::function::Function;
use crate::values::{NamedRef, Value};
use irkit_common::{enc, IrError, IrResult};
use log::{debug, trace};
use std::collections::BTreeMap;

/// IDs assigned by one numbering run, keyed by counter value
pub type LocalIds = BTreeMap<usize, NamedRef>;

struct IdAssigner {
    func: String,
    next_id: usize,
    assigned: LocalIds,
}

impl IdAssigner {
    fn new(func: String) -> Self {
        Self {
            func,
            next_id: 0,
            assigned: BTreeMap::new(),
        }
    }

    fn visit(&mut self, entity: NamedRef) -> IrResult<()> {
        let got = entity.name();
        if got.is_empty() {
            let id = self.next_id.to_string();
            trace!("{}: assigning %{}", self.func, id);
            entity.set_name(&id);
            self.assigned.insert(self.next_id, entity);
            self.next_id += 1;
        } else if enc::is_local_id(&got) {
            let want = self.next_id.to_string();
            if want != got {
                return Err(IrError::LocalIdMismatch {
                    func: self.func.clone(),
                    expected: want,
                    got,
                });
            }
            self.next_id += 1;
        }
        Ok(())
    }
}

/// Numbers the unnamed local entities of `func`. Declarations are left
/// untouched.
pub fn assign_ids(func: &Function) -> IrResult<LocalIds> {
    if func.is_declaration() {
        return Ok(LocalIds::new());
    }
    let mut assigner = IdAssigner::new(func.ident());

    for param in func.params() {
        assigner.visit(param.clone())?;
    }
    for block in func.blocks() {
        assigner.visit(block.clone())?;
        for inst in block.insts().iter() {
            if inst.is_void() {
                continue;
            }
            assigner.visit(inst.clone())?;
        }
        let result = block.term().as_ref().and_then(Term::named_result);
        if let Some(result) = result {
            assigner.visit(result)?;
        }
    }

    debug!(
        "{}: assigned {} local IDs, next ID is {}",
        assigner.func,
        assigner.assigned.len(),
        assigner.next_id
    );
    Ok(assigner.assigned)
}
