use std::sync::Arc;

use super::procedure::Procedure;

/// One call-stack entry.
///
/// Activations are immutable once built and shared by `Arc`; a nested call
/// builds a new activation whose parent is the caller's. Progress through
/// the body lives in the [`Context`](super::context::Context), never here,
/// so any number of agents may run against the same activation.
#[derive(Debug)]
pub struct Activation {
    procedure: Arc<Procedure>,
    parent: Option<Arc<Activation>>,
    return_address: usize,
}

impl Activation {
    /// Build a new frame
    pub fn new(
        procedure: Arc<Procedure>,
        parent: Option<Arc<Activation>>,
        return_address: usize,
    ) -> Arc<Self> {
        Arc::new(Self {
            procedure,
            parent,
            return_address,
        })
    }

    /// Build a root frame with no caller
    pub fn root(procedure: Arc<Procedure>, return_address: usize) -> Arc<Self> {
        Self::new(procedure, None, return_address)
    }

    /// Procedure whose body this frame executes
    pub fn procedure(&self) -> &Arc<Procedure> {
        &self.procedure
    }

    /// Calling frame
    pub fn parent(&self) -> Option<&Arc<Activation>> {
        self.parent.as_ref()
    }

    /// Address in the parent's body to resume at
    pub fn return_address(&self) -> usize {
        self.return_address
    }

    /// Whether this frame has no caller
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of frames in the chain, including this one
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self.parent.as_ref();
        while let Some(frame) = current {
            depth += 1;
            current = frame.parent.as_ref();
        }
        depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::procedure::Instruction;

    #[test]
    fn test_chain() {
        let outer = Procedure::command("go", vec![Instruction::Noop]);
        let inner = Procedure::command("move", vec![Instruction::Return]);

        let root = Activation::root(outer.clone(), 0);
        let call = Activation::new(inner, Some(root.clone()), 1);

        assert!(root.is_root());
        assert_eq!(root.depth(), 1);
        assert!(!call.is_root());
        assert_eq!(call.depth(), 2);
        assert_eq!(call.return_address(), 1);
        assert!(Arc::ptr_eq(call.parent().unwrap(), &root));
        assert!(Arc::ptr_eq(root.procedure(), &outer));
    }
}
