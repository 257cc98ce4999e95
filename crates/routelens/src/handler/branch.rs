//! Branch attribution for response calls.
//!
//! The handler walker pushes a key when it enters an `if` consequent, an
//! `else`, a `try` block or a `catch` clause and pops it on the way out. The
//! key on top of the stack is the nearest enclosing branch, so a response call
//! nested several levels deep is attributed to the innermost one only.

use oxc_ast::ast::Expression;
use oxc_span::GetSpan;

use crate::loader::ParsedModule;
use crate::model::BranchKey;

#[derive(Debug, Default)]
pub struct BranchStack {
    stack: Vec<BranchKey>,
}

impl BranchStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// The branch of the code currently being walked.
    pub fn current(&self) -> &BranchKey {
        self.stack.last().unwrap_or(&BranchKey::Default)
    }

    pub fn enter(&mut self, key: BranchKey) {
        self.stack.push(key);
    }

    pub fn leave(&mut self) {
        self.stack.pop();
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Key for the consequent of `if (<test>)`: the test's source text exactly
/// as written, line breaks included.
pub fn if_key(module: &ParsedModule<'_>, test: &Expression<'_>) -> BranchKey {
    BranchKey::If(module.text(test.span()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_key_wins() {
        let mut branches = BranchStack::new();
        assert_eq!(branches.current(), &BranchKey::Default);

        branches.enter(BranchKey::Try);
        branches.enter(BranchKey::If("user".to_string()));
        assert_eq!(branches.current(), &BranchKey::If("user".to_string()));

        branches.leave();
        assert_eq!(branches.current(), &BranchKey::Try);
        branches.leave();
        assert_eq!(branches.current(), &BranchKey::Default);
        assert_eq!(branches.depth(), 0);
    }
}
