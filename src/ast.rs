//! Generic tagged syntax tree built from the PEG parse result.
//!
//! The evaluator dispatches on rule tags rather than on a typed node
//! enum, so the tree keeps the grammar's shape: every node carries its
//! rule, a 1-based source position, an optional token text (for atomic
//! rules) and shared children. During construction any node with exactly
//! one child is replaced by that child; `parameters`, `arguments`,
//! `object` and `array` are kept even then, because an argument list or
//! aggregate literal is one regardless of how many entries it holds.
//! A collapsed node remembers the outermost rule
//! it replaced in `original_rule`, which is how the call-suffix fold
//! still recognizes `index` and `dot` after their single operands were
//! hoisted into their place.

use crate::parser::Rule;
use pest::iterators::Pair;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::rc::Rc;

/// Shared handle to a syntax tree node.
pub type AstRef = Rc<Ast>;

/// One node of the parsed tree.
#[derive(Debug)]
pub struct Ast {
    /// Rule this node evaluates as.
    pub rule: Rule,
    /// Outermost rule collapsed into this node; equals `rule` when the
    /// node was never hoisted.
    pub original_rule: Rule,
    /// 1-based source line of the node's first character.
    pub line: usize,
    /// 1-based source column of the node's first character.
    pub column: usize,
    /// Matched text for token rules, `None` for interior nodes.
    pub token: Option<String>,
    pub children: Vec<AstRef>,
}

impl Ast {
    /// Whether this node is a token leaf.
    pub fn is_token(&self) -> bool {
        self.token.is_some()
    }
}

/// Build a tree from one parsed pair, hoisting single-child nodes.
pub fn build(pair: Pair<Rule>) -> Ast {
    let rule = pair.as_rule();
    let (line, column) = pair.as_span().start_pos().line_col();
    let token = is_token_rule(rule).then(|| pair.as_str().to_string());

    let mut children: Vec<Ast> = pair
        .into_inner()
        .filter(|inner| inner.as_rule() != Rule::EOI)
        .map(build)
        .collect();

    if children.len() == 1 && !keep_single_child(rule) {
        if let Some(mut child) = children.pop() {
            child.original_rule = rule;
            return child;
        }
    }

    Ast {
        rule,
        original_rule: rule,
        line,
        column,
        token,
        children: children.into_iter().map(Rc::new).collect(),
    }
}

/// Rules preserved in the tree even when they match a single child.
fn keep_single_child(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::parameters | Rule::arguments | Rule::object | Rule::array
    )
}

/// Rules whose matched text is the payload.
fn is_token_rule(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::identifier
            | Rule::number
            | Rule::boolean
            | Rule::undefined_literal
            | Rule::string_content
            | Rule::interpolated_content
            | Rule::mutable
            | Rule::condition_operator
            | Rule::additive_operator
            | Rule::unary_plus_operator
            | Rule::unary_minus_operator
            | Rule::unary_not_operator
            | Rule::multiplicative_operator
    )
}

impl Serialize for Ast {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut node = serializer.serialize_struct("Ast", 6)?;
        node.serialize_field("rule", &format!("{:?}", self.rule))?;
        if self.original_rule != self.rule {
            node.serialize_field("original", &format!("{:?}", self.original_rule))?;
        }
        node.serialize_field("line", &self.line)?;
        node.serialize_field("column", &self.column)?;
        if let Some(token) = &self.token {
            node.serialize_field("token", token)?;
        }
        if !self.children.is_empty() {
            node.serialize_field("children", &self.children)?;
        }
        node.end()
    }
}
