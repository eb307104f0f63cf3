//! Evaluation of `{% if %}` blocks.

use serde_yaml::Value;
use tracing::debug;

use super::operand::{Operand, Operator};
use super::scanner::{self, BlockHeader, DirectiveBlock, DirectiveKind};
use crate::error::{Result, WheelhouseError};

/// A parsed `{% if LEFT OP RIGHT %}` header.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub left: String,
    pub operator: Operator,
    pub right: String,
    pub line: usize,
}

impl Condition {
    fn from_block(block: &DirectiveBlock) -> Result<Self> {
        let BlockHeader::Conditional {
            left,
            operator,
            right,
        } = &block.header
        else {
            return Err(WheelhouseError::UnbalancedBlock {
                kind: DirectiveKind::Conditional.keyword().to_string(),
                message: format!("block on line {} is not a conditional", block.line),
            });
        };

        let operator = operator
            .parse::<Operator>()
            .map_err(|_| WheelhouseError::UnknownOperator {
                token: operator.clone(),
                line: block.line,
            })?;

        Ok(Self {
            left: left.clone(),
            operator,
            right: right.clone(),
            line: block.line,
        })
    }

    /// Resolve both operands against `doc` and apply the operator.
    pub fn evaluate(&self, doc: &Value) -> Result<bool> {
        let left = Operand::parse(&self.left, doc)?;
        let right = Operand::parse(&self.right, doc)?;

        self.operator
            .evaluate(&left, &right)
            .map_err(|message| WheelhouseError::OperandResolutionError {
                operand: format!("{} {} {}", self.left, self.operator, self.right),
                message: format!("{} (line {})", message, self.line),
            })
    }
}

/// Keep or drop every conditional block in `text`.
///
/// A true block is replaced by its trimmed body plus a newline; a false
/// block disappears along with its markers. Every operator is checked before
/// any block is evaluated.
pub fn evaluate_conditionals(text: &str, doc: &Value) -> Result<String> {
    let blocks = scanner::scan(text, DirectiveKind::Conditional)?;
    debug!("Found {} conditional blocks", blocks.len());

    let conditions = blocks
        .iter()
        .map(Condition::from_block)
        .collect::<Result<Vec<_>>>()?;

    scanner::rewrite_blocks(text, &blocks, |index, block| {
        let condition = &conditions[index];
        if condition.evaluate(doc)? {
            Ok(format!("{}\n", block.body_text(text)))
        } else {
            debug!(line = condition.line, "dropping conditional block");
            Ok(String::new())
        }
    })
}
