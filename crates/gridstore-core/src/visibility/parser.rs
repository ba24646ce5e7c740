use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    visibility::expr::VisibilityExpr,
};
use thiserror::Error as ThisError;

/// Maximum parenthesis nesting accepted by the parser.
pub const MAX_NESTING_DEPTH: usize = 64;

///
/// VisibilityParseError
///
/// Grammar violations. Positions are byte offsets into the formula.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum VisibilityParseError {
    #[error("cannot mix '&' and '|' without parentheses at {position}")]
    MixedOperators { position: usize },

    #[error("empty term at {position}")]
    EmptyTerm { position: usize },

    #[error("unbalanced parentheses at {position}")]
    UnbalancedParens { position: usize },

    #[error("operator is missing its right-hand term at {position}")]
    MissingTerm { position: usize },

    #[error("expression needs '&' or '|' at {position}")]
    MissingOperator { position: usize },

    #[error("parentheses nested deeper than {max} at {position}")]
    NestingTooDeep { position: usize, max: usize },
}

impl VisibilityParseError {
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::MixedOperators { position }
            | Self::EmptyTerm { position }
            | Self::UnbalancedParens { position }
            | Self::MissingTerm { position }
            | Self::MissingOperator { position }
            | Self::NestingTooDeep { position, .. } => *position,
        }
    }
}

impl From<VisibilityParseError> for InternalError {
    fn from(err: VisibilityParseError) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Visibility,
            err.to_string(),
        )
    }
}

///
/// Operator
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Operator {
    And,
    Or,
}

impl Operator {
    const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'&' => Some(Self::And),
            b'|' => Some(Self::Or),
            _ => None,
        }
    }
}

///
/// Group
///
/// Children collected under one operator at one nesting level.
///

struct Group {
    op: Operator,
    children: Vec<VisibilityExpr>,
}

impl Group {
    fn new(op: Operator, first: VisibilityExpr) -> Self {
        let mut group = Self {
            op,
            children: Vec::with_capacity(2),
        };
        group.push(first);

        group
    }

    // Same-kind children are absorbed so `(a&b)&c` becomes one And node.
    fn push(&mut self, child: VisibilityExpr) {
        match (self.op, child) {
            (Operator::And, VisibilityExpr::And(nested))
            | (Operator::Or, VisibilityExpr::Or(nested)) => self.children.extend(nested),
            (_, child) => self.children.push(child),
        }
    }

    fn into_expr(self) -> VisibilityExpr {
        match self.op {
            Operator::And => VisibilityExpr::And(self.children),
            Operator::Or => VisibilityExpr::Or(self.children),
        }
    }
}

///
/// Parser
///
/// Recursive-descent parser over the raw formula bytes. One call to
/// `parse_group` consumes one parenthesis level.
///

pub(super) struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn parse(input: &'a [u8]) -> Result<VisibilityExpr, VisibilityParseError> {
        if input.is_empty() {
            return Err(VisibilityParseError::EmptyTerm { position: 0 });
        }

        let mut parser = Self {
            input,
            pos: 0,
            depth: 0,
        };
        let expr = parser.parse_group()?;

        if parser.depth != 0 || parser.pos != input.len() {
            return Err(VisibilityParseError::UnbalancedParens {
                position: parser.pos.saturating_sub(1),
            });
        }

        Ok(expr)
    }

    fn parse_group(&mut self) -> Result<VisibilityExpr, VisibilityParseError> {
        let mut group: Option<Group> = None;
        let mut pending: Option<VisibilityExpr> = None;
        let mut term_start = self.pos;

        while self.pos < self.input.len() {
            let at = self.pos;
            let byte = self.input[at];
            self.pos += 1;

            if let Some(op) = Operator::from_byte(byte) {
                let child = self.take_term(term_start, at, pending.take())?;
                match group.as_mut() {
                    Some(g) if g.op != op => {
                        return Err(VisibilityParseError::MixedOperators { position: at });
                    }
                    Some(g) => g.push(child),
                    None => group = Some(Group::new(op, child)),
                }
                term_start = self.pos;
                continue;
            }

            match byte {
                b'(' => {
                    if term_start != at || pending.is_some() {
                        return Err(VisibilityParseError::MissingOperator { position: at });
                    }
                    self.depth += 1;
                    if self.depth > MAX_NESTING_DEPTH {
                        return Err(VisibilityParseError::NestingTooDeep {
                            position: at,
                            max: MAX_NESTING_DEPTH,
                        });
                    }
                    pending = Some(self.parse_group()?);
                    term_start = self.pos;
                }
                b')' => {
                    if self.depth == 0 {
                        return Err(VisibilityParseError::UnbalancedParens { position: at });
                    }
                    self.depth -= 1;
                    let child =
                        self.take_last_term(term_start, at, pending.take(), group.is_some())?;

                    return Ok(finish(group, child));
                }
                _ => {}
            }
        }

        let child =
            self.take_last_term(term_start, self.pos, pending.take(), group.is_some())?;

        Ok(finish(group, child))
    }

    // Resolve the operand ending at `end`: either the raw term bytes or the
    // parenthesised group parsed just before it, never both.
    fn take_term(
        &self,
        start: usize,
        end: usize,
        pending: Option<VisibilityExpr>,
    ) -> Result<VisibilityExpr, VisibilityParseError> {
        if start != end {
            if pending.is_some() {
                return Err(VisibilityParseError::MissingOperator { position: start });
            }
            return Ok(VisibilityExpr::Term(self.input[start..end].to_vec()));
        }

        pending.ok_or(VisibilityParseError::EmptyTerm { position: start })
    }

    // The last operand of a level; an empty one after an operator is a
    // missing term rather than an empty one.
    fn take_last_term(
        &self,
        start: usize,
        end: usize,
        pending: Option<VisibilityExpr>,
        after_operator: bool,
    ) -> Result<VisibilityExpr, VisibilityParseError> {
        if start == end && pending.is_none() && after_operator {
            return Err(VisibilityParseError::MissingTerm { position: end });
        }

        self.take_term(start, end, pending)
    }
}

fn finish(group: Option<Group>, last: VisibilityExpr) -> VisibilityExpr {
    match group {
        Some(mut g) => {
            g.push(last);
            g.into_expr()
        }
        None => last,
    }
}
