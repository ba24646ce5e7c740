use crate::visibility::{
    authorizations::Authorizations,
    parser::{Parser, VisibilityParseError},
};

///
/// VisibilityExpr
///
/// Parsed visibility formula. Composite nodes always hold at least two
/// children, and a composite never directly contains a child of its own kind
/// (adjacent same-kind operators are flattened during construction).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VisibilityExpr {
    Term(Vec<u8>),
    And(Vec<Self>),
    Or(Vec<Self>),
}

impl VisibilityExpr {
    pub fn parse(bytes: &[u8]) -> Result<Self, VisibilityParseError> {
        Parser::parse(bytes)
    }

    #[must_use]
    pub fn term(label: impl Into<Vec<u8>>) -> Self {
        Self::Term(label.into())
    }

    /// True iff the caller's labels satisfy the formula.
    #[must_use]
    pub fn evaluate(&self, authorizations: &Authorizations) -> bool {
        match self {
            Self::Term(label) => authorizations.contains(label),
            Self::And(children) => children.iter().all(|c| c.evaluate(authorizations)),
            Self::Or(children) => children.iter().any(|c| c.evaluate(authorizations)),
        }
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Term(_) => &[],
            Self::And(children) | Self::Or(children) => children,
        }
    }
}
