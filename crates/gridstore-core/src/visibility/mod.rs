//! Module: visibility
//! Responsibility: field-level access control formulas (parse, evaluate, merge).
//! Does not own: which formula a field carries; that comes from field codecs
//! and caller-supplied visibility writers.
//!
//! Grammar: `expr := term | expr '&' expr | expr '|' expr | '(' expr ')'`.
//! Terms are maximal runs of bytes outside `&|()`. `&` and `|` never mix at
//! one nesting level without parentheses. An empty formula is visible to
//! everyone; an unparseable one is visible to no one.

mod authorizations;
mod expr;
mod parser;
mod writer;


pub use authorizations::Authorizations;
pub use expr::VisibilityExpr;
pub use parser::{MAX_NESTING_DEPTH, VisibilityParseError};
pub use writer::{
    FieldVisibilityHandler, GlobalVisibilityHandler, UnconstrainedVisibilityHandler,
    UniformVisibilityWriter, VisibilityWriter,
};

use tracing::warn;

/// Decide whether `visibility` admits a caller holding `authorizations`.
/// Fails closed on a malformed formula.
#[must_use]
pub fn is_authorized(visibility: &[u8], authorizations: &Authorizations) -> bool {
    if visibility.is_empty() {
        return true;
    }

    match VisibilityExpr::parse(visibility) {
        Ok(expr) => expr.evaluate(authorizations),
        Err(err) => {
            warn!(
                visibility = %String::from_utf8_lossy(visibility),
                error = %err,
                "invalid visibility expression; treating as unauthorized"
            );
            false
        }
    }
}

/// Conjunction of two formulas as raw bytes: `(vis1)&(vis2)`.
/// An empty side yields the other side unchanged.
///
/// A malformed side keeps the result malformed: it is emitted behind an
/// unmatched `)`, which no well-formed formula can start with, so the
/// merged formula denies every caller just as that side would. The
/// conjunction nests one level deeper than its deeper side.
#[must_use]
pub fn merge(vis1: &[u8], vis2: &[u8]) -> Vec<u8> {
    if vis1.is_empty() {
        return vis2.to_vec();
    }
    if vis2.is_empty() {
        return vis1.to_vec();
    }

    let mut out = Vec::with_capacity(vis1.len() + vis2.len() + 6);
    if let Some(err) = [vis1, vis2]
        .into_iter()
        .find_map(|vis| VisibilityExpr::parse(vis).err())
    {
        warn!(
            left = %String::from_utf8_lossy(vis1),
            right = %String::from_utf8_lossy(vis2),
            error = %err,
            "merging an invalid visibility expression; result denies every caller"
        );
        out.push(b')');
    }
    out.push(b'(');
    out.extend_from_slice(vis1);
    out.extend_from_slice(b")&(");
    out.extend_from_slice(vis2);
    out.push(b')');

    out
}
