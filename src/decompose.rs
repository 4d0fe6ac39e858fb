//! Boolean decomposition of guard expressions into condition lists.

use crate::catalog::Catalog;
use crate::condition::{Condition, InvertError};
use crate::syntax::{BinaryOp, Expr};

/// Split a guard into the conjunction of conditions it denotes.
///
/// The whole expression is tried against the catalog first. Failing that, a
/// top-level `&&` is split and both sides decomposed; if either side fails
/// the whole guard fails. Other operators, `||` included, are never split.
pub fn decompose(catalog: &Catalog, expr: &Expr) -> Option<Vec<Condition>> {
    decompose_traced(catalog, expr, &mut Vec::new())
}

/// As `decompose`, also collecting the inversion failures met on the way.
/// A failed inversion makes that operand unrecognized.
pub fn decompose_traced(
    catalog: &Catalog,
    expr: &Expr,
    failures: &mut Vec<InvertError>,
) -> Option<Vec<Condition>> {
    match catalog.match_expr(expr) {
        Ok(Some(condition)) => return Some(vec![condition]),
        Ok(None) => {}
        Err(e) => {
            failures.push(e);
            return None;
        }
    }

    let Expr::Binary {
        op: BinaryOp::And,
        left,
        right,
    } = expr
    else {
        return None;
    };

    let mut conditions = decompose_traced(catalog, left, failures)?;
    conditions.extend(decompose_traced(catalog, right, failures)?);
    Some(conditions)
}
