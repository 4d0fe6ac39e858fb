//! Control-flow walker for one shop's statements.
//!
//! Keeps a stack of active conditions: entering a recognized guard pushes
//! its decomposed conditions, leaving it truncates the stack back. Item
//! registrations snapshot the stack into the shop being built.

use std::sync::LazyLock;

use crate::catalog::{Catalog, entries::HELPERS};
use crate::condition::{Condition, ConditionTag, InvertError};
use crate::config::AnalysisConfig;
use crate::decompose::decompose_traced;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::model::{Shop, ShopBuilder};
use crate::pattern::{Pattern, PatternError};
use crate::syntax::{BinaryOp, Expr, ForInit, Stmt, SwitchSection, UnaryOp};

/// `<local player>.inventory[i].type == <item id>`
static INVENTORY_CHECK: LazyLock<Result<Pattern, PatternError>> = LazyLock::new(|| {
    Pattern::compile_with(
        "(eq (member (index (member #local_player :inventory) (ident $_)) :type) $(int _))",
        HELPERS,
    )
});

/// A `for` loop over a literal integer range.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CountingLoop<'a> {
    var: &'a str,
    start: i64,
    end: i64,
    inclusive: bool,
}

enum LoopShape<'a> {
    Counting(CountingLoop<'a>),
    /// Right shape, but a bound is not an integer literal.
    Malformed(&'static str),
    Unrecognized,
}

pub struct ShopWalker<'a> {
    catalog: &'a Catalog,
    config: &'a AnalysisConfig,
    shop: ShopBuilder,
    conditions: Vec<Condition>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ShopWalker<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a AnalysisConfig, shop_id: i64) -> Self {
        Self {
            catalog,
            config,
            shop: ShopBuilder::new(shop_id),
            conditions: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Walk a shop's statements and freeze the result.
    pub fn walk(mut self, body: &[Stmt]) -> (Shop, Vec<Diagnostic>) {
        self.visit_block(body);
        (self.shop.freeze(), self.diagnostics)
    }

    /// Run `f` with `conditions` pushed, then restore the stack to its
    /// depth on entry.
    fn with_conditions<R>(&mut self, conditions: &[Condition], f: impl FnOnce(&mut Self) -> R) -> R {
        let depth = self.conditions.len();
        self.conditions.extend_from_slice(conditions);
        let result = f(self);
        self.conditions.truncate(depth);
        result
    }

    fn note(&mut self, kind: DiagnosticKind, construct: impl Into<String>, message: impl Into<String>) {
        let diagnostic = Diagnostic::new(kind, Some(self.shop.id()), construct, message);
        log::debug!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    fn note_inversion(&mut self, error: InvertError, construct: &str) {
        let kind = match error {
            InvertError::NoComplement(_) => DiagnosticKind::FailedInversion,
            InvertError::ContractViolation { .. } => DiagnosticKind::ContractViolation,
        };
        self.note(kind, construct, error.to_string());
    }

    fn register(&mut self, id: i64) {
        self.shop.add_item(id, &self.conditions);
    }

    fn visit_block(&mut self, stmts: &[Stmt]) {
        for (i, stmt) in stmts.iter().enumerate() {
            self.visit_stmt(stmt, &stmts[..i]);
        }
    }

    /// `preceding` holds the statements before `stmt` in its enclosing
    /// statement list.
    fn visit_stmt(&mut self, stmt: &Stmt, preceding: &[Stmt]) {
        match stmt {
            Stmt::Block { body } => self.visit_block(body),
            Stmt::Local(decl) => {
                for init in decl.vars.iter().filter_map(|v| v.init.as_ref()) {
                    self.visit_expr(init);
                }
            }
            Stmt::Expr { expr } => self.visit_expr(expr),
            Stmt::If {
                cond,
                then,
                otherwise,
            } => self.visit_if(cond, then, otherwise.as_deref()),
            Stmt::Switch {
                scrutinee,
                sections,
            } => self.visit_switch(scrutinee, sections),
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => self.visit_for(stmt, init.as_ref(), cond.as_ref(), step, body),
            Stmt::While { cond, .. } => self.visit_while(stmt, cond, preceding),
            Stmt::DoWhile { body, cond } => {
                self.visit_stmt(body, &[]);
                self.visit_expr(cond);
            }
            Stmt::Foreach { iter, body, .. } => {
                self.visit_expr(iter);
                self.visit_stmt(body, &[]);
            }
            Stmt::Return { value: Some(value) } => self.visit_expr(value),
            Stmt::Return { value: None } | Stmt::Break | Stmt::Continue | Stmt::Empty => {}
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        if let Some(id) = self.registration(expr) {
            self.register(id);
            return;
        }
        for child in expr.children() {
            self.visit_expr(child);
        }
    }

    /// Item id of an `array[num].SetDefaults(id)` or
    /// `array[num++].SetDefaults(id)` call.
    fn registration(&self, expr: &Expr) -> Option<i64> {
        let Expr::Call { callee, args } = expr else {
            return None;
        };
        let Expr::Member { target, name } = &**callee else {
            return None;
        };
        if *name != self.config.register_method {
            return None;
        }
        let Expr::Index {
            target: array,
            args: index,
        } = &**target
        else {
            return None;
        };
        if array.as_ident() != Some(self.config.slot_array.as_str()) {
            return None;
        }
        let slot = match index.as_slice() {
            [Expr::Unary {
                op: UnaryOp::PostInc,
                operand,
            }] => operand.as_ident(),
            [slot] => slot.as_ident(),
            _ => None,
        };
        if slot != Some(self.config.slot_index.as_str()) {
            return None;
        }
        match args.as_slice() {
            [id] => {
                let id = id.as_int();
                if id.is_none() {
                    log::debug!("registration without a literal item id: {expr}");
                }
                id
            }
            _ => None,
        }
    }

    fn visit_if(&mut self, cond: &Expr, then: &Stmt, otherwise: Option<&Stmt>) {
        let construct = format!("if ({cond})");
        let mut failures = Vec::new();
        let decomposed = decompose_traced(self.catalog, cond, &mut failures);
        for failure in failures {
            self.note_inversion(failure, &construct);
        }

        let Some(conditions) = decomposed else {
            self.note(
                DiagnosticKind::UnrecognizedGuard,
                &construct,
                "guard matches no known condition; body visited without it",
            );
            self.visit_stmt(then, &[]);
            if let Some(otherwise) = otherwise {
                self.visit_stmt(otherwise, &[]);
            }
            return;
        };

        self.with_conditions(&conditions, |w| w.visit_stmt(then, &[]));

        let Some(otherwise) = otherwise else {
            return;
        };
        let mut inverted = Vec::with_capacity(conditions.len());
        for condition in &conditions {
            match condition.invert() {
                Ok(c) => inverted.push(c),
                Err(e) => self.note_inversion(e, &format!("else of {construct}")),
            }
        }
        self.with_conditions(&inverted, |w| w.visit_stmt(otherwise, &[]));
    }

    /// A nested switch reads as a disjunction: each integer case label
    /// becomes `scrutinee == label` for its section.
    fn visit_switch(&mut self, scrutinee: &Expr, sections: &[SwitchSection]) {
        for section in sections {
            let mut visited = false;
            for value in section.case_values() {
                let construct = format!("case {value}");
                if value.as_int().is_none() {
                    self.note(
                        DiagnosticKind::UnrecognizedLabel,
                        construct,
                        "case label is not an integer literal",
                    );
                    continue;
                }
                let guard = Expr::binary(BinaryOp::Eq, scrutinee.clone(), value.clone());
                let mut failures = Vec::new();
                let decomposed = decompose_traced(self.catalog, &guard, &mut failures);
                for failure in failures {
                    self.note_inversion(failure, &construct);
                }
                match decomposed {
                    Some(conditions) => {
                        self.with_conditions(&conditions, |w| w.visit_block(&section.body));
                        visited = true;
                    }
                    None => self.note(
                        DiagnosticKind::UnrecognizedLabel,
                        format!("{guard}"),
                        "case matches no known condition",
                    ),
                }
            }
            if !visited {
                self.visit_block(&section.body);
            }
        }
    }

    fn visit_for(
        &mut self,
        stmt: &Stmt,
        init: Option<&ForInit>,
        cond: Option<&Expr>,
        step: &[Expr],
        body: &Stmt,
    ) {
        let range = match counting_loop(init, cond, step) {
            LoopShape::Counting(range) => range,
            LoopShape::Malformed(why) => {
                self.note(DiagnosticKind::MalformedBound, stmt.header(), why);
                return;
            }
            LoopShape::Unrecognized => {
                self.note(
                    DiagnosticKind::UnrecognizedLoop,
                    stmt.header(),
                    "loop is not a counting loop over literal bounds; skipped",
                );
                return;
            }
        };

        if range.start == 0 && self.config.is_inventory_bound(range.end) {
            self.visit_inventory_scan(stmt, range.var, body);
        } else {
            self.unroll(stmt, range.start, range.end, range.inclusive);
        }
    }

    /// Collapse a scan over the player's inventory to one pass over the
    /// body of its item check, under a "carries item" condition.
    fn visit_inventory_scan(&mut self, stmt: &Stmt, var: &str, body: &Stmt) {
        let pattern = match &*INVENTORY_CHECK {
            Ok(pattern) => pattern,
            Err(e) => {
                log::error!("inventory check pattern does not compile: {e}");
                return;
            }
        };
        match find_inventory_check(pattern, body, var) {
            Some((item, then)) => {
                let carries = Condition::with_param(ConditionTag::PlayerCarriesItem, item);
                self.with_conditions(&[carries], |w| w.visit_stmt(then, &[]));
            }
            None => self.note(
                DiagnosticKind::UnrecognizedLoop,
                stmt.header(),
                format!("inventory scan has no `inventory[{var}].type == <id>` check"),
            ),
        }
    }

    /// Register one item per integer in the range.
    fn unroll(&mut self, stmt: &Stmt, start: i64, end: i64, inclusive: bool) {
        let count = i128::from(end) - i128::from(start) + i128::from(inclusive);
        if count > self.config.max_unroll as i128 {
            self.note(
                DiagnosticKind::MalformedBound,
                stmt.header(),
                format!(
                    "range of {count} exceeds the unroll limit of {}",
                    self.config.max_unroll
                ),
            );
            return;
        }
        if inclusive {
            (start..=end).for_each(|id| self.register(id));
        } else {
            (start..end).for_each(|id| self.register(id));
        }
    }

    /// `while (i <= UPPER && num < CAPACITY)`: registers every id from the
    /// literal initializer of `i` up to `UPPER` inclusive.
    fn visit_while(&mut self, stmt: &Stmt, cond: &Expr, preceding: &[Stmt]) {
        let Some((var, upper)) = self.accumulation_guard(cond) else {
            self.note(
                DiagnosticKind::UnrecognizedLoop,
                stmt.header(),
                "while loop is not an accumulation loop; skipped",
            );
            return;
        };
        let Some(upper) = upper.as_int() else {
            self.note(
                DiagnosticKind::MalformedBound,
                stmt.header(),
                "upper bound is not an integer literal",
            );
            return;
        };

        let mut decls = preceding.iter().filter_map(|s| match s {
            Stmt::Local(decl) if decl.vars.len() == 1 && decl.vars[0].name == var => {
                Some(&decl.vars[0])
            }
            _ => None,
        });
        let lower = match (decls.next(), decls.next()) {
            (Some(decl), None) => decl.init.as_ref().and_then(Expr::as_int),
            _ => None,
        };
        let Some(lower) = lower else {
            self.note(
                DiagnosticKind::MalformedBound,
                stmt.header(),
                format!("no single `{var}` declaration with an integer literal initializer"),
            );
            return;
        };

        self.unroll(stmt, lower, upper, true);
    }

    fn accumulation_guard<'e>(&self, cond: &'e Expr) -> Option<(&'e str, &'e Expr)> {
        let Expr::Binary {
            op: BinaryOp::And,
            left,
            right,
        } = cond
        else {
            return None;
        };
        let Expr::Binary {
            op: BinaryOp::Le,
            left: var,
            right: upper,
        } = &**left
        else {
            return None;
        };
        let Expr::Binary {
            op: BinaryOp::Lt,
            left: slot,
            right: capacity,
        } = &**right
        else {
            return None;
        };
        let recognized = slot.as_ident() == Some(self.config.slot_index.as_str())
            && capacity.as_int() == Some(self.config.slot_capacity);
        if !recognized {
            return None;
        }
        Some((var.as_ident()?, upper))
    }
}

/// Recognize `for (int i = A; i < B; i++)` (or `<=`, `++i`, `i += 1`).
fn counting_loop<'a>(
    init: Option<&'a ForInit>,
    cond: Option<&'a Expr>,
    step: &'a [Expr],
) -> LoopShape<'a> {
    let Some(ForInit::Decl(decl)) = init else {
        return LoopShape::Unrecognized;
    };
    let [declarator] = decl.vars.as_slice() else {
        return LoopShape::Unrecognized;
    };
    let var = declarator.name.as_str();

    let Some(Expr::Binary { op, left, right }) = cond else {
        return LoopShape::Unrecognized;
    };
    let inclusive = match op {
        BinaryOp::Lt => false,
        BinaryOp::Le => true,
        _ => return LoopShape::Unrecognized,
    };
    if left.as_ident() != Some(var) {
        return LoopShape::Unrecognized;
    }

    let increments = match step {
        [Expr::Unary {
            op: UnaryOp::PostInc | UnaryOp::PreInc,
            operand,
        }] => operand.as_ident() == Some(var),
        [Expr::Assign {
            op: Some(BinaryOp::Add),
            target,
            value,
        }] => target.as_ident() == Some(var) && value.as_int() == Some(1),
        _ => false,
    };
    if !increments {
        return LoopShape::Unrecognized;
    }

    let Some(start) = declarator.init.as_ref().and_then(Expr::as_int) else {
        return LoopShape::Malformed("loop variable is not initialized with an integer literal");
    };
    let Some(end) = right.as_int() else {
        return LoopShape::Malformed("loop bound is not an integer literal");
    };
    LoopShape::Counting(CountingLoop {
        var,
        start,
        end,
        inclusive,
    })
}

/// First `if` (in source order, at any depth) testing the inventory slot
/// `var` against an item id literal.
fn find_inventory_check<'s>(pattern: &Pattern, stmt: &'s Stmt, var: &str) -> Option<(i64, &'s Stmt)> {
    if let Stmt::If { cond, then, .. } = stmt {
        if let Some(captures) = pattern.matches(cond) {
            let slot = captures.first().and_then(|c| c.as_name());
            let item = captures.get(1).and_then(|c| c.as_node()).and_then(Expr::as_int);
            if let (Some(slot), Some(item)) = (slot, item) {
                if slot == var {
                    return Some((item, then));
                }
            }
        }
    }
    nested_statements(stmt)
        .into_iter()
        .find_map(|s| find_inventory_check(pattern, s, var))
}

pub(crate) fn nested_statements(stmt: &Stmt) -> Vec<&Stmt> {
    match stmt {
        Stmt::Block { body } => body.iter().collect(),
        Stmt::If {
            then, otherwise, ..
        } => std::iter::once(&**then).chain(otherwise.as_deref()).collect(),
        Stmt::Switch { sections, .. } => sections.iter().flat_map(|s| &s.body).collect(),
        Stmt::For { body, .. }
        | Stmt::While { body, .. }
        | Stmt::DoWhile { body, .. }
        | Stmt::Foreach { body, .. } => vec![&**body],
        Stmt::Local(_)
        | Stmt::Expr { .. }
        | Stmt::Break
        | Stmt::Continue
        | Stmt::Return { .. }
        | Stmt::Empty => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionTag::*;
    use crate::diagnostic::Severity;
    use crate::model::Item;
    use crate::syntax::parse_procedure;

    fn walk_with(config: &AnalysisConfig, src: &str) -> (Shop, Vec<Diagnostic>) {
        let body = parse_procedure(src).unwrap();
        ShopWalker::new(Catalog::builtin(), config, 1).walk(&body)
    }

    fn walk(src: &str) -> (Shop, Vec<Diagnostic>) {
        walk_with(&AnalysisConfig::default(), src)
    }

    fn items(src: &str) -> Vec<Item> {
        walk(src).0.items
    }

    fn ids(items: &[Item]) -> Vec<i64> {
        items.iter().map(|i| i.id).collect()
    }

    fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
        diagnostics.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn registration_forms() {
        let items = items(
            "array[num].SetDefaults(1);
             num++;
             array[num++].SetDefaults(2);
             array[other].SetDefaults(3);
             list[num].SetDefaults(4);
             array[num].SetDefaults(ItemID.Foo);
             array[num].Prefix(5);",
        );
        assert_eq!(ids(&items), vec![1, 2]);
        assert!(items.iter().all(|i| i.conditions.is_empty()));
    }

    #[test]
    fn configured_registration_names() {
        let config = AnalysisConfig {
            slot_array: "slots".to_string(),
            slot_index: "n".to_string(),
            register_method: "Add".to_string(),
            ..AnalysisConfig::default()
        };
        let (shop, _) = walk_with(&config, "slots[n++].Add(9); array[num].SetDefaults(1);");
        assert_eq!(ids(&shop.items), vec![9]);
    }

    #[test]
    fn nested_guards_stack_in_order() {
        let items = items(
            "if (Main.hardMode) {
                 if (NPC.downedPlantBoss && Main.LocalPlayer.ZoneJungle) {
                     array[num++].SetDefaults(10);
                 }
                 array[num++].SetDefaults(11);
             }
             array[num++].SetDefaults(12);",
        );
        assert_eq!(
            items[0].conditions,
            vec![
                Condition::new(Hardmode),
                Condition::new(DownedPlantera),
                Condition::new(InJungle),
            ]
        );
        assert_eq!(items[1].conditions, vec![Condition::new(Hardmode)]);
        assert!(items[2].conditions.is_empty());
    }

    #[test]
    fn else_branch_gets_inverted_conditions() {
        let items = items(
            "if (Main.dayTime) array[num++].SetDefaults(1); else array[num++].SetDefaults(2);",
        );
        assert_eq!(items[0].conditions, vec![Condition::new(TimeDay)]);
        assert_eq!(items[1].conditions, vec![Condition::new(TimeNight)]);
    }

    #[test]
    fn else_branch_drops_uninvertible_conditions() {
        let (shop, diagnostics) = walk(
            "if (Main.hardMode && Main.xMas) array[num++].SetDefaults(1);
             else array[num++].SetDefaults(2);",
        );
        assert_eq!(
            shop.items[1].conditions,
            vec![Condition::new(PreHardmode)]
        );
        assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::FailedInversion]);
    }

    #[test]
    fn unrecognized_guard_still_visits_both_branches() {
        let (shop, diagnostics) = walk(
            "if (Main.hardMode) {
                 if (someRuntimeFlag) array[num++].SetDefaults(1);
                 else array[num++].SetDefaults(2);
             }",
        );
        assert_eq!(ids(&shop.items), vec![1, 2]);
        for item in &shop.items {
            assert_eq!(item.conditions, vec![Condition::new(Hardmode)]);
        }
        assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::UnrecognizedGuard]);
        assert_eq!(diagnostics[0].construct, "if (someRuntimeFlag)");
        assert_eq!(diagnostics[0].shop, Some(1));
    }

    #[test]
    fn negated_guard_without_complement_is_unrecognized() {
        let (shop, diagnostics) = walk("if (!Main.xMas) array[num++].SetDefaults(1);");
        assert!(shop.items[0].conditions.is_empty());
        assert_eq!(
            kinds(&diagnostics),
            vec![DiagnosticKind::FailedInversion, DiagnosticKind::UnrecognizedGuard]
        );
    }

    #[test]
    fn switch_reads_as_disjunction() {
        let items = items(
            "switch (Main.moonPhase) {
                 case 0:
                 case 1:
                     array[num++].SetDefaults(7);
                     break;
                 case 4:
                     array[num++].SetDefaults(8);
                     break;
             }",
        );
        assert_eq!(ids(&items), vec![7, 7, 8]);
        assert_eq!(items[0].conditions, vec![Condition::new(MoonPhaseFull)]);
        assert_eq!(items[1].conditions, vec![Condition::new(MoonPhaseWaningGibbous)]);
        assert_eq!(items[2].conditions, vec![Condition::new(MoonPhaseNew)]);
    }

    #[test]
    fn switch_section_with_no_usable_label_is_visited_plainly() {
        let (shop, diagnostics) = walk(
            "switch (Main.rand.Next(3)) {
                 case 0:
                     array[num++].SetDefaults(1);
                     break;
                 default:
                     array[num++].SetDefaults(2);
                     break;
             }",
        );
        assert_eq!(ids(&shop.items), vec![1, 2]);
        assert!(shop.items.iter().all(|i| i.conditions.is_empty()));
        assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::UnrecognizedLabel]);
    }

    #[test]
    fn range_loops_unroll() {
        assert_eq!(
            ids(&items("for (int i = 2; i < 5; i++) { array[num++].SetDefaults(i); }")),
            vec![2, 3, 4]
        );
        assert_eq!(
            ids(&items("for (int i = 2; i <= 5; i++) { array[num++].SetDefaults(i); }")),
            vec![2, 3, 4, 5]
        );
        assert_eq!(ids(&items("for (int i = 5; i < 5; i++) { }")), Vec::<i64>::new());
    }

    #[test]
    fn unrolled_items_carry_the_stack() {
        let items = items(
            "if (Main.hardMode) { for (int k = 10; k < 12; ++k) array[num++].SetDefaults(k); }",
        );
        assert_eq!(ids(&items), vec![10, 11]);
        assert!(items.iter().all(|i| i.conditions == vec![Condition::new(Hardmode)]));
    }

    #[test]
    fn inventory_scan_collapses_to_one_pass() {
        let items = items(
            "for (int i = 0; i < 54; i++) {
                 if (Main.player[Main.myPlayer].inventory[i].type == 289) {
                     array[num++].SetDefaults(290);
                     array[num++].SetDefaults(291);
                     break;
                 }
             }",
        );
        assert_eq!(ids(&items), vec![290, 291]);
        for item in &items {
            assert_eq!(
                item.conditions,
                vec![Condition::with_param(PlayerCarriesItem, 289)]
            );
        }
    }

    #[test]
    fn inventory_scan_finds_nested_checks() {
        let items = items(
            "for (int j = 0; j < 58; j++) {
                 if (j > 3) {
                     if (Main.LocalPlayer.inventory[j].type == 5) array[num++].SetDefaults(6);
                 }
             }",
        );
        assert_eq!(ids(&items), vec![6]);
        assert_eq!(items[0].conditions, vec![Condition::with_param(PlayerCarriesItem, 5)]);
    }

    #[test]
    fn inventory_scan_without_check_yields_nothing() {
        let (shop, diagnostics) = walk(
            "for (int i = 0; i < 54; i++) {
                 if (Main.LocalPlayer.inventory[k].type == 5) array[num++].SetDefaults(6);
             }",
        );
        assert!(shop.items.is_empty());
        assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::UnrecognizedLoop]);
    }

    #[test]
    fn unrecognized_loops_are_skipped() {
        let (shop, diagnostics) = walk(
            "for (int i = 0; i < count; i++) array[num++].SetDefaults(1);
             for (int i = 0; i < 3; i += 2) array[num++].SetDefaults(2);
             while (flag) array[num++].SetDefaults(3);",
        );
        assert!(shop.items.is_empty());
        assert_eq!(
            kinds(&diagnostics),
            vec![
                DiagnosticKind::MalformedBound,
                DiagnosticKind::UnrecognizedLoop,
                DiagnosticKind::UnrecognizedLoop,
            ]
        );
    }

    #[test]
    fn unroll_limit_is_enforced() {
        let config = AnalysisConfig {
            max_unroll: 3,
            ..AnalysisConfig::default()
        };
        let (shop, diagnostics) =
            walk_with(&config, "for (int i = 0; i < 4; i++) array[num++].SetDefaults(i);");
        assert!(shop.items.is_empty());
        assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::MalformedBound]);
    }

    #[test]
    fn accumulation_loop_unrolls_from_declaration() {
        let items = items(
            "int num2 = 3000;
             while (num2 <= 3003 && num < 39) {
                 array[num].SetDefaults(num2);
                 num++;
                 num2++;
             }",
        );
        assert_eq!(ids(&items), vec![3000, 3001, 3002, 3003]);
    }

    #[test]
    fn accumulation_loop_needs_a_single_declaration() {
        let (shop, diagnostics) = walk(
            "int num2 = 1;
             int num2 = 2;
             while (num2 <= 3 && num < 39) { num++; }
             while (num3 <= 3 && num < 39) { num++; }
             int num4 = x;
             while (num4 <= 3 && num < 39) { num++; }",
        );
        assert!(shop.items.is_empty());
        assert_eq!(
            kinds(&diagnostics),
            vec![
                DiagnosticKind::MalformedBound,
                DiagnosticKind::MalformedBound,
                DiagnosticKind::MalformedBound,
            ]
        );
    }

    #[test]
    fn accumulation_loop_respects_capacity_constant() {
        let (shop, diagnostics) = walk(
            "int num2 = 1;
             while (num2 <= 3 && num < 40) { num++; }",
        );
        assert!(shop.items.is_empty());
        assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::UnrecognizedLoop]);
    }

    #[test]
    fn stack_is_restored_after_each_scope() {
        let catalog = Catalog::builtin();
        let config = AnalysisConfig::default();
        let mut walker = ShopWalker::new(catalog, &config, 1);
        let body = parse_procedure(
            "if (Main.hardMode) { if (Main.xMas) { } else { } }
             switch (Main.moonPhase) { case 0: break; }",
        )
        .unwrap();
        walker.visit_block(&body);
        assert!(walker.conditions.is_empty());
        let depth = walker.with_conditions(&[Condition::new(Hardmode)], |w| w.conditions.len());
        assert_eq!(depth, 1);
        assert!(walker.conditions.is_empty());
    }

    #[test]
    fn broken_complement_pair_is_an_error() {
        let catalog = Catalog::builtin();
        let config = AnalysisConfig::default();
        let mut walker = ShopWalker::new(catalog, &config, 4);
        walker.note_inversion(
            InvertError::ContractViolation {
                tag: Hardmode,
                complement: TimeDay,
            },
            "if (Main.hardMode)",
        );
        let (_, diagnostics) = walker.walk(&[]);
        assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::ContractViolation]);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert_eq!(diagnostics[0].shop, Some(4));
        assert!(diagnostics[0].message.contains("Hardmode"));
    }

    mod prop_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn range_loops_cover_exact_bounds(
                start in -50i64..50,
                len in 0i64..40,
                inclusive in any::<bool>(),
            ) {
                let end = start + len;
                let op = if inclusive { "<=" } else { "<" };
                let src = format!("for (int i = {start}; i {op} {end}; i++) {{ }}");
                let expected: Vec<i64> = if inclusive {
                    (start..=end).collect()
                } else {
                    (start..end).collect()
                };
                // A zero start with an inventory-sized bound is a scan, not a range.
                prop_assume!(!(start == 0 && (end == 54 || end == 58)));
                prop_assert_eq!(ids(&items(&src)), expected);
            }
        }
    }
}
