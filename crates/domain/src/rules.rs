//! Optimization rule selection
//!
//! Rules are loaded per tenant and counted into each analysis. They do not
//! change scorer penalties; `weight` and `penalty_points` are carried through
//! untouched so a weighted scorer can consume them later.

use std::collections::BTreeMap;

use crate::model::{Dimension, OptimizationRule, RuleCategory};

/// Active rules that apply to the tenant: its own rules plus global ones
pub fn applicable_rules<'a>(
    rules: &'a [OptimizationRule],
    tenant_id: &str,
) -> Vec<&'a OptimizationRule> {
    rules
        .iter()
        .filter(|rule| rule.is_active)
        .filter(|rule| match rule.tenant_id.as_deref() {
            None => true,
            Some(owner) => owner == tenant_id,
        })
        .collect()
}

/// Rules targeting a dimension, including `general` rules
pub fn rules_for_dimension<'a>(
    rules: &[&'a OptimizationRule],
    dimension: Dimension,
) -> Vec<&'a OptimizationRule> {
    let category = dimension.rule_category();
    rules
        .iter()
        .copied()
        .filter(|rule| rule.category == category || rule.category == RuleCategory::General)
        .collect()
}

/// Per-dimension rule counts, keyed by dimension name
pub fn rule_counts(rules: &[&OptimizationRule]) -> BTreeMap<&'static str, usize> {
    Dimension::ALL
        .iter()
        .map(|dimension| {
            (
                dimension.as_str(),
                rules_for_dimension(rules, *dimension).len(),
            )
        })
        .collect()
}
