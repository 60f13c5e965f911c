//! Installment-plan eligibility aggregation.
//!
//! Products (and their categories) opt out of "common" plans and opt in to
//! "advanced" plans. For an order, exclusions are the union across all
//! products while inclusions are the intersection: an advanced plan is only
//! offered when every line item has it active. The result is the filter
//! token list the gateway's `sources` endpoint understands.

use std::collections::HashMap;

/// Known government financing plans, subject to per-product opt-out.
pub const AHORA_PLANS: &[&str] = &["ahora_3", "ahora_6", "ahora_12", "ahora_18"];

/// Source of per-product plan configuration. Implementors aggregate across
/// the product and its categories; this crate only combines per-product
/// results across an order.
pub trait PlanSource {
    /// Opt-out (common) plans disabled for the product.
    fn inactive_plans(&self, product_id: &str) -> Vec<String>;

    /// Opt-in (advanced) plans enabled for the product.
    fn active_plans(&self, product_id: &str) -> Vec<String>;
}

/// Compute the installment filter tokens for a set of order products.
///
/// Inactive plans become `-{plan}` exclusion tokens (union). Active plans
/// become `+uid:{plan}` inclusion tokens, kept only when active on every
/// product. Duplicates are removed; order is not significant.
pub fn eligible_installments<S: PlanSource>(source: &S, product_ids: &[String]) -> Vec<String> {
    let mut installments = Vec::new();
    let mut active_counts: HashMap<String, usize> = HashMap::new();

    for product_id in product_ids {
        for plan in source.inactive_plans(product_id) {
            let token = format!("-{}", plan);
            if !installments.contains(&token) {
                installments.push(token);
            }
        }

        // Count each active plan once per product; a product listing a plan
        // twice (product and category level) must not inflate the count.
        let mut seen = Vec::new();
        for plan in source.active_plans(product_id) {
            if !seen.contains(&plan) {
                *active_counts.entry(plan.clone()).or_insert(0) += 1;
                seen.push(plan);
            }
        }
    }

    for (plan, count) in active_counts {
        if count == product_ids.len() {
            let token = format!("+uid:{}", plan);
            if !installments.contains(&token) {
                installments.push(token);
            }
        }
    }

    installments
}

/// Build the query string for the gateway `sources` endpoint:
/// `total=..&installments[]=..&installments[]=..`.
pub fn installments_query(total: Option<f64>, installments: &[String]) -> String {
    let mut parts = Vec::new();

    if let Some(total) = total {
        parts.push(format!("total={}", total));
    }

    for token in installments {
        parts.push(format!("installments[]={}", percent_encode(token)));
    }

    parts.join("&")
}

/// Minimal percent-encoding for installment tokens: `+` would otherwise
/// decode as a space inside a query string.
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b':' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
