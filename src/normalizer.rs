// 🧹 Department Normalizer - merge departments that differ only by casing
// "Sales", "sales" and "SALES" are one department; their line items are summed

use crate::model::{DepartmentData, LineItems};
use std::collections::HashMap;
use tracing::debug;

// ============================================================================
// CANONICAL NAMES
// ============================================================================

/// Canonical form of a department name, used as the merge key.
///
/// The name is split on single spaces and each word is re-cased: a letter
/// is uppercased when it starts the word or follows a non-alphanumeric
/// character, every other letter is lowercased. So "sales AND marketing"
/// becomes "Sales And Marketing" and "r&d" becomes "R&D".
///
/// Runs of spaces are kept as they are, so "Sales  Ops" and "Sales Ops"
/// stay distinct.
pub fn canonical_name(name: &str) -> String {
    name.split(' ').map(recase_word).collect::<Vec<_>>().join(" ")
}

fn recase_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_boundary = true;

    for c in word.chars() {
        if at_boundary {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        at_boundary = !c.is_alphanumeric();
    }

    out
}

// ============================================================================
// MERGE
// ============================================================================

/// Merge raw departments by canonical name.
///
/// Output keeps the order in which each canonical name was first seen.
/// Line items merge by exact label; amounts for the same label are summed.
/// Each department's `total` is the sum of its merged line items.
pub fn normalize_departments<'a, I>(departments: I) -> Vec<DepartmentData>
where
    I: IntoIterator<Item = &'a DepartmentData>,
{
    let mut merged: Vec<(String, LineItems)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for department in departments {
        let name = canonical_name(&department.name);

        let slot = match index.get(&name) {
            Some(&slot) => {
                debug!(raw = %department.name, canonical = %name, "merging department");
                slot
            }
            None => {
                merged.push((name.clone(), LineItems::new()));
                index.insert(name, merged.len() - 1);
                merged.len() - 1
            }
        };

        let items = &mut merged[slot].1;
        for item in &department.line_items {
            items.add(&item.label, item.amount);
        }
    }

    merged
        .into_iter()
        .map(|(name, items)| DepartmentData::new(name, items))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
