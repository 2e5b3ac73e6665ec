// 📄 Report Payloads - what the analysis endpoints send back
// Quarterly department statements and the transaction-detail P&L summary

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

// ============================================================================
// LINE ITEMS
// ============================================================================

/// One labeled amount within a department's statement.
///
/// Labels conventionally start with an account number ("61000 - Salaries")
/// but nothing enforces that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub amount: f64,
}

impl LineItem {
    pub fn new(label: impl Into<String>, amount: f64) -> Self {
        LineItem {
            label: label.into(),
            amount,
        }
    }
}

/// Label → amount mapping that keeps the order labels were first seen in.
///
/// Serialized as a JSON object. Labels are unique; `add` sums into an
/// existing label instead of replacing it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItems(Vec<LineItem>);

impl LineItems {
    pub fn new() -> Self {
        LineItems(Vec::new())
    }

    /// Add `amount` to `label`, inserting the label if it is new.
    pub fn add(&mut self, label: &str, amount: f64) {
        match self.0.iter_mut().find(|item| item.label == label) {
            Some(item) => item.amount += amount,
            None => self.0.push(LineItem::new(label, amount)),
        }
    }

    /// Set `label` to `amount`, replacing any previous value.
    pub fn set(&mut self, label: &str, amount: f64) {
        match self.0.iter_mut().find(|item| item.label == label) {
            Some(item) => item.amount = amount,
            None => self.0.push(LineItem::new(label, amount)),
        }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|item| item.label == label)
            .map(|item| item.amount)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Plain sum of every amount.
    pub fn sum(&self) -> f64 {
        self.0.iter().map(|item| item.amount).sum()
    }
}

impl<'a> IntoIterator for &'a LineItems {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<S: AsRef<str>> FromIterator<(S, f64)> for LineItems {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut items = LineItems::new();
        for (label, amount) in iter {
            items.add(label.as_ref(), amount);
        }
        items
    }
}

impl Serialize for LineItems {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|item| (&item.label, item.amount)))
    }
}

impl<'de> Deserialize<'de> for LineItems {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LineItemsVisitor;

        impl<'de> Visitor<'de> for LineItemsVisitor {
            type Value = LineItems;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of label to amount")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<LineItems, E> {
                Ok(LineItems::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<LineItems, A::Error> {
                let mut items = LineItems::new();
                while let Some((label, amount)) = map.next_entry::<String, Option<f64>>()? {
                    items.set(&label, amount.unwrap_or(0.0));
                }
                Ok(items)
            }
        }

        deserializer.deserialize_any(LineItemsVisitor)
    }
}

// ============================================================================
// KEYED COLLECTIONS
// ============================================================================

/// Values that live in a JSON object under their own name.
pub trait Keyed {
    fn key(&self) -> &str;
    fn set_key(&mut self, key: String);
}

/// Serde adapter: JSON object ⇄ `Vec<T>` in document order, with each
/// value's key written back into the value.
pub(crate) mod keyed {
    use super::*;

    pub fn serialize<S, T>(items: &[T], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Keyed + Serialize,
    {
        serializer.collect_map(items.iter().map(|item| (item.key(), item)))
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Keyed + Deserialize<'de>,
    {
        struct KeyedVisitor<T>(PhantomData<T>);

        impl<'de, T: Keyed + Deserialize<'de>> Visitor<'de> for KeyedVisitor<T> {
            type Value = Vec<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object keyed by name")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Vec<T>, E> {
                Ok(Vec::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Vec<T>, A::Error> {
                let mut items = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, mut value)) = map.next_entry::<String, T>()? {
                    value.set_key(key);
                    items.push(value);
                }
                Ok(items)
            }
        }

        deserializer.deserialize_any(KeyedVisitor(PhantomData))
    }
}

// ============================================================================
// QUARTERLY REPORT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthData {
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub amount: f64,
}

/// One department column of a quarterly income statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepartmentData {
    /// Display name exactly as the sheet spells it
    #[serde(rename = "department", default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub months: Vec<MonthData>,

    #[serde(rename = "lineItems", default)]
    pub line_items: LineItems,

    #[serde(default)]
    pub total: f64,
}

impl DepartmentData {
    pub fn new(name: impl Into<String>, line_items: LineItems) -> Self {
        let total = line_items.sum();
        DepartmentData {
            name: name.into(),
            months: Vec::new(),
            line_items,
            total,
        }
    }
}

impl Keyed for DepartmentData {
    fn key(&self) -> &str {
        &self.name
    }

    fn set_key(&mut self, key: String) {
        self.name = key;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyReport {
    #[serde(default)]
    pub company_name: String,

    #[serde(default)]
    pub period: String,

    #[serde(default, with = "keyed")]
    pub departments: Vec<DepartmentData>,

    #[serde(default)]
    pub revenue_total: f64,

    #[serde(default)]
    pub summary: BTreeMap<String, f64>,
}

// ============================================================================
// TRANSACTION DETAIL (P&L) REPORT
// ============================================================================

/// Fixed display/export order for operating expense categories
pub const OPEX_ORDER: [&str; 3] = ["S&M", "R&D", "G&A"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlSubcategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub headcount: f64,
    #[serde(default)]
    pub non_headcount: f64,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub headcount: f64,
    #[serde(default)]
    pub non_headcount: f64,
    #[serde(default)]
    pub subcategories: BTreeMap<String, PlSubcategory>,
}

impl PlCategory {
    /// Subcategories, largest absolute total first
    pub fn sorted_subcategories(&self) -> Vec<&PlSubcategory> {
        let mut subcategories: Vec<&PlSubcategory> = self.subcategories.values().collect();
        subcategories.sort_by(|a, b| b.total.abs().total_cmp(&a.total.abs()));
        subcategories
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlReport {
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub cogs: Option<PlCategory>,
    #[serde(default)]
    pub gross_profit: f64,
    #[serde(default)]
    pub gross_margin: f64,
    #[serde(default)]
    pub opex: BTreeMap<String, PlCategory>,
    #[serde(default)]
    pub total_opex: f64,
    #[serde(default)]
    pub ebitda: f64,
}

impl PlReport {
    /// OpEx categories in display order, skipping any the report lacks
    pub fn opex_in_order(&self) -> impl Iterator<Item = (&'static str, &PlCategory)> {
        OPEX_ORDER
            .iter()
            .filter_map(move |name| self.opex.get(*name).map(|category| (*name, category)))
    }

    /// COGS total, zero when the report has no COGS section
    pub fn cogs_total(&self) -> f64 {
        self.cogs.as_ref().map(|c| c.total).unwrap_or(0.0)
    }
}

// ============================================================================
// TESTS
// ============================================================================
