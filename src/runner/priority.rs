//! Priority ordering of candidate elements.
//!
//! Elements declare an optional numeric priority; higher values are
//! dispatched first. Under the default [`PriorityPolicy::Weak`] an element
//! without a priority keeps its position, and the prioritised elements are
//! sorted among the remaining positions. Any two elements with distinct
//! priorities are therefore dispatched higher first.
//!
//! ```text
//! document order:  A(5)  B(1)  D(-)  C(5)
//! weak order:      A(5)  C(5)  D(-)  B(1)
//! absent-last:     A(5)  C(5)  B(1)  D(-)
//! ```

use std::cmp::Ordering;

use serde::Deserialize;

use crate::dom::{DomElement, ElementRef};

/// How candidates without a declared priority are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityPolicy {
    /// Unprioritised elements keep their position; the rest sort around them.
    #[default]
    Weak,
    /// Present priorities descending, then absent ones; a total order.
    AbsentLast,
}

/// Parse a priority attribute; anything that is not a finite number is absent.
pub fn parse_priority(raw: Option<&str>) -> Option<f64> {
    let value: f64 = raw?.trim().parse().ok()?;
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

/// Higher first; equal when the values are equal or either side is absent.
pub fn compare_weak(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if a > b => Ordering::Less,
        (Some(a), Some(b)) if a < b => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Higher first; absent after every present value.
pub fn compare_absent_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => compare_weak(a, b),
    }
}

/// Stable sort of the prioritised entries within their own slots; entries
/// without a priority stay where they are.
fn sort_in_place_slots<T>(items: &mut Vec<(T, Option<f64>)>) {
    let slots: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, (_, priority))| priority.is_some())
        .map(|(index, _)| index)
        .collect();

    let mut taken: Vec<Option<(T, Option<f64>)>> = items.drain(..).map(Some).collect();
    let mut prioritised: Vec<(T, Option<f64>)> =
        slots.iter().filter_map(|&i| taken[i].take()).collect();
    prioritised.sort_by(|a, b| compare_weak(a.1, b.1));

    for (slot, entry) in slots.into_iter().zip(prioritised) {
        taken[slot] = Some(entry);
    }
    items.extend(taken.into_iter().flatten());
}

/// Orders candidate elements by their priority attribute.
#[derive(Debug, Clone)]
pub struct PrioritySorter {
    attribute: String,
    policy: PriorityPolicy,
}

impl PrioritySorter {
    pub fn new(attribute: impl Into<String>, policy: PriorityPolicy) -> Self {
        PrioritySorter {
            attribute: attribute.into(),
            policy,
        }
    }

    pub fn policy(&self) -> PriorityPolicy {
        self.policy
    }

    /// The declared priority of `element`.
    pub fn priority_of(&self, element: &dyn DomElement) -> Option<f64> {
        parse_priority(element.attribute(&self.attribute).as_deref())
    }

    /// Sort `elements`, returning each with its priority.
    pub fn sort_with_priorities(&self, elements: Vec<ElementRef>) -> Vec<(ElementRef, Option<f64>)> {
        let mut keyed: Vec<(ElementRef, Option<f64>)> = elements
            .into_iter()
            .map(|el| {
                let priority = self.priority_of(&*el);
                (el, priority)
            })
            .collect();
        match self.policy {
            PriorityPolicy::Weak => sort_in_place_slots(&mut keyed),
            PriorityPolicy::AbsentLast => keyed.sort_by(|a, b| compare_absent_last(a.1, b.1)),
        }
        keyed
    }

    pub fn sort(&self, elements: Vec<ElementRef>) -> Vec<ElementRef> {
        self.sort_with_priorities(elements)
            .into_iter()
            .map(|(el, _)| el)
            .collect()
    }
}
