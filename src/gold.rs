//! Gold-standard helpers
//!
//! A judgment list holds one verdict per (mention, candidate). For training
//! and evaluation what matters is the item chosen for each mention: the
//! candidate judged valid, or none when every candidate was rejected.

use std::collections::BTreeMap;

use crate::types::Judgment;

/// Chosen candidate per mention `(start, end)`, `None` when all were rejected.
///
/// If several candidates of one mention are valid the last one wins.
pub fn item_choices(judgments: &[Judgment]) -> BTreeMap<(usize, usize), Option<String>> {
    let mut choices: BTreeMap<(usize, usize), Option<String>> = BTreeMap::new();
    for judgment in judgments {
        let choice = choices.entry((judgment.start, judgment.end)).or_default();
        if judgment.valid {
            *choice = Some(judgment.candidate_id.clone());
        }
    }
    choices
}
