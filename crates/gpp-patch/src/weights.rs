//! Award criterion weight redistribution
//!
//! Criteria created from templates carry [`PLACEHOLDER_WEIGHT`] instead of a
//! number. After patching, each lot's placeholders are replaced so that new
//! criteria share the configured GPP weight and criteria that already existed
//! in the original notice share the rest.
//!
//! A criterion counts as existing when the original lot holds a criterion
//! with exactly the same name. Two criteria sharing a name are
//! indistinguishable to this rule.

use gpp_notice::{NodeId, Notice};
use tracing::{debug, info, warn};

/// Weight text written by award criterion templates
pub const PLACEHOLDER_WEIGHT: &str = "dynamic weight";

/// Total weight given to new GPP criteria by default
pub const DEFAULT_GPP_WEIGHT_SHARE: u32 = 20;

const TOTAL_WEIGHT: i64 = 100;

/// Replaces placeholder weights with numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightRedistributor {
    share: u32,
}

impl Default for WeightRedistributor {
    fn default() -> Self {
        Self::new(DEFAULT_GPP_WEIGHT_SHARE)
    }
}

struct Placeholder {
    node: NodeId,
    original_weight: Option<i64>,
}

impl WeightRedistributor {
    /// Redistributor giving `share` (capped at 100) to new criteria
    #[inline]
    #[must_use]
    pub fn new(share: u32) -> Self {
        Self {
            share: share.min(100),
        }
    }

    /// Weight given to new criteria
    #[inline]
    #[must_use]
    pub fn share(&self) -> u32 {
        self.share
    }

    /// Rewrite every placeholder weight in `patched`, comparing against
    /// `original` (the same notice before patching)
    ///
    /// Returns the number of criteria whose weight was written.
    pub fn redistribute(&self, patched: &mut Notice, original: &Notice) -> usize {
        info!(share = self.share, "redistributing award criterion weights");
        let mut updated = 0;
        for lot_id in patched.lot_ids() {
            updated += self.redistribute_lot(patched, original, &lot_id);
        }
        info!(updated, "award criterion weights redistributed");
        updated
    }

    fn redistribute_lot(&self, patched: &mut Notice, original: &Notice, lot_id: &str) -> usize {
        let Some(lot) = patched.lot(lot_id) else {
            warn!(lot_id, "lot not found in patched notice");
            return 0;
        };
        let paths = patched.paths().clone();
        let doc = patched.document();

        let original_criteria: Vec<NodeId> = original
            .lot(lot_id)
            .map(|lot| original.document().nodes_at(lot, &paths.award_criteria))
            .unwrap_or_default();

        let mut fresh = Vec::new();
        let mut existing = Vec::new();
        for criterion in doc.nodes_at(lot, &paths.award_criteria) {
            if doc.value_at(criterion, &paths.award_criterion_weight).as_deref()
                != Some(PLACEHOLDER_WEIGHT)
            {
                continue;
            }
            // value_at trims, so whitespace-only names never match
            let name = doc
                .value_at(criterion, &paths.award_criterion_name)
                .filter(|name| !name.is_empty());
            let matching = name.and_then(|name| {
                original_criteria.iter().copied().find(|&candidate| {
                    original
                        .document()
                        .value_at(candidate, &paths.award_criterion_name)
                        .is_some_and(|other| other == name)
                })
            });
            match matching {
                Some(previous) => existing.push(Placeholder {
                    node: criterion,
                    original_weight: original
                        .document()
                        .value_at(previous, &paths.award_criterion_weight)
                        .filter(|w| w != PLACEHOLDER_WEIGHT)
                        .and_then(|w| w.parse().ok()),
                }),
                None => fresh.push(criterion),
            }
        }

        if fresh.is_empty() && existing.is_empty() {
            debug!(lot_id, "no placeholder weights in lot");
            return 0;
        }
        debug!(
            lot_id,
            new = fresh.len(),
            existing = existing.len(),
            "distributing weights"
        );

        let mut assignments = Vec::with_capacity(fresh.len() + existing.len());
        let share = i64::from(self.share);
        assignments.extend(fresh.iter().copied().zip(even_split(share, fresh.len())));
        assignments.extend(distribute_existing(&existing, TOTAL_WEIGHT - share));

        let weight_path = &paths.award_criterion_weight;
        let document = patched.document_mut();
        let mut written = 0;
        for (criterion, weight) in assignments {
            match document.node_at(criterion, weight_path) {
                Some(node) => {
                    document.set_text(node, weight.to_string());
                    written += 1;
                }
                None => warn!(lot_id, "weight node not found in criterion"),
            }
        }
        written
    }
}

/// `total` split into `count` integers, the remainder going to the first ones
fn even_split(total: i64, count: usize) -> Vec<i64> {
    let Ok(n) = i64::try_from(count) else {
        return Vec::new();
    };
    if n == 0 {
        return Vec::new();
    }
    let base = total / n;
    let remainder = total % n;
    (0..n).map(|i| base + i64::from(i < remainder)).collect()
}

fn distribute_existing(existing: &[Placeholder], total: i64) -> Vec<(NodeId, i64)> {
    let original_sum: i64 = existing.iter().filter_map(|p| p.original_weight).sum();
    if original_sum <= 0 {
        return existing
            .iter()
            .map(|p| p.node)
            .zip(even_split(total, existing.len()))
            .collect();
    }

    let mut distributed = 0;
    let mut out = Vec::with_capacity(existing.len());
    for (i, placeholder) in existing.iter().enumerate() {
        let weight = match placeholder.original_weight {
            Some(_) if i + 1 == existing.len() => total - distributed,
            // capped so later criteria never go negative
            Some(original) => {
                round_half_up(original * total, original_sum).min(total - distributed)
            }
            None => {
                let remaining = i64::try_from(existing.len() - i).unwrap_or(1);
                (total - distributed) / remaining
            }
        };
        distributed += weight;
        out.push((placeholder.node, weight));
    }
    out
}

/// `numerator / denominator` rounded to the nearest integer, halves up
fn round_half_up(numerator: i64, denominator: i64) -> i64 {
    (2 * numerator + denominator).div_euclid(2 * denominator)
}
