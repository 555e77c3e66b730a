//! Fill planning
//!
//! Turns a synthetic card and located fields into the concrete values the
//! page layer writes. Writing the values and dispatching input/change events
//! happens outside this crate.

use serde::{Deserialize, Serialize};

use crate::card::SyntheticCard;
use crate::fields::{FieldRole, FieldSet, InputDescriptor};

/// One value to write into one candidate input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillAssignment {
    /// Index into the candidate list the fields were located in
    pub index: usize,
    pub role: FieldRole,
    pub value: String,
}

/// Expiry text shaped to what the target input accepts
fn expiry_value(card: &SyntheticCard, input: Option<&InputDescriptor>) -> String {
    match input {
        Some(i) if i.has_autocomplete(&["cc-exp-month"]) => card.expiry_month_padded(),
        Some(i) if i.max_length == Some(4) => card.expiry_compact(),
        _ => card.expiry_mm_yy(),
    }
}

/// Assignments for every bound role, in role order
///
/// Absent roles are skipped. `candidates` is only consulted for the expiry
/// input's format hints, so an index outside it falls back to `MM/YY`.
pub fn plan(
    card: &SyntheticCard,
    fields: &FieldSet,
    candidates: &[InputDescriptor],
) -> Vec<FillAssignment> {
    fields
        .iter()
        .map(|(role, index)| {
            let value = match role {
                FieldRole::Number => card.number.clone(),
                FieldRole::Expiry => expiry_value(card, candidates.get(index)),
                FieldRole::Cvv => card.cvv.clone(),
                FieldRole::Name => card.holder_name.clone(),
            };
            FillAssignment { index, role, value }
        })
        .collect()
}
