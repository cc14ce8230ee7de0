use std::collections::HashMap;

use crate::ident::IdentificationRecord;

/// Upper bound of records checked per raw-file reference.
pub const NUMBER_OF_CHECKS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledGroup {
    pub reference: String,
    /// Positions into the compiled record list.
    pub record_indices: Vec<usize>,
    pub total: usize,
}

/// Evenly spaced positions `0, stride, 2*stride, ..` over `n` items, at most `cap`.
pub fn sample_indices(n: usize, cap: usize) -> Vec<usize> {
    let k = n.min(cap);
    if k == 0 {
        return Vec::new();
    }
    let stride = n / k;
    (0..n).step_by(stride).take(k).collect()
}

/// Groups records by reference in first-seen order and samples each group.
pub fn select_samples(records: &[IdentificationRecord]) -> Vec<SampledGroup> {
    let mut order: Vec<&str> = Vec::new();
    let mut members: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, record) in records.iter().enumerate() {
        let reference = record.spectra_data_ref.as_str();
        members
            .entry(reference)
            .or_insert_with(|| {
                order.push(reference);
                Vec::new()
            })
            .push(idx);
    }

    order
        .into_iter()
        .filter_map(|reference| {
            let group = members.remove(reference)?;
            let picked = sample_indices(group.len(), NUMBER_OF_CHECKS)
                .into_iter()
                .map(|i| group[i])
                .collect();
            Some(SampledGroup {
                reference: reference.to_string(),
                record_indices: picked,
                total: group.len(),
            })
        })
        .collect()
}
