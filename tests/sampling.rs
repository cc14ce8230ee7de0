use kira_pxvalidator::ident::IdentificationRecord;
use kira_pxvalidator::sampling::{NUMBER_OF_CHECKS, sample_indices, select_samples};

fn record(id: u64, reference: &str) -> IdentificationRecord {
    IdentificationRecord {
        id,
        spectra_data_ref: reference.to_string(),
        source_id: format!("index={}", id - 1),
        spectrum_title: None,
        mass_to_charge: 500.0,
        charge: Some(2),
        peptide: None,
    }
}

#[test]
fn sample_size_is_min_of_n_and_cap() {
    for n in 0..=60 {
        let picked = sample_indices(n, NUMBER_OF_CHECKS);
        assert_eq!(picked.len(), n.min(NUMBER_OF_CHECKS), "n = {}", n);
        assert!(picked.windows(2).all(|w| w[0] < w[1]));
        assert!(picked.iter().all(|&i| i < n));
    }
}

#[test]
fn selection_is_deterministic() {
    let records: Vec<_> = (1..=37).map(|i| record(i, if i % 3 == 0 { "B" } else { "A" })).collect();
    assert_eq!(select_samples(&records), select_samples(&records));
}

#[test]
fn groups_keep_first_seen_order() {
    let records = vec![
        record(1, "B"),
        record(2, "A"),
        record(3, "B"),
        record(4, "C"),
        record(5, "A"),
    ];
    let groups = select_samples(&records);
    let refs: Vec<&str> = groups.iter().map(|g| g.reference.as_str()).collect();
    assert_eq!(refs, vec!["B", "A", "C"]);
    assert_eq!(groups[0].record_indices, vec![0, 2]);
    assert_eq!(groups[1].record_indices, vec![1, 4]);
    assert_eq!(groups[2].total, 1);
}

#[test]
fn large_group_is_capped_and_evenly_spaced() {
    let records: Vec<_> = (1..=105).map(|i| record(i, "A")).collect();
    let groups = select_samples(&records);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].total, 105);
    assert_eq!(
        groups[0].record_indices,
        vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90]
    );
    assert!(select_samples(&[]).is_empty());
}
