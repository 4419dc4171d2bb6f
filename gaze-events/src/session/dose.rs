//! Dose category resolution
//!
//! Sessions sharing an identical (OT, NAL) dose pair form one category.
//! Categories are dense ids `0..K` in lexicographic order of the pairs.

use super::metadata::{DosePair, SessionMetadata};
use serde::Serialize;
use tracing::{debug, warn};

/// Result of partitioning dose rows into categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoseCategories {
    /// Distinct dose pairs, sorted
    pub unique_rows: Vec<DosePair>,
    /// Input row indices per category id
    pub indices_per_row: Vec<Vec<usize>>,
    /// Category id per input row
    pub category_per_session: Vec<usize>,
}

impl DoseCategories {
    pub fn num_categories(&self) -> usize {
        self.unique_rows.len()
    }
}

/// Assign every dose row the id of its unique pair.
pub fn resolve_categories(doses: &[DosePair]) -> DoseCategories {
    let mut unique_rows = doses.to_vec();
    unique_rows.sort();
    unique_rows.dedup();

    let mut indices_per_row = vec![Vec::new(); unique_rows.len()];
    let mut category_per_session = Vec::with_capacity(doses.len());

    for (row, dose) in doses.iter().enumerate() {
        // Every row is present in unique_rows by construction
        let id = unique_rows.binary_search(dose).unwrap_or_else(|i| i);
        indices_per_row[id].push(row);
        category_per_session.push(id);
    }

    DoseCategories {
        unique_rows,
        indices_per_row,
        category_per_session,
    }
}

/// Resolve categories over all sessions that carry a dose and write each
/// id back into its metadata. Sessions without a dose get `None`.
///
/// `indices_per_row` in the result refers to positions in the input order.
pub fn assign_categories<'a, I>(sessions: I) -> DoseCategories
where
    I: IntoIterator<Item = &'a mut SessionMetadata>,
{
    let mut sessions: Vec<&mut SessionMetadata> = sessions.into_iter().collect();

    let dosed: Vec<(usize, DosePair)> = sessions
        .iter()
        .enumerate()
        .filter_map(|(i, meta)| meta.dose.map(|d| (i, d)))
        .collect();

    let doses: Vec<DosePair> = dosed.iter().map(|(_, d)| *d).collect();
    let mut categories = resolve_categories(&doses);

    for meta in sessions.iter_mut() {
        if meta.dose.is_none() {
            warn!(session = %meta.session_name, "No dose information; category left unset");
            meta.category = None;
        }
    }
    for (&(session, _), &id) in dosed.iter().zip(&categories.category_per_session) {
        sessions[session].category = Some(id);
    }

    // Re-index buckets from dosed rows to session positions
    for bucket in categories.indices_per_row.iter_mut() {
        for row in bucket.iter_mut() {
            *row = dosed[*row].0;
        }
    }

    debug!(
        sessions = sessions.len(),
        categories = categories.num_categories(),
        "Resolved dose categories"
    );
    categories
}
