//! Derived views of a [`Report`]: the per-pallet text breakdown and the pie slices.

use super::{Entry, Error, Pallet, Report, SizeMetric};
use std::collections::HashMap;

const MIB: f64 = 1024. * 1024.;

/// Entries smaller than this are left out of the text breakdown.
pub const ENTRY_THRESHOLD: u64 = 100 * 1024;

/// A pallet gets its own text block and pie slice only if its share is strictly above 1%.
pub fn is_main(size: u64, total: u64) -> bool {
    u128::from(size) * 100 > u128::from(total)
}

pub fn mib(bytes: u64) -> f64 {
    bytes as f64 / MIB
}

/// Slice values in bytes and their labels, in drawing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieData {
    pub sizes: Vec<u64>,
    pub labels: Vec<String>,
}

impl PieData {
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.sizes.iter().sum()
    }

    fn push(&mut self, size: u64, label: String) {
        self.sizes.push(size);
        self.labels.push(label);
    }
}

/// Builds the text panel: one block per main pallet, largest first, listing its entries of at
/// least [`ENTRY_THRESHOLD`] bytes (storage before items), each block followed by a blank line.
///
/// Entries are looked up by pallet name, so pallets sharing a name list each other's entries too.
pub fn text_summary(report: &Report, metric: SizeMetric) -> Result<String, Error> {
    let total = report.total_size(metric)?;
    let entries = entries_by_name(report, metric)?;

    let mut pallets = sized_pallets(report, metric)?;
    // stable, so equal sizes keep report order
    pallets.sort_by(|(a, _), (b, _)| b.cmp(a));

    let mut lines = vec![];
    for (size, pallet) in pallets {
        if !is_main(size, total) {
            continue;
        }
        lines.push(format!("{} ({:.1} MiB)", pallet.name, mib(size)));

        for group in entries.get(pallet.name.as_str()).into_iter().flatten() {
            for (size, entry) in group {
                lines.push(format!(" {} ({:.1} MiB)", entry.name, mib(*size)));
            }
        }

        lines.push(String::new());
    }

    Ok(lines.join("\n"))
}

/// Builds the pie slices: main pallets largest first, then one trailing "Other" slice holding the
/// sum of everything at or below the 1% share, if that sum is non-zero.
pub fn pie_data(report: &Report, metric: SizeMetric) -> Result<PieData, Error> {
    let total = report.total_size(metric)?;

    let mut pallets = sized_pallets(report, metric)?;
    pallets.sort_by(|(a_size, a), (b_size, b)| (b_size, &b.name).cmp(&(a_size, &a.name)));

    let mut pie = PieData::default();
    let mut other = 0;
    for (size, pallet) in pallets {
        if is_main(size, total) {
            pie.push(size, format!("{} {:.0}", pallet.name, mib(size)));
        } else {
            other += size;
        }
    }
    if other > 0 {
        pie.push(other, format!("Other {:.0}", mib(other)));
    }

    tracing::debug!(slices = pie.len(), other, total, "built pie data");
    Ok(pie)
}

fn sized_pallets(report: &Report, metric: SizeMetric) -> Result<Vec<(u64, &Pallet)>, Error> {
    report
        .pallets
        .iter()
        .map(|pallet| Ok((metric.pallet_size(pallet)?, pallet)))
        .collect()
}

/// `[storage, items]` per pallet name, each group passing [`ENTRY_THRESHOLD`] and largest first.
type EntryGroups<'a> = [Vec<(u64, &'a Entry)>; 2];

fn entries_by_name(
    report: &Report,
    metric: SizeMetric,
) -> Result<HashMap<&str, EntryGroups<'_>>, Error> {
    let mut by_name = HashMap::<&str, EntryGroups<'_>>::new();
    for pallet in &report.pallets {
        for (group, entries) in [&pallet.storage, &pallet.items].into_iter().enumerate() {
            let Some(entries) = entries else {
                continue;
            };
            let merged = &mut by_name.entry(pallet.name.as_str()).or_default()[group];
            for entry in entries {
                merged.push((metric.entry_size(pallet, entry)?, entry));
            }
        }
    }

    for group in by_name.values_mut().flat_map(|groups| groups.iter_mut()) {
        // stable, so equal sizes keep report order
        group.sort_by(|(a, _), (b, _)| b.cmp(a));
        group.retain(|(size, _)| *size >= ENTRY_THRESHOLD);
    }
    Ok(by_name)
}
