//! Splice sites within a coding region
//!
//! An mRNA position list alternates exon starts and ends:
//! `[s1, e1, s2, e2, ...]`. The internal splice sites are the elements
//! between the first start and the last end. Restricting them to a CDS gives
//! the CDS position list, bounded by the CDS start and end.

/// Derive the CDS position list from an mRNA position list
///
/// Scans exon ends (odd indices) for the first one at or after `cds_start`,
/// then continues to the first exon end at or after `cds_end`. The splice
/// sites in between are kept, and the CDS boundaries are put around them.
/// Both indices stop at the end of the list, so a CDS reaching past the last
/// exon keeps every remaining site. CDS boundaries inside an exon are taken
/// as given.
///
/// # Examples
///
/// ```
/// use ferro_retriever::assemble::splice::cds_position_list;
///
/// let mrna = [10, 20, 30, 40, 50, 60];
/// assert_eq!(cds_position_list(&mrna, (15, 55)), vec![15, 20, 30, 40, 50, 55]);
/// assert_eq!(cds_position_list(&mrna, (22, 28)), vec![22, 28]);
/// ```
pub fn cds_position_list(mrna: &[u64], cds: (u64, u64)) -> Vec<u64> {
    let (cds_start, cds_end) = cds;
    let len = mrna.len();

    let mut i = 1;
    while i < len && mrna[i] < cds_start {
        i += 2;
    }
    let i = i.min(len);

    let mut j = i;
    while j < len && mrna[j] < cds_end {
        j += 2;
    }
    let j = j.min(len);

    let mut positions = Vec::with_capacity(j - i + 2);
    positions.push(cds_start);
    positions.extend_from_slice(&mrna[i..j]);
    positions.push(cds_end);
    positions
}
