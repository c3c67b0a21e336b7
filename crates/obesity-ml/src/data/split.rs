//! Stratified train/test splitting.

use rand::prelude::*;

use super::DatasetError;

/// Deterministic stratified split of row indices.
///
/// Every class contributes to the test partition in proportion to its size,
/// so class proportions are preserved in both partitions (up to rounding).
///
/// - `n_test = ceil(test_fraction * n)`
/// - per-class test counts are allocated proportionally with the
///   largest-remainder method, then clamped so each class keeps at least one
///   row on each side
/// - rows are shuffled per class with a seeded RNG
///
/// Returns `(train_idx, test_idx)`, each sorted ascending.
///
/// # Errors
///
/// [`DatasetError::InsufficientClassMembers`] if any class has fewer than two rows.
pub fn stratified_split(
    labels: &[usize],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), DatasetError> {
    debug_assert!(test_fraction > 0.0 && test_fraction < 1.0);

    let n = labels.len();
    if n == 0 {
        return Err(DatasetError::Empty);
    }

    let n_classes = labels.iter().copied().max().map_or(0, |m| m + 1);
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for (row, &label) in labels.iter().enumerate() {
        members[label].push(row);
    }

    if let Some((class, rows)) = members
        .iter()
        .enumerate()
        .find(|(_, rows)| !rows.is_empty() && rows.len() < 2)
    {
        return Err(DatasetError::InsufficientClassMembers { class, count: rows.len() });
    }

    let n_test = ((test_fraction * n as f64).ceil() as usize).clamp(1, n - 1);
    let quotas = allocate_test_quota(&members, n_test);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);

    for (rows, quota) in members.iter_mut().zip(quotas) {
        rows.shuffle(&mut rng);
        let (t, r) = rows.split_at(quota);
        test.extend_from_slice(t);
        train.extend_from_slice(r);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok((train, test))
}

/// Largest-remainder allocation of `n_test` rows across classes.
fn allocate_test_quota(members: &[Vec<usize>], n_test: usize) -> Vec<usize> {
    let n: usize = members.iter().map(Vec::len).sum();
    let exact: Vec<f64> = members
        .iter()
        .map(|rows| rows.len() as f64 * n_test as f64 / n as f64)
        .collect();

    let mut quotas: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();
    let mut remaining = n_test.saturating_sub(quotas.iter().sum());

    let mut order: Vec<usize> = (0..members.len()).filter(|&c| !members[c].is_empty()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });
    for &class in order.iter().cycle().take(order.len() * 2) {
        if remaining == 0 {
            break;
        }
        if quotas[class] + 1 < members[class].len() {
            quotas[class] += 1;
            remaining -= 1;
        }
    }

    for (class, rows) in members.iter().enumerate() {
        if rows.len() >= 2 {
            quotas[class] = quotas[class].clamp(1, rows.len() - 1);
        } else {
            quotas[class] = 0;
        }
    }
    quotas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(counts: &[usize]) -> Vec<usize> {
        counts
            .iter()
            .enumerate()
            .flat_map(|(class, &c)| std::iter::repeat(class).take(c))
            .collect()
    }

    #[test]
    fn partitions_are_disjoint_and_complete() {
        let y = labels(&[50, 30, 20]);
        let (train, test) = stratified_split(&y, 0.2, 42).unwrap();
        assert_eq!(train.len() + test.len(), y.len());
        assert_eq!(test.len(), 20);

        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..y.len()).collect::<Vec<_>>());
    }

    #[test]
    fn preserves_class_proportions() {
        let y = labels(&[50, 30, 20]);
        let (_, test) = stratified_split(&y, 0.2, 7).unwrap();
        let per_class = |class| test.iter().filter(|&&i| y[i] == class).count();
        assert_eq!(per_class(0), 10);
        assert_eq!(per_class(1), 6);
        assert_eq!(per_class(2), 4);
    }

    #[test]
    fn deterministic_for_seed() {
        let y = labels(&[13, 17, 9]);
        assert_eq!(stratified_split(&y, 0.2, 42).unwrap(), stratified_split(&y, 0.2, 42).unwrap());
    }

    #[test]
    fn small_classes_keep_a_row_on_each_side() {
        let y = labels(&[40, 2]);
        let (train, test) = stratified_split(&y, 0.2, 1).unwrap();
        assert_eq!(test.iter().filter(|&&i| y[i] == 1).count(), 1);
        assert_eq!(train.iter().filter(|&&i| y[i] == 1).count(), 1);
    }

    #[test]
    fn singleton_class_is_rejected() {
        let y = labels(&[10, 1]);
        let err = stratified_split(&y, 0.2, 1).unwrap_err();
        assert!(matches!(err, DatasetError::InsufficientClassMembers { class: 1, count: 1 }));
    }
}
