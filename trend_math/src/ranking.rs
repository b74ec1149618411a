//! Ranking with ties

/// Rank values from highest to lowest using the "min" convention
///
/// Equal values share the lowest rank of their group and the next distinct value
/// resumes at the number of values ranked equal-or-better plus one, so
/// `[10, 10, 5]` ranks as `[1, 1, 3]`. NaN values rank after every number and
/// share one rank among themselves.
pub fn min_rank_descending(values: &[f64]) -> Vec<usize> {
    let defined = values.iter().filter(|v| !v.is_nan()).count();

    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                defined + 1
            } else {
                values.iter().filter(|&&other| other > v).count() + 1
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties_share_lowest_rank() {
        assert_eq!(min_rank_descending(&[10.0, 10.0, 5.0]), vec![1, 1, 3]);
        assert_eq!(min_rank_descending(&[5.0, 10.0, 10.0]), vec![3, 1, 1]);
    }

    #[test]
    fn test_distinct_values() {
        assert_eq!(
            min_rank_descending(&[-2.0, 7.5, 0.0, 3.0]),
            vec![4, 1, 3, 2]
        );
    }

    #[test]
    fn test_nan_ranks_last() {
        assert_eq!(
            min_rank_descending(&[f64::NAN, 1.0, f64::NAN, 2.0]),
            vec![3, 2, 3, 1]
        );
    }

    #[test]
    fn test_empty() {
        assert!(min_rank_descending(&[]).is_empty());
    }
}
