/// Mean of per-core usage percentages; `0.0` when no cores are reported.
pub fn average_usage(per_core: impl IntoIterator<Item = f32>) -> f32 {
    let (total, cores) = per_core
        .into_iter()
        .fold((0.0_f32, 0usize), |(sum, n), usage| (sum + usage, n + 1));
    if cores == 0 {
        return 0.0;
    }
    total / cores as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_cores() {
        assert_eq!(average_usage([10.0, 30.0, 50.0, 70.0]), 40.0);
    }

    #[test]
    fn no_cores_means_idle() {
        assert_eq!(average_usage(Vec::<f32>::new()), 0.0);
    }
}
