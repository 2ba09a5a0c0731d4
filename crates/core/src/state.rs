/// A point-in-time snapshot of system resource usage.
///
/// Snapshots are the items recorded in the sample history. [`zero`],
/// [`sum`] and [`divide`] give them the arithmetic needed for windowed
/// averages.
///
/// [`zero`]: SystemSnapshot::zero
/// [`sum`]: SystemSnapshot::sum
/// [`divide`]: SystemSnapshot::divide
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemSnapshot {
    /// Average CPU usage across all cores (0.0 – 100.0).
    pub cpu_average: f32,
    /// RAM used in bytes.
    pub ram_used: u64,
    /// Total RAM in bytes.
    pub ram_total: u64,
    /// Network receive rate in bytes/second.
    pub net_rx: u64,
    /// Network transmit rate in bytes/second.
    pub net_tx: u64,
}

impl SystemSnapshot {
    /// Additive identity for [`sum`](Self::sum).
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Field-wise total of two snapshots.
    #[must_use]
    pub fn sum(self, other: &Self) -> Self {
        Self {
            cpu_average: self.cpu_average + other.cpu_average,
            ram_used:    self.ram_used.saturating_add(other.ram_used),
            ram_total:   self.ram_total.saturating_add(other.ram_total),
            net_rx:      self.net_rx.saturating_add(other.net_rx),
            net_tx:      self.net_tx.saturating_add(other.net_tx),
        }
    }

    /// Field-wise division of an accumulated total by a sample count.
    /// A count of zero leaves the snapshot untouched.
    #[must_use]
    pub fn divide(self, count: usize) -> Self {
        if count == 0 {
            return self;
        }
        let n = count as u64;
        Self {
            cpu_average: self.cpu_average / count as f32,
            ram_used:    self.ram_used / n,
            ram_total:   self.ram_total / n,
            net_rx:      self.net_rx / n,
            net_tx:      self.net_tx / n,
        }
    }

    /// RAM usage as a fraction in `[0, 1]`.
    #[must_use]
    pub fn ram_fraction(&self) -> f32 {
        if self.ram_total == 0 {
            return 0.0;
        }
        self.ram_used as f32 / self.ram_total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(cpu: f32, ram: u64, rx: u64) -> SystemSnapshot {
        SystemSnapshot {
            cpu_average: cpu,
            ram_used: ram,
            ram_total: 1_000,
            net_rx: rx,
            net_tx: 0,
        }
    }

    #[test]
    fn sum_then_divide_averages_fields() {
        let total = SystemSnapshot::zero()
            .sum(&snap(10.0, 200, 30))
            .sum(&snap(20.0, 400, 60))
            .sum(&snap(30.0, 600, 90));
        let avg = total.divide(3);
        assert_eq!(avg, snap(20.0, 400, 60));
    }

    #[test]
    fn divide_by_zero_is_identity() {
        let s = snap(12.5, 10, 1);
        assert_eq!(s.divide(0), s);
    }

    #[test]
    fn ram_fraction_handles_missing_total() {
        assert_eq!(SystemSnapshot::zero().ram_fraction(), 0.0);
        assert_eq!(snap(0.0, 250, 0).ram_fraction(), 0.25);
    }
}
