/// Window sizes and thresholds for [`peak_pick`].
#[derive(Clone, Debug, PartialEq)]
pub struct PeakPickParams {
    /// Samples before a peak that may not exceed it
    pub pre_max: usize,
    /// Samples after a peak that may not exceed it
    pub post_max: usize,
    /// Samples before a peak averaged for the prominence test
    pub pre_avg: usize,
    /// Samples from the peak onward averaged for the prominence test
    pub post_avg: usize,
    /// Margin a peak must clear above both averages
    pub delta: f64,
    /// Minimum number of samples between accepted peaks
    pub wait: usize,
}

impl Default for PeakPickParams {
    fn default() -> Self {
        Self {
            pre_max: 3,
            post_max: 3,
            pre_avg: 3,
            post_avg: 5,
            delta: 0.5,
            wait: 10,
        }
    }
}

fn mean(window: &[f64]) -> Option<f64> {
    if window.is_empty() {
        None
    } else {
        Some(window.iter().sum::<f64>() / window.len() as f64)
    }
}

/// Indices of salient peaks in `x`, in increasing order.
///
/// An index `i` is accepted when all of the following hold:
/// - every window it needs lies inside `x`;
/// - `x[i]` is non-zero and no value in `x[i - pre_max ..= i + post_max]` exceeds it;
/// - `x[i]` clears `mean(x[i - pre_avg .. i]) + delta` and `mean(x[i .. i + post_avg]) + delta`;
/// - it lies more than `wait` samples after the previously accepted peak.
pub fn peak_pick(x: &[f64], params: &PeakPickParams) -> Vec<usize> {
    let n = x.len();
    let first = params.pre_max.max(params.pre_avg);
    let mut peaks = Vec::new();
    let mut last: Option<usize> = None;

    for i in first..n {
        if i.saturating_add(params.post_max) >= n || i.saturating_add(params.post_avg) > n {
            break;
        }

        let value = x[i];
        if value == 0.0 {
            continue;
        }

        let is_local_max = x[i - params.pre_max..=i + params.post_max]
            .iter()
            .all(|&v| value >= v);
        if !is_local_max {
            continue;
        }

        let clears = |window: &[f64]| mean(window).map_or(true, |m| value >= m + params.delta);
        if !clears(&x[i - params.pre_avg..i]) || !clears(&x[i..i + params.post_avg]) {
            continue;
        }

        if last.map_or(true, |l| i > l.saturating_add(params.wait)) {
            peaks.push(i);
            last = Some(i);
        }
    }

    peaks
}
