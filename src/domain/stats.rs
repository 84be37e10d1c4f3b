// Stats reducer - Summary statistics over a window snapshot
use super::telemetry::Sample;

/// Min/max/average/current of a window.
///
/// An empty window reduces to all zeros rather than failing, so a freshly
/// mounted channel with no history still renders.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DerivedStats {
    pub min: f64,
    pub max: f64,
    /// Arithmetic mean rounded to the nearest integer
    pub average: f64,
    /// Value of the newest sample
    pub current: f64,
}

pub fn reduce(snapshot: &[Sample]) -> DerivedStats {
    let Some(last) = snapshot.last() else {
        return DerivedStats::default();
    };

    let (min, max, sum) = snapshot.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0),
        |(min, max, sum), s| (min.min(s.value), max.max(s.value), sum + s.value),
    );

    DerivedStats {
        min,
        max,
        average: (sum / snapshot.len() as f64).round(),
        current: last.value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn samples(values: &[f64]) -> Vec<Sample> {
        let t = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        values.iter().map(|v| Sample::new(t, *v)).collect()
    }

    #[test]
    fn test_reduce_basic() {
        let stats = reduce(&samples(&[10.0, 20.0, 30.0]));
        assert_eq!(
            stats,
            DerivedStats {
                min: 10.0,
                max: 30.0,
                average: 20.0,
                current: 30.0,
            }
        );
    }

    #[test]
    fn test_reduce_empty_is_zero() {
        assert_eq!(reduce(&[]), DerivedStats::default());
        let stats = reduce(&[]);
        assert_eq!((stats.min, stats.max, stats.average, stats.current), (0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_average_rounds() {
        // 61 + 62 = 123 / 2 = 61.5
        assert_eq!(reduce(&samples(&[61.0, 62.0])).average, 62.0);
        assert_eq!(reduce(&samples(&[60.0, 60.0, 61.0])).average, 60.0);
    }

    #[test]
    fn test_current_is_newest_not_largest() {
        let stats = reduce(&samples(&[440.0, 300.0]));
        assert_eq!(stats.current, 300.0);
        assert_eq!(stats.max, 440.0);
    }
}
