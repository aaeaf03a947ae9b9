//! Candle classification against the immediately preceding bar.
//!
//! Numbering follows "The Strat": 1 = inside, 3 = outside, 2u / 2d =
//! directional. Branch order matters; the first matching rule wins.

use crate::domain::Bar;
use serde::{Deserialize, Serialize};

/// Relationship of a bar's range to its predecessor's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandleType {
    Inside,
    Outside,
    DirectionalUp,
    DirectionalDown,
    /// No predecessor, or a high/low value is missing.
    Unclassified,
}

impl CandleType {
    /// Numeric code used in exported signal tables (`None` for unclassified).
    pub fn code(self) -> Option<i8> {
        match self {
            Self::Inside => Some(1),
            Self::Outside => Some(3),
            Self::DirectionalUp => Some(2),
            Self::DirectionalDown => Some(-2),
            Self::Unclassified => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Inside => "1",
            Self::Outside => "3",
            Self::DirectionalUp => "2u",
            Self::DirectionalDown => "2d",
            Self::Unclassified => "-",
        }
    }

    pub fn is_classified(self) -> bool {
        !matches!(self, Self::Unclassified)
    }
}

/// Classify from raw high/low pairs.
///
/// `high == prev_high && low == prev_low` satisfies the inside rule and is
/// reported as `Inside`.
pub fn classify_range(high: f64, low: f64, prev_high: f64, prev_low: f64) -> CandleType {
    if high.is_nan() || low.is_nan() || prev_high.is_nan() || prev_low.is_nan() {
        return CandleType::Unclassified;
    }

    if high <= prev_high && low >= prev_low {
        CandleType::Inside
    } else if high > prev_high && low < prev_low {
        CandleType::Outside
    } else if high > prev_high && low >= prev_low {
        CandleType::DirectionalUp
    } else if low < prev_low && high <= prev_high {
        CandleType::DirectionalDown
    } else {
        CandleType::Unclassified
    }
}

/// Classify `current` relative to `previous`.
pub fn classify(current: &Bar, previous: &Bar) -> CandleType {
    classify_range(current.high, current.low, previous.high, previous.low)
}

/// Classify every bar in a sequence. The first bar is always `Unclassified`.
pub fn classify_series(bars: &[Bar]) -> Vec<CandleType> {
    let mut out = Vec::with_capacity(bars.len());
    if bars.is_empty() {
        return out;
    }
    out.push(CandleType::Unclassified);
    out.extend(bars.windows(2).map(|w| classify(&w[1], &w[0])));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_bars;

    #[test]
    fn inside_bar() {
        assert_eq!(classify_range(10.0, 5.0, 11.0, 4.0), CandleType::Inside);
    }

    #[test]
    fn outside_bar() {
        assert_eq!(classify_range(12.0, 3.0, 11.0, 4.0), CandleType::Outside);
    }

    #[test]
    fn directional_up() {
        assert_eq!(
            classify_range(12.0, 5.0, 11.0, 4.0),
            CandleType::DirectionalUp
        );
        // Equal low still counts as 2u
        assert_eq!(
            classify_range(12.0, 4.0, 11.0, 4.0),
            CandleType::DirectionalUp
        );
    }

    #[test]
    fn directional_down() {
        assert_eq!(
            classify_range(10.0, 3.0, 11.0, 4.0),
            CandleType::DirectionalDown
        );
        // Equal high still counts as 2d
        assert_eq!(
            classify_range(11.0, 3.0, 11.0, 4.0),
            CandleType::DirectionalDown
        );
    }

    #[test]
    fn identical_range_is_inside() {
        assert_eq!(classify_range(11.0, 4.0, 11.0, 4.0), CandleType::Inside);
    }

    #[test]
    fn missing_values_are_unclassified() {
        assert_eq!(
            classify_range(f64::NAN, 4.0, 11.0, 4.0),
            CandleType::Unclassified
        );
        assert_eq!(
            classify_range(12.0, 4.0, 11.0, f64::NAN),
            CandleType::Unclassified
        );
    }

    #[test]
    fn series_first_bar_unclassified() {
        let bars = make_ohlc_bars(&[
            (100.0, 105.0, 95.0, 102.0),
            (102.0, 108.0, 100.0, 106.0), // 2u
            (106.0, 107.0, 98.0, 99.0),   // 2d (low 98 < 100, high 107 <= 108)
            (99.0, 103.0, 99.0, 101.0),   // inside
        ]);
        let types = classify_series(&bars);
        assert_eq!(
            types,
            vec![
                CandleType::Unclassified,
                CandleType::DirectionalUp,
                CandleType::DirectionalDown,
                CandleType::Inside,
            ]
        );
    }

    #[test]
    fn series_empty() {
        assert!(classify_series(&[]).is_empty());
    }

    #[test]
    fn codes_and_labels() {
        assert_eq!(CandleType::DirectionalDown.code(), Some(-2));
        assert_eq!(CandleType::Unclassified.code(), None);
        assert_eq!(CandleType::DirectionalUp.label(), "2u");
        assert!(!CandleType::Unclassified.is_classified());
    }
}
