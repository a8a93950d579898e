use crate::border::border_array;
use crate::strategy::{BufferStrategy, OwnedBuffers};
use tracing::trace;

/// Which repeating unit to report when several tile the input.
///
/// An input with minimal period `p` repeated `m` times is also tiled by
/// `p * d` for every proper divisor `d` of `m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSelection {
    /// Longest unit repeated at least twice. For an even repeat count this
    /// is the half-length split.
    #[default]
    Longest,
    /// The minimal period. Differs from the [`crate::Matcher`] baselines
    /// whenever a longer unit also tiles the input.
    Minimal,
}

impl UnitSelection {
    /// Length of the selected unit given the minimal `period` and its
    /// `count` of repetitions (`count >= 2`).
    pub fn unit_len(self, period: usize, count: usize) -> usize {
        debug_assert!(count >= 2, "Unit must repeat at least twice");
        match self {
            UnitSelection::Minimal => period,
            UnitSelection::Longest => period * (count / smallest_prime_factor(count)),
        }
    }
}

/// Smallest prime factor of `m >= 2`.
fn smallest_prime_factor(m: usize) -> usize {
    if m % 2 == 0 {
        return 2;
    }
    let mut f = 3;
    while f <= m / f {
        if m % f == 0 {
            return f;
        }
        f += 2;
    }
    m
}

/// Periodic structure of an input, with the reason when it has no
/// repeating unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Periodicity {
    /// Zero-length input.
    Empty,
    /// No proper prefix is also a suffix.
    Aperiodic,
    /// The minimal period does not divide the length, e.g. `abcab`.
    NonTiling { period: usize },
    /// The input is `count >= 2` copies of its first `period` symbols.
    Repeating { period: usize, count: usize },
}

impl Periodicity {
    pub fn is_repeating(&self) -> bool {
        matches!(self, Periodicity::Repeating { .. })
    }
}

/// Border-array based repetition detector.
///
/// Stateless between calls apart from whatever the buffer strategy pools,
/// so one detector can be shared across threads when `S` allows it.
///
/// ```
/// use period_rs::PeriodDetector;
///
/// let detector = PeriodDetector::new();
/// assert_eq!(detector.detect_str("abcabcabc"), Some("abc"));
/// assert_eq!(detector.detect_str("aaaa"), Some("aa"));
/// assert_eq!(detector.detect_str("abcde"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PeriodDetector<S = OwnedBuffers> {
    strategy: S,
    selection: UnitSelection,
}

impl PeriodDetector<OwnedBuffers> {
    /// Creates a detector that allocates fresh scratch space per call.
    pub fn new() -> Self {
        Self::with_strategy(OwnedBuffers)
    }
}

impl<S: BufferStrategy> PeriodDetector<S> {
    /// Creates a detector using `strategy` for scratch space.
    pub fn with_strategy(strategy: S) -> Self {
        Self {
            strategy,
            selection: UnitSelection::default(),
        }
    }

    /// Sets the unit selection policy.
    pub fn with_selection(mut self, selection: UnitSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn selection(&self) -> UnitSelection {
        self.selection
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Classifies the periodic structure of `input`.
    pub fn analyze<T: PartialEq>(&self, input: &[T]) -> Periodicity {
        let n = input.len();
        if n == 0 {
            return Periodicity::Empty;
        }

        let suffix_border = self
            .strategy
            .with_scratch(n, |scratch| border_array(input, scratch));

        if suffix_border == 0 {
            return Periodicity::Aperiodic;
        }

        let period = n - suffix_border;
        if n % period != 0 {
            return Periodicity::NonTiling { period };
        }

        Periodicity::Repeating {
            period,
            count: n / period,
        }
    }

    /// Returns the repeating unit of `input`, or `None` if `input` is not
    /// two or more copies of a shorter sequence.
    pub fn detect<'a, T: PartialEq>(&self, input: &'a [T]) -> Option<&'a [T]> {
        let periodicity = self.analyze(input);
        let Periodicity::Repeating { period, count } = periodicity else {
            trace!(len = input.len(), ?periodicity, "No repeating unit");
            return None;
        };

        let unit_len = self.selection.unit_len(period, count);
        trace!(
            len = input.len(),
            period,
            count,
            unit_len,
            "Repeating unit found"
        );
        Some(&input[..unit_len])
    }

    /// Text convenience over [`crate::detect_str`].
    pub fn detect_str<'a>(&self, text: &'a str) -> Option<&'a str> {
        crate::matcher::detect_str(self, text)
    }
}
