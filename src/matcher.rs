use crate::detector::PeriodDetector;
use crate::strategy::BufferStrategy;

/// Finds the longest unit `P` such that the input is `P` repeated two or more
/// times.
///
/// Every implementation returns the same answer for the same input; they
/// differ only in cost. Object safe, so heterogeneous matchers can be
/// compared side by side as `Box<dyn Matcher<T>>`.
pub trait Matcher<T> {
    /// Returns the repeating unit as a prefix of `input`, or `None`.
    fn detect<'a>(&self, input: &'a [T]) -> Option<&'a [T]>;

    /// Short label for reports and benchmarks.
    fn name(&self) -> &'static str;
}

impl<T: PartialEq, S: BufferStrategy> Matcher<T> for PeriodDetector<S> {
    fn detect<'a>(&self, input: &'a [T]) -> Option<&'a [T]> {
        PeriodDetector::<S>::detect(self, input)
    }

    fn name(&self) -> &'static str {
        "border-array"
    }
}

/// Runs `matcher` over text.
///
/// ASCII text is matched byte-wise. Anything else is matched over its
/// `char`s so a unit never ends inside a multi-byte character.
pub fn detect_str<'a, M>(matcher: &M, text: &'a str) -> Option<&'a str>
where
    M: Matcher<u8> + Matcher<char> + ?Sized,
{
    if text.is_ascii() {
        let unit = Matcher::<u8>::detect(matcher, text.as_bytes())?;
        return Some(&text[..unit.len()]);
    }

    let chars: Vec<char> = text.chars().collect();
    let unit_chars = Matcher::<char>::detect(matcher, &chars)?.len();
    let end = text
        .char_indices()
        .nth(unit_chars)
        .map_or(text.len(), |(idx, _)| idx);
    Some(&text[..end])
}

/// Brute-force baseline: tries repeat counts `2..=n` and compares every
/// chunk against the first.
#[derive(Debug, Clone, Copy, Default)]
pub struct DivisorScan;

impl<T: PartialEq> Matcher<T> for DivisorScan {
    fn detect<'a>(&self, input: &'a [T]) -> Option<&'a [T]> {
        let n = input.len();
        (2..=n)
            .filter(|count| n % count == 0)
            .map(|count| &input[..n / count])
            .find(|unit| input.chunks_exact(unit.len()).all(|chunk| chunk == *unit))
    }

    fn name(&self) -> &'static str {
        "divisor-scan"
    }
}

/// Brute-force baseline: tries repeat counts `2..=n`, builds the candidate
/// unit repeated that many times and compares it to the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepeatCompare;

impl<T: PartialEq + Clone> Matcher<T> for RepeatCompare {
    fn detect<'a>(&self, input: &'a [T]) -> Option<&'a [T]> {
        let n = input.len();
        for count in (2..=n).filter(|count| n % count == 0) {
            let unit = &input[..n / count];
            let mut rebuilt = Vec::with_capacity(n);
            for _ in 0..count {
                rebuilt.extend_from_slice(unit);
            }
            if rebuilt.as_slice() == input {
                return Some(unit);
            }
        }
        None
    }

    fn name(&self) -> &'static str {
        "repeat-compare"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matchers() -> Vec<Box<dyn Matcher<char>>> {
        vec![
            Box::new(PeriodDetector::new()),
            Box::new(DivisorScan),
            Box::new(RepeatCompare),
        ]
    }

    #[test]
    fn test_baselines_on_scenarios() {
        let cases = [
            ("abab", Some("ab")),
            ("aaaa", Some("aa")),
            ("abcabcabc", Some("abc")),
            ("ababab", Some("ab")),
            ("abcde", None),
            ("abcab", None),
            ("a", None),
            ("", None),
        ];

        for matcher in matchers() {
            for (input, expected) in cases {
                let chars: Vec<char> = input.chars().collect();
                let unit: Option<String> = matcher.detect(&chars).map(|u| u.iter().collect());
                assert_eq!(
                    unit.as_deref(),
                    expected,
                    "{} disagrees on {:?}",
                    matcher.name(),
                    input
                );
            }
        }
    }

    #[test]
    fn test_detect_str_for_baselines() {
        assert_eq!(detect_str(&DivisorScan, "xyzxyz"), Some("xyz"));
        assert_eq!(detect_str(&RepeatCompare, "ñoño"), Some("ño"));
        assert_eq!(detect_str(&DivisorScan, "ñoñ"), None);
    }

    #[test]
    fn test_names_are_distinct() {
        let names: Vec<_> = matchers().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["border-array", "divisor-scan", "repeat-compare"]);
    }
}
