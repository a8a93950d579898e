/// Fills `border` with the failure function of `input` and returns the
/// border length of the whole input.
///
/// `border[i]` is the length of the longest proper prefix of `input[..=i]`
/// that is also a suffix of it. Runs in linear time; only the first
/// `input.len()` slots of `border` are written.
///
/// # Panics
///
/// Panics if `border` is shorter than `input`. That is a wiring bug in the
/// caller's buffer strategy, not a property of the input.
pub fn border_array<T: PartialEq>(input: &[T], border: &mut [usize]) -> usize {
    let n = input.len();
    assert!(
        border.len() >= n,
        "Scratch buffer holds {} slots, need {}",
        border.len(),
        n
    );

    if n == 0 {
        return 0;
    }

    border[0] = 0;
    let mut len = 0;
    let mut i = 1;

    while i < n {
        if input[i] == input[len] {
            len += 1;
            border[i] = len;
            i += 1;
        } else if len != 0 {
            // Fall back along the border chain, same i
            len = border[len - 1];
        } else {
            border[i] = 0;
            i += 1;
        }
    }

    border[n - 1]
}
