/// Asserts that a numerical value is in the provided interval `[a,b]` and panics
/// with a helpful message if not
///
/// ### Example
/// ```should_panic
/// # use textrl::assert_interval;
/// let value = 2.0;
/// assert_interval!(value, 0.0, 1.0);
/// ```
/// This will panic with the message "Invalid value for \`value\`. Must be in the interval \[0, 1\]."
#[macro_export]
macro_rules! assert_interval {
    ($var:expr, $a:expr, $b:expr) => {
        assert!(
            $var >= $a && $var <= $b,
            "Invalid value for `{}`. Must be in the interval [{}, {}].",
            stringify!($var),
            $a,
            $b,
        );
    };
}

/// Checks that `value` lies in `[a,b]`, reporting the parameter `name` otherwise
pub(crate) fn check_interval(
    name: &'static str,
    value: f32,
    a: f32,
    b: f32,
    expected: &'static str,
) -> crate::error::Result<()> {
    (value >= a && value <= b)
        .then_some(())
        .ok_or(crate::error::Error::InvalidConfig {
            name,
            value: value.into(),
            expected,
        })
}

/// Exponentially weighted moving average of a series, most recent value weighted highest
///
/// Element `i` of an `n`-long series gets weight `alpha^(n-1-i)`. Returns `0.0` for an empty series.
pub fn ewma(values: &[f32], alpha: f32) -> f32 {
    let n = values.len();
    let (weighted, total) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(weighted, total), (i, &x)| {
            let w = alpha.powi((n - 1 - i) as i32);
            (weighted + w * x, total + w)
        });
    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}

/// Arithmetic mean, `0.0` for an empty slice
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

pub fn transpose_iter<T>(v: Vec<Vec<T>>) -> impl Iterator<Item = Vec<T>> {
    assert!(!v.is_empty());
    let len = v[0].len();
    let mut iters = v.into_iter().map(|n| n.into_iter()).collect::<Vec<_>>();
    (0..len).map(move |_| {
        iters
            .iter_mut()
            .map(|n| n.next().unwrap())
            .collect::<Vec<T>>()
    })
}

pub fn transpose<T>(v: Vec<Vec<T>>) -> Vec<Vec<T>> {
    transpose_iter(v).collect()
}
