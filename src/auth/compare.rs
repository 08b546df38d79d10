//! Constant-time byte comparison.

use subtle::{Choice, ConstantTimeEq};

#[cfg(test)]
thread_local! {
    static STEPS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Compare two byte sequences without leaking where (or whether) they differ.
///
/// Both inputs are walked up to the longer length, missing bytes read as zero.
/// The length check is folded into the same `Choice` as the content check,
/// so unequal lengths never take an early exit.
#[must_use]
pub fn timing_safe_eq(a: &[u8], b: &[u8]) -> bool {
    let max_len = a.len().max(b.len());
    let mut equal: Choice = (a.len() as u64).ct_eq(&(b.len() as u64));

    for i in 0..max_len {
        let left = a.get(i).copied().unwrap_or(0);
        let right = b.get(i).copied().unwrap_or(0);
        equal &= left.ct_eq(&right);

        #[cfg(test)]
        STEPS.with(|steps| steps.set(steps.get() + 1));
    }

    bool::from(equal)
}

/// String flavour of [`timing_safe_eq`], comparing the UTF-8 bytes.
#[must_use]
pub fn timing_safe_str_eq(a: &str, b: &str) -> bool {
    timing_safe_eq(a.as_bytes(), b.as_bytes())
}

/// Run `f` and return how many byte pairs the comparator visited on this thread.
#[cfg(test)]
pub(crate) fn count_steps<T>(f: impl FnOnce() -> T) -> (T, usize) {
    STEPS.with(|steps| steps.set(0));
    let result = f();
    (result, STEPS.with(std::cell::Cell::get))
}
