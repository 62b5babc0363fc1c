//! Bucket count derivation.

/// Bucket count used when the requested capacity is 2 or less.
pub const DEFAULT_CAPACITY: usize = 137;

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut i = 2;
    while i <= n / i {
        if n % i == 0 {
            return false;
        }
        i += 1;
    }
    true
}

/// Effective bucket count for a requested capacity: requests of 2 or less
/// become `DEFAULT_CAPACITY`, then the result is the largest prime not
/// above the request. `None` when no such prime exists.
pub fn capacity_for(requested: usize) -> Option<usize> {
    let start = if requested <= 2 {
        DEFAULT_CAPACITY
    } else {
        requested
    };
    (2..=start).rev().find(|&n| is_prime(n))
}
