//! Prime table sizing
//!
//! Quadratic probing only guarantees distinct probe positions over the
//! first half of the table when the capacity is prime, so every table
//! the store allocates has a prime capacity in `[MINPRIME, MAXPRIME]`.

use super::{MAXPRIME, MINPRIME};

/// Trial-division primality test
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Smallest prime strictly greater than `n`, never below `MINPRIME`
///
/// Saturates at `MAXPRIME` when no prime exists in `(n, MAXPRIME)`.
pub fn find_next_prime(n: usize) -> usize {
    let start = n.max(MINPRIME - 1) + 1;
    (start..MAXPRIME).find(|&i| is_prime(i)).unwrap_or(MAXPRIME)
}

/// Normalize a requested capacity: clamp into `[MINPRIME, MAXPRIME]`,
/// then round up to the next prime if needed
pub fn normalize_capacity(requested: usize) -> usize {
    let clamped = requested.clamp(MINPRIME, MAXPRIME);
    if is_prime(clamped) {
        clamped
    } else {
        find_next_prime(clamped)
    }
}
