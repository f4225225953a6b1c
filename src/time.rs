//! Wraparound-tolerant clock arithmetic (spec §4.6, P7).
//!
//! The platform's microsecond/millisecond counters wrap at `u32::MAX`; every
//! comparison here is written so a deadline that wraps mid-wait still
//! expires at the right elapsed time instead of immediately or never.

/// Elapsed time between `timestamp` and `now`, tolerant of one wraparound.
/// Valid as long as the true elapsed time is under `u32::MAX / 2`, which
/// always holds for the sub-second budgets this driver waits on.
pub fn elapsed_since(now: u32, timestamp: u32) -> u32 {
    now.wrapping_sub(timestamp)
}

/// `true` while a wait that started at `start` with the given `timeout`
/// should keep spinning, given the current time `now`. Matches spec 4.6's
/// `expectResponse` loop condition: continue while `now < stop`, or, if the
/// deadline wrapped past zero, while `now` hasn't yet wrapped around to meet
/// `start`.
pub fn before_deadline(now: u32, start: u32, timeout: u32) -> bool {
    let stop = start.wrapping_add(timeout);
    let wrapped = stop < start;
    if wrapped {
        now < stop || start <= now
    } else {
        now < stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_wrapping_deadline() {
        assert!(before_deadline(5, 0, 10));
        assert!(!before_deadline(10, 0, 10));
        assert!(!before_deadline(11, 0, 10));
    }

    #[test]
    fn wrapping_deadline_terminates_after_full_timeout_not_immediately() {
        let start = u32::MAX - 5;
        let timeout = 10;
        // stop = start + 10 wraps to 4.
        assert!(before_deadline(start, start, timeout));
        assert!(before_deadline(u32::MAX, start, timeout));
        assert!(before_deadline(0, start, timeout));
        assert!(before_deadline(3, start, timeout));
        assert!(!before_deadline(4, start, timeout));
        assert!(!before_deadline(5, start, timeout));
    }

    #[test]
    fn elapsed_since_wraps_correctly() {
        assert_eq!(elapsed_since(5, 0), 5);
        assert_eq!(elapsed_since(2, u32::MAX - 2), 5);
    }
}
