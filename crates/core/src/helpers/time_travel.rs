//! Clock math for the simulated ledger clock.
//!
//! Pure functions over the `Clock` sysvar. They never touch the engine; the
//! read-modify-write steps live in `connection::clock`.

use solana_clock::{Clock, Slot, UnixTimestamp};

use crate::types::TimeTravelError;

/// Calculates the clock that follows a processed transaction.
///
/// # Arguments
/// * `current` - The clock as read from the engine after warping to `next_slot`
/// * `next_slot` - The slot the engine was warped to
///
/// # Returns
/// The clock to commit: `slot` is `next_slot`, `unix_timestamp` is one second after the
/// current one, every other field is carried over from `current`.
pub fn next_slot_clock(current: &Clock, next_slot: Slot) -> Result<Clock, TimeTravelError> {
    let unix_timestamp =
        current
            .unix_timestamp
            .checked_add(1)
            .ok_or(TimeTravelError::TimestampOverflow {
                current: current.unix_timestamp,
                seconds: 1,
            })?;

    Ok(Clock {
        slot: next_slot,
        epoch_start_timestamp: current.epoch_start_timestamp,
        epoch: current.epoch,
        leader_schedule_epoch: current.leader_schedule_epoch,
        unix_timestamp,
    })
}

/// Shifts the unix timestamp by `seconds`, leaving the slot and epoch fields untouched.
/// Negative values move the clock back.
pub fn advance_clock_by_seconds(current: &Clock, seconds: i64) -> Result<Clock, TimeTravelError> {
    let unix_timestamp =
        current
            .unix_timestamp
            .checked_add(seconds)
            .ok_or(TimeTravelError::TimestampOverflow {
                current: current.unix_timestamp,
                seconds,
            })?;

    Ok(Clock {
        unix_timestamp,
        ..current.clone()
    })
}

/// Sets the unix timestamp to an arbitrary value. Travelling backwards is allowed.
pub fn clock_at_timestamp(current: &Clock, timestamp: UnixTimestamp) -> Clock {
    Clock {
        unix_timestamp: timestamp,
        ..current.clone()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn clock() -> Clock {
        Clock {
            slot: 123,
            epoch_start_timestamp: 100,
            epoch: 1,
            leader_schedule_epoch: 2,
            unix_timestamp: 1_000,
        }
    }

    #[test]
    fn test_next_slot_clock() {
        let warped = Clock {
            slot: 124,
            ..clock()
        };
        let next = next_slot_clock(&warped, 124).unwrap();
        assert_eq!(next.slot, 124);
        assert_eq!(next.unix_timestamp, 1_001);
        assert_eq!(next.epoch, 1);
        assert_eq!(next.epoch_start_timestamp, 100);
        assert_eq!(next.leader_schedule_epoch, 2);
    }

    #[test]
    fn test_next_slot_clock_overflow() {
        let at_max = Clock {
            unix_timestamp: i64::MAX,
            ..clock()
        };
        assert_eq!(
            next_slot_clock(&at_max, 124),
            Err(TimeTravelError::TimestampOverflow {
                current: i64::MAX,
                seconds: 1
            })
        );
    }

    #[test_case(0, 1_000 ; "zero seconds")]
    #[test_case(1, 1_001 ; "one second")]
    #[test_case(86_400, 87_400 ; "one day")]
    #[test_case(-400, 600 ; "backwards")]
    fn test_advance_clock_by_seconds(seconds: i64, expected: i64) {
        let advanced = advance_clock_by_seconds(&clock(), seconds).unwrap();
        assert_eq!(advanced.unix_timestamp, expected);
        assert_eq!(advanced.slot, 123);
        assert_eq!(advanced.epoch, 1);
    }

    #[test]
    fn test_advance_clock_overflow() {
        assert_eq!(
            advance_clock_by_seconds(&clock(), i64::MAX),
            Err(TimeTravelError::TimestampOverflow {
                current: 1_000,
                seconds: i64::MAX
            })
        );
    }

    #[test_case(2_000 ; "forward")]
    #[test_case(10 ; "backward")]
    fn test_clock_at_timestamp(timestamp: i64) {
        let travelled = clock_at_timestamp(&clock(), timestamp);
        assert_eq!(travelled.unix_timestamp, timestamp);
        assert_eq!(travelled.slot, 123);
    }
}
