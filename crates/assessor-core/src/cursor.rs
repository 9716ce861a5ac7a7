//! Navigation cursor over the snapshotted question list.

use crate::error::SessionError;

/// Index of the question currently shown. Always within `[0, len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationCursor {
    index: usize,
    len: usize,
}

impl NavigationCursor {
    /// A cursor at the first of `len` questions. `None` when `len` is zero.
    pub fn new(len: usize) -> Option<Self> {
        (len > 0).then_some(Self { index: 0, len })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.len
    }

    /// Advance by one; no-op on the last question.
    pub fn next(&mut self) -> usize {
        if !self.is_last() {
            self.index += 1;
        }
        self.index
    }

    /// Retreat by one; no-op on the first question.
    pub fn previous(&mut self) -> usize {
        if !self.is_first() {
            self.index -= 1;
        }
        self.index
    }

    /// Jump directly to `index`.
    pub fn jump_to(&mut self, index: usize) -> Result<usize, SessionError> {
        if index >= self.len {
            return Err(SessionError::OutOfRange {
                index,
                len: self.len,
            });
        }
        self.index = index;
        Ok(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cursor_is_rejected() {
        assert!(NavigationCursor::new(0).is_none());
    }

    #[test]
    fn boundaries_are_no_ops() {
        let mut cursor = NavigationCursor::new(3).unwrap();
        assert_eq!(cursor.previous(), 0);
        assert_eq!(cursor.next(), 1);
        assert_eq!(cursor.next(), 2);
        assert_eq!(cursor.next(), 2);
        assert!(cursor.is_last());
        assert_eq!(cursor.previous(), 1);
    }

    #[test]
    fn jump_out_of_range_leaves_cursor() {
        let mut cursor = NavigationCursor::new(5).unwrap();
        cursor.jump_to(3).unwrap();
        assert_eq!(
            cursor.jump_to(7),
            Err(SessionError::OutOfRange { index: 7, len: 5 })
        );
        assert_eq!(cursor.jump_to(5), Err(SessionError::OutOfRange { index: 5, len: 5 }));
        assert_eq!(cursor.index(), 3);
    }

    #[test]
    fn stays_in_bounds_under_any_sequence() {
        let mut cursor = NavigationCursor::new(4).unwrap();
        // Deterministic pseudo-random walk over all three operations.
        let mut seed: u32 = 17;
        for _ in 0..1_000 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            match (seed >> 16) % 3 {
                0 => {
                    cursor.next();
                }
                1 => {
                    cursor.previous();
                }
                _ => {
                    let _ = cursor.jump_to(((seed >> 8) % 6) as usize);
                }
            }
            assert!(cursor.index() < cursor.len());
        }
    }
}
