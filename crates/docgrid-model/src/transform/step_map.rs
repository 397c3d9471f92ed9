/// Which side a position at the edge of a replaced range sticks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// Position map of one replace step: `old_size` positions starting at
/// `from` became `new_size` positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepMap {
    pub from: usize,
    pub old_size: usize,
    pub new_size: usize,
}

impl StepMap {
    pub fn new(from: usize, old_size: usize, new_size: usize) -> Self {
        Self {
            from,
            old_size,
            new_size,
        }
    }

    /// A step that moved nothing (markup changes, selection changes).
    pub fn identity() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn is_identity(&self) -> bool {
        self.old_size == 0 && self.new_size == 0
    }

    /// End of the replaced range in the old document.
    pub fn old_end(&self) -> usize {
        self.from + self.old_size
    }

    /// Map a position from before the step to after it.
    ///
    /// Positions inside a replaced range collapse onto one of its edges:
    /// the start of the range always maps to the left edge and the end to
    /// the right edge; `assoc` decides for pure insertions and for
    /// positions strictly inside the range.
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        let end = self.old_end();
        if pos < self.from {
            return pos;
        }
        if pos > end {
            return pos - self.old_size + self.new_size;
        }
        let side = if self.old_size == 0 {
            assoc
        } else if pos == self.from {
            Assoc::Left
        } else if pos == end {
            Assoc::Right
        } else {
            assoc
        };
        match side {
            Assoc::Left => self.from,
            Assoc::Right => self.from + self.new_size,
        }
    }

    /// Whether the replaced range reaches into `from..to` or touches one of
    /// its edges from inside.
    pub fn touches(&self, from: usize, to: usize) -> bool {
        if self.is_identity() {
            return false;
        }
        let end = self.old_end();
        let before = end <= from;
        let after = self.from >= to;
        let inside = self.from > from && end < to;
        !(before || after || inside)
    }
}

/// The step maps a transaction accumulated, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Map a position through every step in order.
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.maps
            .iter()
            .fold(pos, |pos, step| step.map(pos, assoc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(3, Assoc::Right, 3)]
    #[case(5, Assoc::Right, 5)]
    #[case(6, Assoc::Right, 7)]
    #[case(7, Assoc::Left, 5)]
    #[case(8, Assoc::Right, 7)]
    #[case(12, Assoc::Right, 11)]
    fn maps_around_a_shrinking_replace(#[case] pos: usize, #[case] assoc: Assoc, #[case] expected: usize) {
        // 5..8 (3 positions) replaced by 2 positions
        let map = StepMap::new(5, 3, 2);
        assert_eq!(map.map(pos, assoc), expected);
    }

    #[test]
    fn insertions_use_assoc() {
        let map = StepMap::new(4, 0, 3);
        assert_eq!(map.map(4, Assoc::Left), 4);
        assert_eq!(map.map(4, Assoc::Right), 7);
        assert_eq!(map.map(9, Assoc::Left), 12);
    }

    #[test]
    fn touches_detects_overlap_with_a_node() {
        // node occupying 10..15
        assert!(!StepMap::new(2, 3, 0).touches(10, 15));
        assert!(!StepMap::new(15, 0, 4).touches(10, 15));
        assert!(!StepMap::new(11, 2, 5).touches(10, 15));
        assert!(StepMap::new(10, 5, 0).touches(10, 15));
        assert!(StepMap::new(8, 4, 0).touches(10, 15));
        assert!(!StepMap::identity().touches(0, 15));
    }

    #[test]
    fn mapping_composes_steps() {
        let mut mapping = Mapping::new();
        mapping.push(StepMap::new(2, 0, 4));
        mapping.push(StepMap::new(10, 2, 0));
        assert_eq!(mapping.map(1, Assoc::Right), 1);
        assert_eq!(mapping.map(3, Assoc::Right), 7);
        assert_eq!(mapping.map(20, Assoc::Right), 22);
        assert_eq!(mapping.len(), 2);
    }
}
