use core::fmt;

/// Integer marker attached to boundary facets (inlet, wall, slot, ...).
///
/// Tags are the only link between a mesh's boundary and the boundary data
/// held by a discretization, so they stay plain and copyable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoundaryTag(pub u32);

impl BoundaryTag {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for BoundaryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.0)
    }
}

impl fmt::Display for BoundaryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_round_trip_value() {
        for v in [0_u32, 1, 6, 42] {
            assert_eq!(BoundaryTag::new(v).value(), v);
        }
    }

    #[test]
    fn tags_order_by_value() {
        let mut tags = vec![BoundaryTag(5), BoundaryTag(1), BoundaryTag(4)];
        tags.sort();
        assert_eq!(tags, vec![BoundaryTag(1), BoundaryTag(4), BoundaryTag(5)]);
        assert_eq!(format!("{:?}", tags[0]), "Tag(1)");
    }
}
