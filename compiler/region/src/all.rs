use std::fmt;

/// A span of source text, as line/column pairs. The solver never looks
/// inside one of these; it only threads them from incoming constraints into
/// the problems it reports.
#[derive(Copy, Clone, Default, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct Region {
    pub start_line: u32,
    pub end_line: u32,
    pub start_col: u16,
    pub end_col: u16,
}

// One of these rides inside every Located value, so its size is pinned.
tern_error_macros::assert_sizeof_all!(Region, 12);

impl Region {
    /// The "don't care" region. Constraints assembled by hand (tests,
    /// synthesized kernel lookups) use this instead of inventing positions.
    pub fn zero() -> Self {
        Region::default()
    }

    fn is_zero(&self) -> bool {
        *self == Region::default()
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_zero() {
            // coordinates of the don't-care region are pure noise in a
            // failed assertion, so collapse them
            write!(f, "@zero")
        } else {
            write!(
                f,
                "@{}.{}-{}.{}",
                self.start_line, self.start_col, self.end_line, self.end_col,
            )
        }
    }
}

/// A value tagged with the region it came from.
#[derive(Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct Located<T> {
    pub region: Region,
    pub value: T,
}

impl<T> Located<T> {
    pub fn at(region: Region, value: T) -> Located<T> {
        Located { region, value }
    }

    pub fn at_zero(value: T) -> Located<T> {
        Located::at(Region::zero(), value)
    }
}

impl<T> fmt::Debug for Located<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.region.is_zero() {
            self.value.fmt(f)
        } else {
            write!(f, "{:?} {:?}", self.region, self.value)
        }
    }
}
