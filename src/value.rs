use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// The identity of a class of allocations tracked by the [`crate::LeakAnalyzer`].
///
/// Values must be cheap to clone and totally ordered; the ordering is only used to iterate in a deterministic way.
pub trait ValueType: Clone + Ord + Hash + fmt::Debug + fmt::Display {
    /// A human readable name for the kind of value, such as `size`.
    fn type_name(&self) -> &'static str;
}

/// An allocation size class.
///
/// Allocations are bucketed by the next power of two of their size, so a [`SizeClass`] is displayed as its
/// upper bound in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SizeClass(u32);

impl SizeClass {
    /// The amount of size classes; one for each bit of a `usize`, plus one for sizes `<= 1`.
    pub const COUNT: usize = usize::BITS as usize + 1;

    /// Gets the [`SizeClass`] for an allocation of `bytes`.
    pub const fn of(bytes: usize) -> Self {
        if bytes <= 1 {
            Self(0)
        } else {
            Self(usize::BITS - (bytes - 1).leading_zeros())
        }
    }

    /// Gets the [`SizeClass`] at `index`, if any.
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index as u32))
        } else {
            None
        }
    }

    /// Position of this class among all the classes.
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// The largest allocation size, in bytes, belonging to this class.
    pub const fn bytes(&self) -> u128 {
        1u128 << self.0
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.bytes(), f)
    }
}

impl ValueType for SizeClass {
    fn type_name(&self) -> &'static str {
        "size"
    }
}

/// A call site, identified by the name of the function which created the instances (e.g. `my_crate::cache::insert`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallSite(Arc<str>);

impl CallSite {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CallSite {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad the name, so report columns line up
        f.pad(&self.0)
    }
}

impl ValueType for CallSite {
    fn type_name(&self) -> &'static str {
        "call site"
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_should_bucket_sizes() {
        assert_eq!(SizeClass::of(0).bytes(), 1);
        assert_eq!(SizeClass::of(1).bytes(), 1);
        assert_eq!(SizeClass::of(2).bytes(), 2);
        assert_eq!(SizeClass::of(3).bytes(), 4);
        assert_eq!(SizeClass::of(64).bytes(), 64);
        assert_eq!(SizeClass::of(65).bytes(), 128);
        assert_eq!(SizeClass::of(usize::MAX).index(), SizeClass::COUNT - 1);
    }

    #[test]
    fn test_should_get_size_class_from_index() {
        assert_eq!(SizeClass::from_index(4), Some(SizeClass::of(16)));
        assert!(SizeClass::from_index(SizeClass::COUNT).is_none());
    }

    #[test]
    fn test_should_display_values() {
        assert_eq!(SizeClass::of(100).to_string(), "128");
        assert_eq!(format!("{:>6}", SizeClass::of(100)), "   128");
        assert_eq!(format!("{:>6}", CallSite::new("foo")), "   foo");
        assert_eq!(CallSite::new("foo").type_name(), "call site");
    }
}
