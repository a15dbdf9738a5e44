/// Declares a `u32`-backed index type with an invalid sentinel value.
///
/// `$name::invalid()` is `u32::MAX` and doubles as "no value assigned yet",
/// which is how the partitioner marks vertices that do not belong to any
/// part.
#[macro_export]
macro_rules! make_index {
    ($vis:vis $name:ident) => {
        #[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
        $vis struct $name(u32);

        impl $name {
            #[inline(always)]
            $vis fn new(x: usize) -> Self {
                debug_assert!(x < u32::MAX as usize);
                Self(x as u32)
            }

            #[inline(always)]
            $vis fn index(&self) -> usize { self.0 as usize }

            #[inline(always)]
            $vis fn invalid() -> Self { Self(u32::MAX) }

            #[inline(always)]
            $vis fn is_valid(&self) -> bool { self.0 < u32::MAX }
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl ::std::convert::From<usize> for $name {
            fn from(x: usize) -> Self {
                Self::new(x)
            }
        }

        impl ::std::convert::From<u32> for $name {
            fn from(x: u32) -> Self {
                Self(x)
            }
        }

        impl ::std::convert::From<$name> for usize {
            fn from(x: $name) -> Self {
                x.index()
            }
        }

        impl ::std::convert::From<$name> for u32 {
            fn from(x: $name) -> Self {
                x.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

#[cfg(test)]
mod test {
    make_index!(TestIndex);

    #[test]
    fn invalid_is_sentinel() {
        assert!(!TestIndex::invalid().is_valid());
        assert_eq!(TestIndex::default(), TestIndex::invalid());
        assert!(TestIndex::new(0).is_valid());
    }

    #[test]
    fn conversions() {
        let idx = TestIndex::new(42);
        assert_eq!(idx.index(), 42);
        assert_eq!(u32::from(idx), 42);
        assert_eq!(TestIndex::from(42_usize), idx);
    }
}
