use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A dense, zero-based handle into one of the timetable's object arrays.
pub trait Idx: Copy + Eq {
    fn from_usize(idx: usize) -> Self;
    fn index(self) -> usize;
}

macro_rules! typed_idx {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(idx: u32) -> Self {
                Self(idx)
            }

            pub const fn val(self) -> u32 {
                self.0
            }
        }

        impl Idx for $name {
            #[inline]
            fn from_usize(idx: usize) -> Self {
                debug_assert!(idx <= u32::MAX as usize, "{} overflow: {idx}", stringify!($name));
                Self(idx as u32)
            }

            #[inline]
            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_idx!(
    /// Index of a stop point.
    SpIdx
);
typed_idx!(
    /// Index of a journey pattern.
    JpIdx
);
typed_idx!(
    /// Index of a journey pattern point, i.e. one (pattern, position) pair.
    JppIdx
);
typed_idx!(
    /// Index of a vehicle journey (trip).
    VjIdx
);

/// A `Vec` that can only be indexed by its own key type.
///
/// Replaces hash maps on the query path: every key space is dense and fixed
/// once the timetable is built, so lookups are plain array accesses.
pub struct IdxMap<I, V> {
    values: Vec<V>,
    _key: PhantomData<fn(I) -> I>,
}

impl<I: Idx, V> IdxMap<I, V> {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn from_vec(values: Vec<V>) -> Self {
        Self { values, _key: PhantomData }
    }

    pub fn with_len(len: usize, value: V) -> Self
    where
        V: Clone,
    {
        Self::from_vec(vec![value; len])
    }

    /// Pushes a value and returns the key it was assigned.
    pub fn push(&mut self, value: V) -> I {
        let idx = I::from_usize(self.values.len());
        self.values.push(value);
        idx
    }

    pub fn get(&self, idx: I) -> Option<&V> {
        self.values.get(idx.index())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = I> + '_ {
        (0..self.values.len()).map(I::from_usize)
    }

    pub fn values(&self) -> std::slice::Iter<'_, V> {
        self.values.iter()
    }

    pub fn values_mut(&mut self) -> std::slice::IterMut<'_, V> {
        self.values.iter_mut()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (I, &V)> + '_ {
        self.values.iter().enumerate().map(|(i, v)| (I::from_usize(i), v))
    }

    pub fn as_slice(&self) -> &[V] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [V] {
        &mut self.values
    }
}

impl<I: Idx, V> Default for IdxMap<I, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, V: Clone> Clone for IdxMap<I, V> {
    fn clone(&self) -> Self {
        Self { values: self.values.clone(), _key: PhantomData }
    }
}

impl<I, V: PartialEq> PartialEq for IdxMap<I, V> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<I, V: Eq> Eq for IdxMap<I, V> {}

impl<I, V: fmt::Debug> fmt::Debug for IdxMap<I, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

impl<I: Idx, V> Index<I> for IdxMap<I, V> {
    type Output = V;

    #[inline]
    fn index(&self, idx: I) -> &V {
        &self.values[idx.index()]
    }
}

impl<I: Idx, V> IndexMut<I> for IdxMap<I, V> {
    #[inline]
    fn index_mut(&mut self, idx: I) -> &mut V {
        &mut self.values[idx.index()]
    }
}

impl<I: Idx, V> FromIterator<V> for IdxMap<I, V> {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}
