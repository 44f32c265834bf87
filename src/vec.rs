//! Fallible allocation of working buffers.
//!
//! Algorithms acquire every buffer through these helpers so that an
//! allocation failure surfaces as [`Error::OutOfMemory`] before the input
//! partition is touched.

use crate::Error;

pub trait VecExt<T>: Sized {
    /// Fallible equivalent of [`Vec::with_capacity`].
    fn try_with_capacity(capacity: usize) -> Result<Self, Error>;

    /// Fallible equivalent of [`vec!`].
    fn try_filled(value: T, len: usize) -> Result<Self, Error>
    where
        T: Clone;
}

impl<T> VecExt<T> for Vec<T> {
    fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        let mut v = Vec::new();
        v.try_reserve(capacity)?;
        Ok(v)
    }

    fn try_filled(value: T, len: usize) -> Result<Self, Error>
    where
        T: Clone,
    {
        let mut v = Vec::new();
        v.try_reserve_exact(len)?;
        v.resize(len, value);
        Ok(v)
    }
}

pub trait SliceExt<T> {
    /// Fallible equivalent of [`slice::to_vec`].
    fn try_to_vec(&self) -> Result<Vec<T>, Error>
    where
        T: Clone;
}

impl<T> SliceExt<T> for [T] {
    fn try_to_vec(&self) -> Result<Vec<T>, Error>
    where
        T: Clone,
    {
        let mut v = Vec::new();
        v.try_reserve_exact(self.len())?;
        v.extend_from_slice(self);
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_and_copied() {
        let v = Vec::try_filled(7_u8, 4).unwrap();
        assert_eq!(v, [7, 7, 7, 7]);
        let w = v.as_slice().try_to_vec().unwrap();
        assert_eq!(v, w);
    }

    #[test]
    fn huge_reservation_is_an_error() {
        let res = Vec::<u64>::try_with_capacity(usize::MAX);
        assert!(matches!(res, Err(Error::OutOfMemory)));
    }
}
