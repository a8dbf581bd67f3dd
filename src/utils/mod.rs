use num_traits::{Float, FromPrimitive, ToPrimitive};
use std::fmt::Debug;

/// Floating point element types accepted for embeddings handed to the built-in clustering
/// and variance helpers.
pub trait FloatOps: Float + FromPrimitive + ToPrimitive + Send + Sync + Debug + 'static {}

impl FloatOps for f32 {}
impl FloatOps for f64 {}

#[cfg(feature = "clustering")]
pub trait ZeroVec {
    fn zero_len(&mut self, len: usize);
}

#[cfg(feature = "clustering")]
impl<T: Default + Clone> ZeroVec for Vec<T> {
    fn zero_len(&mut self, len: usize) {
        self.clear();
        self.reserve(len);
        self.extend(std::iter::repeat_n(T::default(), len));
    }
}

#[cfg(all(test, feature = "clustering"))]
mod tests {
    use super::*;

    #[test]
    fn test_zero_len_resets_contents() {
        let mut v = vec![3.0, 4.0];
        v.zero_len(4);
        assert_eq!(v, vec![0.0; 4]);

        v.zero_len(1);
        assert_eq!(v, vec![0.0]);
    }
}
