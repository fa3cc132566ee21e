extern crate ndarray as nd;
extern crate num_traits;
extern crate rand;
extern crate rand_distr;
extern crate thiserror;

use nd::prelude::*;
use nd::{LinalgScalar, ScalarOperand};

use num_traits::Float;

use std::fmt::{Debug, Display};
use std::sync::atomic::{AtomicU64, Ordering};

pub use error::{Result, Error, BoxedError};

pub mod error;
pub mod utils;

/// Element type of states, trajectories and covariances.
pub trait Scalar: Float + LinalgScalar + ScalarOperand + Debug + Display + Send + Sync { }
impl<T> Scalar for T
  where T: Float + LinalgScalar + ScalarOperand + Debug + Display + Send + Sync,
{ }

/// A deterministic forecast model.
///
/// `forecast` integrates `initial` over `times` (increasing, starting at
/// 0) and returns the trajectory with shape `(initial.len(), times.len())`;
/// column `k` is the state at `times[k]`, so column 0 is `initial` itself.
/// Identical inputs must give identical outputs; any randomness belongs to
/// the caller.
pub trait Model<E>: Send + Sync {
  fn forecast(&self, initial: ArrayView1<E>,
              times: ArrayView1<E>) -> Result<Array2<E>>;
}

impl<E, F> Model<E> for F
  where F: for<'a, 'b> Fn(ArrayView1<'a, E>, ArrayView1<'b, E>) -> Result<Array2<E>>,
        F: Send + Sync,
{
  fn forecast(&self, initial: ArrayView1<E>,
              times: ArrayView1<E>) -> Result<Array2<E>> {
    (self)(initial, times)
  }
}

/// Counts forecasts made through the wrapped model. Forecasts may run
/// concurrently, hence the atomic.
#[derive(Debug)]
pub struct ModelStats<M> {
  pub model: M,
  calls: AtomicU64,
}
impl<M> ModelStats<M> {
  pub fn calls(&self) -> u64 { self.calls.load(Ordering::Relaxed) }
}
impl<M> From<M> for ModelStats<M> {
  fn from(v: M) -> ModelStats<M> {
    ModelStats {
      model: v,
      calls: AtomicU64::new(0),
    }
  }
}
impl<E, M> Model<E> for ModelStats<M>
  where M: Model<E>,
{
  fn forecast(&self, initial: ArrayView1<E>,
              times: ArrayView1<E>) -> Result<Array2<E>> {
    self.calls.fetch_add(1, Ordering::Relaxed);
    self.model.forecast(initial, times)
  }
}
