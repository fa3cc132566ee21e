
use nd::prelude::*;

use nac::{Model, Result};

/// A cycling assimilation scheme (OI, EnKF, ...) that takes a background
/// error covariance and produces an analysis trajectory.
///
/// Everything except the background covariance is configured by the
/// owner before the scheme is handed to the refiner.
pub trait Assimilation<E> {
  type Model: Model<E>;

  /// Replace the background error covariance used by the next `cycle`,
  /// leaving other parameters as they are.
  fn set_background_covariance(&mut self, pb: ArrayView2<E>) -> Result<()>;
  /// Run one full assimilation cycle over the observation window.
  fn cycle(&mut self) -> Result<()>;
  /// The `(ndim, nt)` analysis trajectory of the most recent `cycle`.
  fn analysis(&self) -> ArrayView2<E>;

  fn model(&self) -> &Self::Model;
  fn dt(&self) -> E;
}
