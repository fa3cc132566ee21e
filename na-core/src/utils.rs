
use nd::{ArrayBase, Array, Array1, Array2, ArrayView, Axis, Data, Dimension,
         Ix1, Ix2};
use num_traits::{Float, NumCast};

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use std::borrow::Cow;
use std::ops::Index;

use crate::{Error, Result, Scalar};

#[derive(Debug)]
pub enum Diagonal<'a, E>
  where E: 'a,
{
  Single(E),
  Multiple(ArrayView<'a, E, Ix1>)
}
impl<'a, E> Index<usize> for Diagonal<'a, E> {
  type Output = E;
  fn index(&self, idx: usize) -> &E {
    match self {
      &Diagonal::Single(ref e) => e,
      &Diagonal::Multiple(ref v) => &v[idx],
    }
  }
}
impl<'a, E> From<E> for Diagonal<'a, E> {
  fn from(v: E) -> Diagonal<'a, E> {
    Diagonal::Single(v)
  }
}
impl<'a, E> From<ArrayView<'a, E, Ix1>> for Diagonal<'a, E> {
  fn from(v: ArrayView<'a, E, Ix1>) -> Self {
    Diagonal::Multiple(v)
  }
}

/// Standard normal draws, row `i` scaled by `d[i]`. Draws are taken in
/// row major order.
pub fn make_2d_randn<E, R>(dim: (usize, usize),
                           d: Diagonal<E>,
                           rand: &mut R) -> Array2<E>
  where E: Scalar,
        R: Rng + ?Sized,
        StandardNormal: Distribution<E>,
{
  let mut r: Array2<E> = ArrayBase::zeros(dim);
  for i in 0..dim.0 {
    for j in 0..dim.1 {
      let v: E = StandardNormal.sample(rand);
      r[[i, j]] = v * d[i];
    }
  }

  r
}

/// `d` as an `n x 1` column (`t == false`) or `1 x n` row view.
pub fn extend_dim_ref<D>(d: &ArrayBase<D, Ix1>, t: bool)
  -> ArrayView<D::Elem, Ix2>
  where D: Data,
{
  let axis = if !t { Axis(1) } else { Axis(0) };
  d.view().insert_axis(axis)
}

pub fn from_count<E>(n: usize) -> E
  where E: Scalar,
{
  NumCast::from(n).unwrap_or_else(E::nan)
}

/// `n` evenly spaced points starting at zero. Built by index so the
/// length never depends on round-off.
pub fn time_grid<E>(n: usize, dt: E) -> Array1<E>
  where E: Scalar,
{
  Array::from_iter((0..n).map(|k| from_count::<E>(k) * dt ))
}

/// `floor(x)`, except values within `1e-9` (relative) of an integer
/// round to it, so `0.3 / 0.1` counts as 3 steps.
pub fn tolerant_floor<E>(x: E) -> Option<usize>
  where E: Scalar,
{
  if !x.is_finite() || x < E::zero() {
    return None;
  }

  let nearest = x.round();
  let tol: E = NumCast::from(1.0e-9)?;
  let f = if (x - nearest).abs() <= tol * nearest.max(E::one()) {
    nearest
  } else {
    x.floor()
  };
  NumCast::from(f)
}

pub fn ensure_finite<S, D, C>(a: &ArrayBase<S, D>, context: C) -> Result<()>
  where S: Data,
        S::Elem: Float,
        D: Dimension,
        C: FnOnce() -> Cow<'static, str>,
{
  if a.iter().all(|v| v.is_finite()) {
    Ok(())
  } else {
    Err(Error::degenerate(context()))
  }
}

pub fn ensure_shape<S>(what: &'static str,
                       a: &ArrayBase<S, Ix2>,
                       expected: (usize, usize)) -> Result<()>
  where S: Data,
{
  if a.dim() != expected {
    return Err(Error::ShapeMismatch {
      what: what,
      expected: expected,
      actual: a.dim(),
    });
  }
  Ok(())
}

pub fn is_symmetric<S>(a: &ArrayBase<S, Ix2>, tol: S::Elem) -> bool
  where S: Data,
        S::Elem: PartialEqWithinTol<S::Elem, S::Elem> + Copy,
{
  a.is_square() &&
    a.indexed_iter()
    .all(|((i, j), v)| v.partial_eq_within_tol(&a[[j, i]], tol) )
}

pub trait PartialEqWithinTol<Rhs, Tol> {
  const STD_TOL: Tol;
  fn partial_eq_within_tol(&self, rhs: &Rhs, tol: Tol) -> bool;

  fn partial_eq_within_std_tol(&self, rhs: &Rhs) -> bool {
    self.partial_eq_within_tol(rhs, Self::STD_TOL)
  }
}

impl PartialEqWithinTol<f64, f64> for f64 {
  const STD_TOL: Self = ::std::f64::EPSILON;
  fn partial_eq_within_tol(&self, rhs: &f64, tol: f64) -> bool {
    (self - rhs).abs() <= tol
  }
}
impl PartialEqWithinTol<f32, f32> for f32 {
  const STD_TOL: Self = ::std::f32::EPSILON;
  fn partial_eq_within_tol(&self, rhs: &f32, tol: f32) -> bool {
    (self - rhs).abs() <= tol
  }
}
impl<S1, S2, D, T> PartialEqWithinTol<ArrayBase<S2, D>, T> for ArrayBase<S1, D>
  where S1: Data<Elem = T>,
        S2: Data<Elem = T>,
        D: Dimension,
        T: PartialEqWithinTol<T, T> + Copy,
{
  const STD_TOL: T = T::STD_TOL;
  fn partial_eq_within_tol(&self, rhs: &ArrayBase<S2, D>, tol: T) -> bool {
    self.shape() == rhs.shape() &&
      self.iter()
      .zip(rhs.iter())
      .all(|(l, r)| l.partial_eq_within_tol(r, tol) )
  }
}
