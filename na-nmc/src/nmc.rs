//! Single pass NMC estimate of the background error covariance.
//!
//! Forecasts are started from perturbed reference states every `t1` and
//! run for `2 t1`. The forecast started at `T` and the one started at
//! `T + t1` both cover `T + 2 t1`, with lead times `2 t1` and `t1`; their
//! difference there is one sample of the background error.

use nd::prelude::*;
use nd::s;
use nd::linalg::general_mat_mul;
use nd::parallel::prelude::*;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use nac::{Error, Model, Result, Scalar};
use nac::utils::{Diagonal, make_2d_randn, extend_dim_ref, from_count,
                 time_grid, tolerant_floor, ensure_finite, ensure_shape};

#[derive(Copy, Clone, Debug)]
pub struct NmcSetup<E> {
  /// Model integration step.
  pub dt: E,
  /// Half the forecast length; the short lead time.
  pub t1: E,
  /// Inflation applied to the final matrix.
  pub alpha: E,
}

impl<E> NmcSetup<E>
  where E: Scalar,
{
  pub fn new(dt: E, t1: E) -> NmcSetup<E> {
    NmcSetup {
      dt: dt,
      t1: t1,
      alpha: E::one(),
    }
  }
  pub fn alpha(mut self, alpha: E) -> NmcSetup<E> {
    self.alpha = alpha;
    self
  }

  /// Number of `dt` steps in `t1`. Validates every parameter.
  pub fn t1_nstep(&self) -> Result<usize> {
    positive("dt", self.dt)?;
    positive("t1", self.t1)?;
    positive("alpha", self.alpha)?;

    match tolerant_floor(self.t1 / self.dt) {
      Some(0) => {
        Err(Error::invalid("t1", format!("window {} is shorter than one step of {}",
                                         self.t1, self.dt)))
      },
      Some(n) => Ok(n),
      None => {
        Err(Error::invalid("t1", format!("window {} can't be divided into steps of {}",
                                         self.t1, self.dt)))
      },
    }
  }

  /// Number of forecast segments a reference of `nt` steps yields, ie
  /// `floor(nt / t1_nstep) - 1`. Fewer than two is an error.
  pub fn segments(&self, nt: usize) -> Result<usize> {
    let t1_nstep = self.t1_nstep()?;
    let num = (nt / t1_nstep).saturating_sub(1);
    if num < 2 {
      return Err(Error::InsufficientData {
        nt: nt,
        t1_nstep: t1_nstep,
        segments: num,
      });
    }

    Ok(num)
  }

  pub fn estimate<M, R>(&self, model: &M,
                        reference: ArrayView2<E>,
                        rand: &mut R) -> Result<Array2<E>>
    where M: Model<E> + ?Sized,
          R: Rng + ?Sized,
          StandardNormal: Distribution<E>,
  {
    let t1_nstep = self.t1_nstep()?;
    let (ndim, nt) = reference.dim();
    if ndim == 0 {
      return Err(Error::invalid("reference", "trajectory has no state dimensions"));
    }
    let num = self.segments(nt)?;
    ensure_finite(&reference, || "reference trajectory".into())?;

    debug!(ndim, nt, t1_nstep, segments = num, "nmc estimate");

    // forecast i starts from column i * t1_nstep.
    let starts = reference.slice(s![.., ..num * t1_nstep;t1_nstep]);
    let scale = starts.sum_axis(Axis(0)) / from_count::<E>(ndim);
    let noise = make_2d_randn((num, ndim), Diagonal::Multiple(scale.view()), rand);
    let initial = &starts.t() + &noise;

    let times = time_grid(2 * t1_nstep, self.dt);
    let forecasts: Vec<Array2<E>> = initial
      .axis_iter(Axis(0))
      .into_par_iter()
      .map(|x0| model.forecast(x0, times.view()) )
      .collect::<Result<_>>()?;

    for (i, forecast) in forecasts.iter().enumerate() {
      ensure_shape("forecast segment", forecast, (ndim, 2 * t1_nstep))?;
      ensure_finite(forecast, || format!("forecast segment {}", i).into())?;
    }

    let short = t1_nstep - 1;
    let long = 2 * t1_nstep - 1;

    let mut pb: Array2<E> = Array2::zeros((ndim, ndim));
    for (early, late) in forecasts.iter().zip(forecasts.iter().skip(1)) {
      let d = &early.column(long) - &late.column(short);
      general_mat_mul(E::one(),
                      &extend_dim_ref(&d, false),
                      &extend_dim_ref(&d, true),
                      E::one(),
                      &mut pb);
    }

    let pairs = from_count::<E>(num - 1);
    let alpha = self.alpha;
    Ok(pb.mapv_into(|v| alpha * v / pairs ))
  }
}

/// `alpha * sum(d d^T) / (num - 1)` over the lag pairs of `reference`.
/// See `NmcSetup`.
pub fn estimate<E, M, R>(model: &M,
                         reference: ArrayView2<E>,
                         dt: E, t1: E, alpha: E,
                         rand: &mut R) -> Result<Array2<E>>
  where E: Scalar,
        M: Model<E> + ?Sized,
        R: Rng + ?Sized,
        StandardNormal: Distribution<E>,
{
  NmcSetup::new(dt, t1)
    .alpha(alpha)
    .estimate(model, reference, rand)
}

fn positive<E>(name: &'static str, v: E) -> Result<()>
  where E: Scalar,
{
  if v.is_finite() && v > E::zero() {
    Ok(())
  } else {
    Err(Error::invalid(name, format!("expected a finite positive value, got {}", v)))
  }
}
