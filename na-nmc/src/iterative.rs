//! Iterative NMC: alternate between assimilating with a background
//! covariance and re-estimating it from the resulting analysis.

use nd::prelude::*;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use nac::{Error, Result, Scalar};
use nac::utils::{ensure_shape, from_count};

use crate::assimilation::Assimilation;
use crate::nmc::NmcSetup;

/// Each refinement estimates with `t1 = REFINEMENT_WINDOW_STEPS * dt`.
/// Not configurable.
pub const REFINEMENT_WINDOW_STEPS: usize = 10;

#[derive(Copy, Clone, Debug)]
pub struct IterativeSetup<E> {
  pub n_iterations: usize,
  /// Iterations `i` with `i / n_iterations > mean_ratio` are averaged
  /// into the result. Must lie in (0, 1].
  pub mean_ratio: E,
}
impl<E> Default for IterativeSetup<E>
  where E: Scalar,
{
  fn default() -> Self {
    IterativeSetup {
      n_iterations: 50,
      mean_ratio: E::one() / (E::one() + E::one()),
    }
  }
}
impl<E> IterativeSetup<E>
  where E: Scalar,
{
  pub fn validate(&self) -> Result<()> {
    if self.n_iterations == 0 {
      return Err(Error::invalid("n_iterations", "at least one iteration is needed"));
    }
    let r = self.mean_ratio;
    if !(r > E::zero() && r <= E::one()) {
      return Err(Error::invalid("mean_ratio", format!("{} is outside of (0, 1]", r)));
    }

    Ok(())
  }

  pub fn is_averaged(&self, iteration: usize) -> bool {
    from_count::<E>(iteration) / from_count::<E>(self.n_iterations) > self.mean_ratio
  }
}

#[derive(Clone, Debug)]
pub struct Refinement<E> {
  /// Mean of the averaged iterations.
  pub covariance: Array2<E>,
  /// The estimate made by every iteration, in order.
  pub iterations: Vec<Array2<E>>,
  /// How many trailing iterations went into `covariance`.
  pub averaged: usize,
}

/// Refine a background covariance against `assim`, starting from
/// `pb_initial` or, without one, from `r`.
pub fn iterative_estimate<E, A, R>(assim: &mut A,
                                   r: ArrayView2<E>,
                                   pb_initial: Option<ArrayView2<E>>,
                                   setup: &IterativeSetup<E>,
                                   rand: &mut R) -> Result<Array2<E>>
  where E: Scalar,
        A: Assimilation<E>,
        R: Rng + ?Sized,
        StandardNormal: Distribution<E>,
{
  let (covariance, _) = refine(assim, r, pb_initial, setup, rand, |_, _| {})?;
  Ok(covariance)
}

/// `iterative_estimate`, keeping every iteration's estimate.
pub fn iterative_estimate_with_history<E, A, R>(assim: &mut A,
                                                r: ArrayView2<E>,
                                                pb_initial: Option<ArrayView2<E>>,
                                                setup: &IterativeSetup<E>,
                                                rand: &mut R)
  -> Result<Refinement<E>>
  where E: Scalar,
        A: Assimilation<E>,
        R: Rng + ?Sized,
        StandardNormal: Distribution<E>,
{
  let mut iterations = Vec::new();
  let (covariance, averaged) = refine(assim, r, pb_initial, setup, rand, |_, pb| {
    iterations.push(pb.clone());
  })?;

  Ok(Refinement {
    covariance: covariance,
    iterations: iterations,
    averaged: averaged,
  })
}

fn refine<E, A, R, F>(assim: &mut A,
                      r: ArrayView2<E>,
                      pb_initial: Option<ArrayView2<E>>,
                      setup: &IterativeSetup<E>,
                      rand: &mut R,
                      mut on_iteration: F) -> Result<(Array2<E>, usize)>
  where E: Scalar,
        A: Assimilation<E>,
        R: Rng + ?Sized,
        StandardNormal: Distribution<E>,
        F: FnMut(usize, &Array2<E>),
{
  setup.validate()?;

  let n = r.dim().0;
  if n == 0 {
    return Err(Error::invalid("r", "observation covariance is empty"));
  }
  ensure_shape("observation covariance", &r, (n, n))?;
  let pb_initial = match pb_initial {
    Some(pb) => pb.to_owned(),
    None => r.to_owned(),
  };
  ensure_shape("initial background covariance", &pb_initial, (n, n))?;

  let dt = assim.dt();
  let estimator = NmcSetup::new(dt, dt * from_count::<E>(REFINEMENT_WINDOW_STEPS));
  estimator.t1_nstep()?;

  let mut pb = pb_initial;
  let mut accumulated: Array2<E> = Array2::zeros((n, n));
  let mut count = 0usize;
  for i in 0..setup.n_iterations {
    assim.set_background_covariance(pb.view())?;
    assim.cycle()?;

    pb = estimator.estimate(assim.model(), assim.analysis(), rand)?;
    ensure_shape("estimated background covariance", &pb, (n, n))?;

    let averaged = setup.is_averaged(i);
    trace!(iteration = i, averaged, "refined background covariance");
    if averaged {
      accumulated.scaled_add(E::one(), &pb);
      count += 1;
    }
    on_iteration(i, &pb);
  }

  if count == 0 {
    return Err(Error::InsufficientIterations {
      n_iterations: setup.n_iterations,
      mean_ratio: setup.mean_ratio.to_f64().unwrap_or(::std::f64::NAN),
    });
  }

  debug!(n_iterations = setup.n_iterations, averaged = count,
         "iterative nmc finished");

  let count_e = from_count::<E>(count);
  Ok((accumulated.mapv_into(|v| v / count_e ), count))
}
