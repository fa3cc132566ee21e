//! Background error covariance estimation with the NMC method.
//!
//! `nmc` makes a single estimate from a reference trajectory and a
//! forecast model. `iterative` couples that estimate with a cycling
//! assimilation scheme, feeding each estimate back in as the next
//! background covariance and averaging the late iterations.
//!
//! Randomness is always an explicit `rand::Rng`; seed it for
//! reproducible estimates.

extern crate ndarray as nd;
extern crate na_core as nac;
extern crate rand;
extern crate rand_distr;
extern crate rayon;
#[macro_use]
extern crate tracing;

pub use nac::{Error, Result, Model, ModelStats, Scalar};
pub use assimilation::Assimilation;
pub use iterative::{iterative_estimate, iterative_estimate_with_history,
                    IterativeSetup, Refinement, REFINEMENT_WINDOW_STEPS};
pub use nmc::{estimate, NmcSetup};

pub mod assimilation;
pub mod iterative;
pub mod nmc;
