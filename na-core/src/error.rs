
use std::borrow::Cow;
use std::error::Error as StdError;

pub type Result<T> = ::std::result::Result<T, Error>;

pub type BoxedError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// A scalar or matrix argument is outside of its domain. Raised
  /// before any model call is made.
  #[error("invalid parameter `{name}`: {reason}")]
  InvalidParameter {
    name: &'static str,
    reason: Cow<'static, str>,
  },
  /// The reference trajectory can't produce two forecast segments,
  /// ie a single lag pair, for the requested window.
  #[error("reference of {nt} steps holds {segments} forecast segment(s) \
           of {t1_nstep} steps; at least 2 are needed")]
  InsufficientData {
    nt: usize,
    t1_nstep: usize,
    segments: usize,
  },
  #[error("no iteration out of {n_iterations} lies past mean ratio {mean_ratio}")]
  InsufficientIterations {
    n_iterations: usize,
    mean_ratio: f64,
  },
  #[error("non-finite value in {context}")]
  NumericalDegeneracy {
    context: Cow<'static, str>,
  },
  #[error("{what} has shape {actual:?}, expected {expected:?}")]
  ShapeMismatch {
    what: &'static str,
    expected: (usize, usize),
    actual: (usize, usize),
  },

  #[error("model integration failed")]
  Model(#[source] BoxedError),
  #[error("assimilation cycle failed")]
  Assimilation(#[source] BoxedError),
}

impl Error {
  pub fn invalid<R>(name: &'static str, reason: R) -> Error
    where R: Into<Cow<'static, str>>,
  {
    Error::InvalidParameter {
      name: name,
      reason: reason.into(),
    }
  }
  pub fn degenerate<C>(context: C) -> Error
    where C: Into<Cow<'static, str>>,
  {
    Error::NumericalDegeneracy {
      context: context.into(),
    }
  }

  pub fn model<E>(e: E) -> Error
    where E: Into<BoxedError>,
  {
    Error::Model(e.into())
  }
  pub fn assimilation<E>(e: E) -> Error
    where E: Into<BoxedError>,
  {
    Error::Assimilation(e.into())
  }
}
