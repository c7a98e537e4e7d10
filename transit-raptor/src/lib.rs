//! Range-Raptor transit routing core.
//!
//! Answers: "which Pareto-optimal journeys take me from these access stops
//! to these egress stops within this departure window?" The transit model
//! lives in [`domain`], a JSON-loadable network in [`network`], and the
//! search itself in [`rangeraptor`].

pub mod domain;
pub mod network;
pub mod rangeraptor;
