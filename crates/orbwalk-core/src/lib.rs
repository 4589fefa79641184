//! Action arbitration for the Orbwalk decision core.
//!
//! This crate decides, tick by tick, whether an attack or movement order
//! may be issued for the controlled avatar, shapes movement orders, and
//! runs every order through a veto/override pipeline before it reaches the
//! host's order channel.
//!
//! # Modules
//!
//! - [`clock`] -- [`Clock`] trait and the manually advanced
//!   [`SessionClock`].
//! - [`config`] -- Configuration loading from `orbwalk-config.yaml` into
//!   strongly-typed structs.
//! - [`gate`] -- [`ActionGate`]: attack/move readiness and order lockout.
//! - [`windup`] -- Per-identity windup adjustments.
//! - [`pipeline`] -- [`CancellationPipeline`] of intent listeners.
//! - [`planner`] -- [`MovementPlanner`]: hold radius, extension, clamping,
//!   randomization, path-deviation suppression and throttling.
//! - [`mode`] -- Operating mode resolution from toggle events.
//! - [`host`] -- Traits for the host-owned collaborators.
//! - [`orchestrator`] -- [`Orchestrator`], the entry point for the host loop.
//!
//! [`Clock`]: clock::Clock
//! [`SessionClock`]: clock::SessionClock
//! [`ActionGate`]: gate::ActionGate
//! [`CancellationPipeline`]: pipeline::CancellationPipeline
//! [`MovementPlanner`]: planner::MovementPlanner
//! [`Orchestrator`]: orchestrator::Orchestrator

pub mod clock;
pub mod config;
pub mod gate;
pub mod host;
pub mod mode;
pub mod orchestrator;
pub mod pipeline;
pub mod planner;
pub mod windup;
