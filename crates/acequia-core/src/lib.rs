//! Simulation clock, hourly allocation loop, and orchestration for the
//! Acequia simulation.
//!
//! Each simulated hour runs the allocation loop's seven ordered passes over
//! the water network (drought buffering, canal reset, crisis relief,
//! completion marking, targeted fill, overflow drain, endgame override) and
//! then advances the manager exactly once.
//!
//! # Modules
//!
//! - [`allocation`] -- The seven allocation passes and the [`DoneSet`].
//! - [`clock`] -- Hour counter and the terminal hour.
//! - [`config`] -- Configuration loading from `acequia-config.yaml`.
//! - [`manager`] -- The [`Manager`] trait the hour cycle is written against.
//! - [`runner`] -- The bounded loop: run hours until solved or out of time.
//! - [`tick`] -- [`SimulationState`] and the single-hour cycle.
//!
//! [`DoneSet`]: allocation::DoneSet
//! [`Manager`]: manager::Manager
//! [`SimulationState`]: tick::SimulationState

pub mod allocation;
pub mod clock;
pub mod config;
pub mod manager;
pub mod runner;
pub mod tick;
