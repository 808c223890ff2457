//! subdesk: configuration model and synchronization engine for
//! subscription admin consoles.
//!
//! The crate keeps a typed, client-side mirror of a server's subscription
//! configuration — per-group content subscriptions, the credential
//! cookies those subscriptions need, and per-target scheduling weights —
//! and keeps that mirror consistent after every write through a tag-based
//! query/mutation cache:
//!
//! - [`registry`] — load-once capability registry of platforms and sites
//! - [`domain`] — the entity model and its capability predicates
//! - [`validate`] — capability-aware validators, including the
//!   round-trip target resolver
//! - [`cache`] — the refetch-after-write query/mutation engine
//! - [`session`] + [`infra`] — session guard and bearer transport
//!
//! [`client::SubdeskClient`] wires the parts together for consumers; the
//! `subdesk-cli` binary is a thin operator surface over it.

pub mod cache;
pub mod client;
pub mod config;
pub mod domain;
pub mod infra;
pub mod registry;
pub mod session;
pub mod validate;

pub(crate) mod util;

pub use client::SubdeskClient;
