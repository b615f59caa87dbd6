// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Handoff integration tests.
//!
//! Provides an in-memory store for fast, deterministic, CI-runnable tests
//! without touching disk.
//!
//! # Components
//!
//! - [`MemStore`] - In-memory `ConversationStore` with a virtual clock and
//!   failure-injection knobs

pub mod mem_store;

pub use mem_store::MemStore;
