// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod ai;
pub mod messenger;
pub mod scheduler;

pub use ai::{AiService, BoardAction, ChatMessage, ChatOutcome};
pub use messenger::MessengerService;
pub use scheduler::Scheduler;
