// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod event;
pub mod note;
pub mod task;

pub use event::Event;
pub use note::{Note, NoteUpdate};
pub use task::{Repeat, RepeatUnit, Task, TaskUpdate};
