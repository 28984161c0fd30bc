// SPDX-License-Identifier: MIT
//
// pres-term — terminal layer for pres.
//
// Raw mode and alternate screen with RAII cleanup, a byte-level key
// parser for the handful of keys a viewer/editor needs, a cell frame
// that paint code draws into, a row-diffing renderer, and a synchronous
// event loop that runs exactly one handle → paint cycle per key.
//
// Like the editor it serves, this crate talks to the terminal directly
// through termios and ANSI escape sequences. No TUI framework sits in
// between.

pub mod ansi;
pub mod color;
pub mod event_loop;
pub mod frame;
pub mod input;
pub mod reader;
pub mod renderer;
pub mod terminal;
