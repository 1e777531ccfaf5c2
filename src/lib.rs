/*
 * @file lib.rs
 * @brief NEXA library root
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! NEXA - a console assistant that answers typed commands and speaks back.
//!
//! This library provides:
//! - a data-driven rule table mapping trigger phrases to moods and replies
//! - a total command interpreter with injected randomness and clock
//! - persistent reminders and alarms in a JSON agenda file
//! - text-to-speech through the OS `say` / `espeak` commands
//!
//! # Example
//! ```no_run
//! use anyhow::Result;
//! use nexa::{assistant, config};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     dotenv::dotenv().ok();
//!     let mut cfg = config::load_app_config(config::CONFIG_PATH.as_ref());
//!     cfg.apply_env();
//!     assistant::run_assistant(&cfg, None).await
//! }
//! ```

pub mod assistant;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod interpreter;
pub mod session;
pub mod speech;
pub mod store;
