// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for spam flood simulation.
//!
//! This module provides a recording relay, message generators and flood
//! patterns for driving the guard the way a chat gateway would.

pub mod floods;
pub mod generators;
pub mod metrics;
pub mod relay;
