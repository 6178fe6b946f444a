// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the PDF box annotator.

pub mod auth;
pub mod canvas;
pub mod dashboard;
pub mod loan;
pub mod properties;
pub mod toolbar;
