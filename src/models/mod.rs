// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: boxes, the annotation store, selection, session and the
//! finance records shown on the dashboard.

pub mod annotation;
pub mod finance;
pub mod loan;
pub mod project;
pub mod selection;
pub mod session;
pub mod store;
pub mod submission;
