// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O: backend requests, PDF loading, export files and local storage.

pub mod api;
pub mod document;
pub mod serialization;
pub mod storage;
