// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod gke;
pub mod handler;
pub mod kubernetes;
pub mod logging;
pub mod manifest;
pub mod server;
pub mod types;

#[cfg(test)]
pub mod test_utils;
