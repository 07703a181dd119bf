// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod config;
pub mod errors;
pub mod funding;
pub mod ledger;
pub mod models;
pub mod otp;
pub mod store;
pub mod utils;
pub mod commands;
