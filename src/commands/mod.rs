// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod invest;
pub mod news;
pub mod projects;
pub mod users;
pub mod wallets;
