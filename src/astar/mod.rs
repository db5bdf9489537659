// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod constrained;
mod error;

pub use constrained::find_route;
pub use error::{RouteError, DEFAULT_STEP_LIMIT};
