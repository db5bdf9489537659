// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod reader;

pub use reader::{
    add_features_from_buffer, add_features_from_file, add_features_from_io, FileFormat, Options,
};
