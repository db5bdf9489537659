// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::fs::File;
use std::io;
use std::path::Path;

use graph_builder::GraphBuilder;

use crate::Graph;

mod graph_builder;
mod model;
mod xml;

/// Format of the input OSM file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the format from the file name extension;
    /// plain XML when the name gives no hint.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let name = path
            .as_ref()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if name.ends_with(".gz") {
            Self::XmlGz
        } else if name.ends_with(".bz2") {
            Self::XmlBz2
        } else {
            Self::Xml
        }
    }
}

/// Additional controls for interpreting OSM data as a routing [Graph].
#[derive(Debug)]
pub struct Options {
    /// Format of the input data.
    pub file_format: FileFormat,

    /// Keep only features inside this bounding box, given as
    /// `[min lon, min lat, max lon, max lat]`. An all-zero box, or one
    /// with a non-finite value, disables the filter.
    pub bbox: [f64; 4],
}

/// Internal trait for objects which can stream [osm features](model::Feature)
/// from an underlying source.
trait FeatureReader {
    type Error;
    fn next(&mut self) -> Result<Option<model::Feature>, Self::Error>;
}

impl<I, E> FeatureReader for I
where
    I: Iterator<Item = Result<model::Feature, E>>,
{
    type Error = E;

    fn next(&mut self) -> Result<Option<model::Feature>, E> {
        Iterator::next(self).transpose()
    }
}

/// Parse OSM features from a reader into a [Graph] as per the provided [Options].
///
/// The provided stream will be automatically decompressed and wrapped
/// in a buffered reader when needed.
pub fn add_features_from_io<R: io::Read>(
    g: &mut Graph,
    options: &Options,
    reader: R,
) -> Result<(), Box<dyn Error>> {
    match options.file_format {
        FileFormat::Xml => build(g, options, io::BufReader::new(reader)),
        FileFormat::XmlGz => build(
            g,
            options,
            io::BufReader::new(flate2::read::MultiGzDecoder::new(reader)),
        ),
        FileFormat::XmlBz2 => build(
            g,
            options,
            io::BufReader::new(bzip2::read::MultiBzDecoder::new(reader)),
        ),
    }
}

fn build<R: io::BufRead>(
    g: &mut Graph,
    options: &Options,
    reader: R,
) -> Result<(), Box<dyn Error>> {
    GraphBuilder::new(g, options).add_features(xml::features_from_io(reader))?;
    Ok(())
}

/// Parse OSM features from a file at the provided path into a [Graph] as per the provided [Options].
pub fn add_features_from_file<P: AsRef<Path>>(
    g: &mut Graph,
    options: &Options,
    path: P,
) -> Result<(), Box<dyn Error>> {
    let f = File::open(path)?;
    add_features_from_io(g, options, f)
}

/// Parse OSM features from a static buffer into a [Graph] as per the provided [Options].
pub fn add_features_from_buffer(
    g: &mut Graph,
    options: &Options,
    data: &[u8],
) -> Result<(), Box<dyn Error>> {
    if options.file_format == FileFormat::Xml {
        // In-memory XML data has a borrowing fast path
        GraphBuilder::new(g, options).add_features(xml::features_from_buffer(data))?;
        Ok(())
    } else {
        add_features_from_io(g, options, io::Cursor::new(data))
    }
}
