// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};

use super::model;
use crate::Node;

/// Streams osm [Features](model::Feature) from XML data behind an
/// [std::io::BufRead].
pub(super) fn features_from_io<R: io::BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<model::Feature, quick_xml::Error>> {
    FeatureStream::new(IoSource(quick_xml::Reader::from_reader(reader), Vec::new()))
}

/// Streams osm [Features](model::Feature) from an in-memory XML document.
pub(super) fn features_from_buffer(
    data: &[u8],
) -> impl Iterator<Item = Result<model::Feature, quick_xml::Error>> + '_ {
    FeatureStream::new(SliceSource(quick_xml::Reader::from_reader(data)))
}

/// quick-xml reads borrowed data with [quick_xml::Reader::read_event] and
/// IO-backed data with [quick_xml::Reader::read_event_into], and the two
/// have incompatible signatures. This trait papers over the difference so
/// the feature assembly logic exists only once.
trait EventSource {
    fn next_event(&mut self) -> quick_xml::Result<Event<'_>>;
}

/// [EventSource] over an [std::io::BufRead], with the scratch buffer
/// [quick_xml::Reader::read_event_into] requires.
struct IoSource<R: io::BufRead>(quick_xml::Reader<R>, Vec<u8>);

impl<R: io::BufRead> EventSource for IoSource<R> {
    fn next_event(&mut self) -> quick_xml::Result<Event<'_>> {
        // The previous event's bytes are dead at this point;
        // reusing the buffer keeps its allocation bounded.
        self.1.clear();
        self.0.read_event_into(&mut self.1)
    }
}

/// [EventSource] over a slice of bytes (`&[u8]`).
struct SliceSource<'a>(quick_xml::Reader<&'a [u8]>);

impl EventSource for SliceSource<'_> {
    fn next_event(&mut self) -> quick_xml::Result<Event<'_>> {
        self.0.read_event()
    }
}

/// Iterator assembling raw XML events into whole [Features](model::Feature).
struct FeatureStream<S: EventSource> {
    source: S,
    eof: bool,
}

impl<S: EventSource> FeatureStream<S> {
    fn new(source: S) -> Self {
        Self { source, eof: false }
    }
}

impl<S: EventSource> Iterator for FeatureStream<S> {
    type Item = Result<model::Feature, quick_xml::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        // The feature under assembly. A feature never spans more than one
        // call: this loop runs until the feature is closed (or the
        // document ends).
        let mut current: Option<model::Feature> = None;

        while !self.eof {
            match self.source.next_event() {
                Err(e) => return Some(Err(e)),

                Ok(Event::Start(e)) => {
                    if let Some(complete) = open_element(&mut current, &e, false) {
                        return Some(Ok(complete));
                    }
                }
                Ok(Event::Empty(e)) => {
                    if let Some(complete) = open_element(&mut current, &e, true) {
                        return Some(Ok(complete));
                    }
                }

                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"node" | b"way" => {
                        if let Some(complete) = current.take() {
                            return Some(Ok(complete));
                        }
                    }
                    _ => {}
                },

                Ok(Event::Eof) => self.eof = true,
                Ok(_) => {}
            }
        }

        current.map(Ok)
    }
}

/// Routes one opening or self-closing element into the feature under
/// assembly. Returns a feature only when the element completes one all by
/// itself - a childless `<node/>`.
fn open_element(
    current: &mut Option<model::Feature>,
    e: &BytesStart<'_>,
    self_closing: bool,
) -> Option<model::Feature> {
    match e.local_name().as_ref() {
        b"node" => {
            if self_closing {
                return parse_node(e).map(model::Feature::Node);
            }
            *current = parse_node(e).map(model::Feature::Node);
        }

        // A way references at least one node, so it is never self-closing
        b"way" if !self_closing => *current = parse_way(e).map(model::Feature::Way),

        // Relations carry turn restrictions and similar metadata this
        // street model does not use. Clearing the slot keeps a relation's
        // children from leaking into the preceding feature.
        b"relation" if !self_closing => *current = None,

        b"nd" => {
            if let Some(model::Feature::Way(w)) = current {
                if let Some(node_id) = parse_nd(e) {
                    w.nodes.push(node_id);
                }
            }
        }
        b"tag" => {
            if let Some(model::Feature::Way(w)) = current {
                if let Some((k, v)) = parse_tag(e) {
                    w.tags.insert(k, v);
                }
            }
        }

        _ => {}
    }
    None
}

/// Reads one attribute of an element, unescaping XML entities.
/// Missing, non-UTF-8 and non-parseable values all come out as [None].
fn attr<T: FromStr>(e: &BytesStart<'_>, name: &str) -> Option<T> {
    let attr = e.try_get_attribute(name).ok()??;
    attr.unescape_value().ok()?.parse().ok()
}

fn parse_node(e: &BytesStart<'_>) -> Option<Node> {
    let id: i64 = attr(e, "id")?;
    let lat: f64 = attr(e, "lat")?;
    let lon: f64 = attr(e, "lon")?;
    (id != 0 && lat.is_finite() && lon.is_finite()).then_some(Node { id, lat, lon })
}

fn parse_way(e: &BytesStart<'_>) -> Option<model::Way> {
    let id: i64 = attr(e, "id").filter(|&id| id != 0)?;
    Some(model::Way {
        id,
        nodes: Vec::new(),
        tags: HashMap::new(),
    })
}

fn parse_nd(e: &BytesStart<'_>) -> Option<i64> {
    attr(e, "ref").filter(|&node_id| node_id != 0)
}

fn parse_tag(e: &BytesStart<'_>) -> Option<(String, String)> {
    let k: String = attr(e, "k")?;
    let v: String = attr(e, "v").unwrap_or_default();
    Some((k, v))
}
