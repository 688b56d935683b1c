//! Read a GraphML document back and summarise it
//!
//! Used to check exported files: counts, swimlane rows and columns in table
//! order, how many nodes each row holds, and id integrity.

use crate::error::ExportError;
use crate::serializer::ROW_KEY;
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Summary of a GraphML document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    /// Graph description
    pub description: String,
    /// Plain nodes
    pub nodes: usize,
    /// Group nodes (swimlane tables)
    pub groups: usize,
    /// Edges
    pub edges: usize,
    /// Row labels in table order
    pub rows: Vec<String>,
    /// Column labels in table order, empty for unlabeled columns
    pub columns: Vec<String>,
    /// Nodes per row label
    pub row_membership: IndexMap<String, usize>,
    /// Ids used more than once
    pub duplicate_ids: Vec<String>,
    /// Edges whose endpoints are not nodes of the document
    pub dangling_edges: Vec<String>,
}

impl InspectReport {
    /// No duplicate ids and no dangling edges
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.duplicate_ids.is_empty() && self.dangling_edges.is_empty()
    }
}

fn attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

#[derive(Default)]
struct State {
    report: InspectReport,
    ids: HashSet<String>,
    node_ids: HashSet<String>,
    endpoints: Vec<(String, String, String)>,
    row_ids: Vec<String>,
    column_ids: Vec<String>,
    lane_labels: HashMap<String, String>,
    data_key: Option<String>,
    in_label: bool,
    label: String,
}

impl State {
    fn register(&mut self, id: String) {
        if !self.ids.insert(id.clone()) && !self.report.duplicate_ids.contains(&id) {
            self.report.duplicate_ids.push(id);
        }
    }

    fn open(&mut self, e: &BytesStart<'_>) {
        match e.name().as_ref() {
            b"node" => {
                let id = attr(e, "id").unwrap_or_default();
                if attr(e, "yfiles.foldertype").is_some() {
                    self.report.groups += 1;
                } else {
                    self.report.nodes += 1;
                }
                self.node_ids.insert(id.clone());
                self.register(id);
            }
            b"edge" => {
                self.report.edges += 1;
                let id = attr(e, "id").unwrap_or_default();
                self.endpoints.push((
                    id.clone(),
                    attr(e, "source").unwrap_or_default(),
                    attr(e, "target").unwrap_or_default(),
                ));
                self.register(id);
            }
            b"data" => self.data_key = attr(e, "key"),
            b"y:NodeLabel" => {
                self.in_label = true;
                self.label.clear();
            }
            b"y:Row" => self.row_ids.extend(attr(e, "id")),
            b"y:Column" => self.column_ids.extend(attr(e, "id")),
            b"y:RowNodeLabelModelParameter" | b"y:ColumnNodeLabelModelParameter" => {
                if let Some(id) = attr(e, "id") {
                    self.lane_labels.insert(id, self.label.clone());
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"data" => self.data_key = None,
            b"y:NodeLabel" => self.in_label = false,
            _ => {}
        }
    }

    fn text(&mut self, text: String) {
        if self.in_label {
            self.label = text;
            return;
        }
        match self.data_key.as_deref() {
            Some(ROW_KEY) => *self.report.row_membership.entry(text).or_insert(0) += 1,
            Some("d0") => self.report.description = text,
            _ => {}
        }
    }

    fn finish(mut self) -> InspectReport {
        let label = |id: &String| self.lane_labels.get(id).cloned().unwrap_or_default();
        self.report.rows = self.row_ids.iter().map(label).collect();
        self.report.columns = self.column_ids.iter().map(label).collect();
        self.report.dangling_edges = self
            .endpoints
            .iter()
            .filter(|(_, s, t)| !self.node_ids.contains(s) || !self.node_ids.contains(t))
            .map(|(id, _, _)| id.clone())
            .collect();
        self.report
    }
}

/// Summarise a GraphML document
pub fn inspect(xml: &str) -> Result<InspectReport, ExportError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut state = State::default();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => state.open(&e),
            Ok(Event::Empty(e)) => {
                state.open(&e);
                state.close(e.name().as_ref());
            }
            Ok(Event::End(e)) => state.close(e.name().as_ref()),
            Ok(Event::Text(te)) => {
                let text = te.unescape().map_err(|e| ExportError::Read {
                    position: u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX),
                    message: e.to_string(),
                })?;
                state.text(text.into_owned());
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExportError::Read {
                    position: u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX),
                    message: e.to_string(),
                })
            }
            _ => {}
        }
    }
    Ok(state.finish())
}
