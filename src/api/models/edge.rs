use super::enums::{ArrowDirection, LineStyle, MarkerKind, PathType};
use super::ids::edge_id;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Renderer kind every edge created by the editor uses.
pub const CUSTOM_EDGE_TYPE: &str = "custom";

pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Marker {
    #[serde(rename = "type")]
    pub kind: MarkerKind,
}

impl Marker {
    pub fn new(kind: MarkerKind) -> Self {
        Self { kind }
    }

    pub fn closed() -> Self {
        Self::new(MarkerKind::ArrowClosed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
}

fn default_stroke_width() -> f64 {
    DEFAULT_STROKE_WIDTH
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            stroke_width: DEFAULT_STROKE_WIDTH,
            stroke_dasharray: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub path_type: PathType,
}

/// A connector between two node anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EdgeRecord", into = "EdgeRecord")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
    pub animated: bool,
    pub style: EdgeStyle,
    pub marker_start: Option<Marker>,
    pub marker_end: Option<Marker>,
    pub data: EdgeData,
    /// Keys under `data` besides the label and path type.
    pub data_extra: Map<String, Value>,
    pub selected: bool,
    pub extra: Map<String, Value>,
}

impl Edge {
    /// Edge with the editor defaults: solid 2px stroke, closed arrow at the
    /// target, animated, empty label.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        source_handle: Option<String>,
        target_handle: Option<String>,
    ) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(
                &source,
                source_handle.as_deref(),
                &target,
                target_handle.as_deref(),
            ),
            source,
            target,
            source_handle,
            target_handle,
            animated: true,
            style: EdgeStyle::default(),
            marker_start: None,
            marker_end: Some(Marker::closed()),
            data: EdgeData::default(),
            data_extra: Map::new(),
            selected: false,
            extra: Map::new(),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// Same endpoints and anchors as `other`.
    pub fn connects_same(&self, other: &Edge) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.source_handle == other.source_handle
            && self.target_handle == other.target_handle
    }

    pub fn arrow_direction(&self) -> ArrowDirection {
        ArrowDirection::from_markers(self.marker_start.is_some(), self.marker_end.is_some())
    }

    /// Arrowhead kind shown on the edge; the target marker wins when both
    /// ends disagree.
    pub fn marker_kind(&self) -> MarkerKind {
        self.marker_end
            .or(self.marker_start)
            .map(|marker| marker.kind)
            .unwrap_or(MarkerKind::ArrowClosed)
    }

    /// Set marker presence from `direction`. Markers added here take the
    /// edge's current arrowhead kind.
    pub fn set_arrow_direction(&mut self, direction: ArrowDirection) {
        let fresh = Marker::new(self.marker_kind());
        self.marker_start = if direction.has_start() {
            Some(self.marker_start.unwrap_or(fresh))
        } else {
            None
        };
        self.marker_end = if direction.has_end() {
            Some(self.marker_end.unwrap_or(fresh))
        } else {
            None
        };
    }

    /// Change every arrowhead to `kind`. An edge without arrowheads gets one
    /// at the target.
    pub fn set_marker_kind(&mut self, kind: MarkerKind) {
        if self.marker_start.is_none() && self.marker_end.is_none() {
            self.marker_end = Some(Marker::new(kind));
            return;
        }
        for marker in [&mut self.marker_start, &mut self.marker_end]
            .into_iter()
            .flatten()
        {
            marker.kind = kind;
        }
    }

    pub fn line_style(&self) -> LineStyle {
        LineStyle::from_dasharray(self.style.stroke_dasharray.as_deref())
    }

    pub fn set_line_style(&mut self, line_style: LineStyle) {
        self.style.stroke_dasharray = line_style.dasharray().map(str::to_string);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EdgeRecord {
    id: String,
    source: String,
    target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_handle: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default)]
    animated: bool,
    #[serde(default)]
    style: EdgeStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    marker_start: Option<Marker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    marker_end: Option<Marker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<EdgeDataRecord>,
    #[serde(default)]
    selected: bool,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EdgeDataRecord {
    #[serde(default)]
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path_type: Option<PathType>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<EdgeRecord> for Edge {
    type Error = String;

    fn try_from(record: EdgeRecord) -> Result<Self, Self::Error> {
        if record.source.is_empty() || record.target.is_empty() {
            return Err(format!("edge {} has an empty endpoint", record.id));
        }

        let data = record.data.unwrap_or_default();
        // Older files stored the path shape in the edge type itself.
        let path_type = data
            .path_type
            .or_else(|| record.kind.as_deref().and_then(PathType::from_edge_type))
            .unwrap_or_default();

        let id = if record.id.is_empty() {
            edge_id(
                &record.source,
                record.source_handle.as_deref(),
                &record.target,
                record.target_handle.as_deref(),
            )
        } else {
            record.id
        };

        Ok(Edge {
            id,
            source: record.source,
            target: record.target,
            source_handle: record.source_handle,
            target_handle: record.target_handle,
            animated: record.animated,
            style: record.style,
            marker_start: record.marker_start,
            marker_end: record.marker_end,
            data: EdgeData {
                text: data.text,
                path_type,
            },
            data_extra: data.extra,
            selected: record.selected,
            extra: record.extra,
        })
    }
}

impl From<Edge> for EdgeRecord {
    fn from(edge: Edge) -> Self {
        EdgeRecord {
            id: edge.id,
            source: edge.source,
            target: edge.target,
            source_handle: edge.source_handle,
            target_handle: edge.target_handle,
            kind: Some(CUSTOM_EDGE_TYPE.to_string()),
            animated: edge.animated,
            style: edge.style,
            marker_start: edge.marker_start,
            marker_end: edge.marker_end,
            data: Some(EdgeDataRecord {
                text: edge.data.text,
                path_type: Some(edge.data.path_type),
                extra: edge.data_extra,
            }),
            selected: edge.selected,
            extra: edge.extra,
        }
    }
}
