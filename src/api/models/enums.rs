use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Process,
    Database,
    Application,
    Schema,
    Text,
}

impl NodeKind {
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Process,
        NodeKind::Database,
        NodeKind::Application,
        NodeKind::Schema,
        NodeKind::Text,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Process => "process",
            NodeKind::Database => "database",
            NodeKind::Application => "application",
            NodeKind::Schema => "schema",
            NodeKind::Text => "text",
        }
    }

    /// Default label for a freshly dropped node: the capitalised kind name.
    pub fn default_label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Label shown in the sidebar palette.
    pub fn palette_label(&self) -> &'static str {
        match self {
            NodeKind::Process => "Process",
            NodeKind::Database => "Database",
            NodeKind::Application => "Application",
            NodeKind::Schema => "Schema",
            NodeKind::Text => "Text Annotation",
        }
    }

    pub fn has_columns(&self) -> bool {
        matches!(self, NodeKind::Database | NodeKind::Schema)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown node type: {}", s))
    }
}

/// Curve routing of an edge path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PathType {
    #[default]
    Default,
    Step,
    #[serde(rename = "smoothstep")]
    SmoothStep,
}

impl PathType {
    pub fn curvature(&self) -> f64 {
        match self {
            PathType::Default => 0.25,
            PathType::Step => 0.0,
            PathType::SmoothStep => 0.125,
        }
    }

    pub fn from_edge_type(value: &str) -> Option<Self> {
        match value {
            "default" => Some(PathType::Default),
            "step" => Some(PathType::Step),
            "smoothstep" => Some(PathType::SmoothStep),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Arrow,
    #[serde(rename = "arrowclosed")]
    ArrowClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ArrowDirection {
    None,
    Start,
    #[default]
    End,
    Both,
}

impl ArrowDirection {
    pub const ALL: [ArrowDirection; 4] = [
        ArrowDirection::None,
        ArrowDirection::Start,
        ArrowDirection::End,
        ArrowDirection::Both,
    ];

    pub fn has_start(&self) -> bool {
        matches!(self, ArrowDirection::Start | ArrowDirection::Both)
    }

    pub fn has_end(&self) -> bool {
        matches!(self, ArrowDirection::End | ArrowDirection::Both)
    }

    pub fn from_markers(start: bool, end: bool) -> Self {
        match (start, end) {
            (false, false) => ArrowDirection::None,
            (true, false) => ArrowDirection::Start,
            (false, true) => ArrowDirection::End,
            (true, true) => ArrowDirection::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

impl LineStyle {
    pub const DASH_PATTERN: &'static str = "5,5";

    pub fn dasharray(&self) -> Option<&'static str> {
        match self {
            LineStyle::Solid => None,
            LineStyle::Dashed => Some(Self::DASH_PATTERN),
        }
    }

    /// Anything other than an absent, empty or `"0"` pattern counts as dashed.
    pub fn from_dasharray(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("0") => LineStyle::Solid,
            Some(_) => LineStyle::Dashed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub enum FontSize {
    #[serde(rename = "12px")]
    Px12,
    #[serde(rename = "14px")]
    Px14,
    #[default]
    #[serde(rename = "16px")]
    Px16,
    #[serde(rename = "18px")]
    Px18,
    #[serde(rename = "20px")]
    Px20,
}

impl FontSize {
    pub const ALL: [FontSize; 5] = [
        FontSize::Px12,
        FontSize::Px14,
        FontSize::Px16,
        FontSize::Px18,
        FontSize::Px20,
    ];

    pub fn pixels(&self) -> u32 {
        match self {
            FontSize::Px12 => 12,
            FontSize::Px14 => 14,
            FontSize::Px16 => 16,
            FontSize::Px18 => 18,
            FontSize::Px20 => 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub const ALL: [FontWeight; 2] = [FontWeight::Normal, FontWeight::Bold];
}

/// Side of a node an anchor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }
}
