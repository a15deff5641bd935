//! Markup annotation data model
//!
//! Four annotation kinds as a tagged union with exhaustive matching in the
//! commit/render/delete paths. All geometry is stored in normalized page
//! space (see `geometry`), so records survive zoom, pan, and resize
//! untouched. Records serialize to the shape the persistence collaborator
//! expects: page-keyed, normalized bounds, hex colors.

use crate::color::Color;
use crate::geometry::{NormPoint, NormRect};
use serde::{Deserialize, Serialize};

/// Stable identifier for addressable annotations
///
/// Freehand strokes are anonymous and append-only; everything else carries
/// a UUID that persists in saved records.
pub type AnnotationId = uuid::Uuid;

/// Edge of a label box an arrow line attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorEdge {
    Right,
    Bottom,
    Left,
    Top,
}

/// Arrow line from the label-box anchor to the arrow tip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowLine {
    pub start: NormPoint,
    pub end: NormPoint,
}

/// Editable label attached to an arrow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelBox {
    pub bounds: NormRect,
    pub html: String,
    pub text: String,
    pub color: Color,
    #[serde(rename = "fontSize")]
    pub font_size: f32,
}

/// A markup annotation on one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Annotation {
    /// Freehand pen stroke; anonymous and never edited after creation
    Stroke {
        points: Vec<NormPoint>,
        color: Color,
        width: f32,
    },

    /// Editable text box
    Text {
        id: AnnotationId,
        bounds: NormRect,
        html: String,
        text: String,
        color: Color,
        #[serde(rename = "fontSize")]
        font_size: f32,
        /// Region-of-interest rectangle this text answers, if any
        #[serde(rename = "pointerId")]
        pointer_id: Option<AnnotationId>,
    },

    /// Arrow with an attached label box; the line runs from the label-box
    /// anchor to the arrow tip
    Arrow {
        id: AnnotationId,
        line: ArrowLine,
        label: LabelBox,
    },

    /// Region-of-interest "pointer" rectangle, optionally carrying a
    /// high-DPI snapshot and a link to an external insight record
    Rectangle {
        id: AnnotationId,
        bounds: NormRect,
        color: Color,
        width: f32,
        title: String,
        description: Option<String>,
        #[serde(rename = "snapshotDataUrl")]
        snapshot_data_url: Option<String>,
        #[serde(rename = "insightId")]
        insight_id: Option<String>,
    },
}

impl Annotation {
    /// The annotation's stable id; `None` for anonymous strokes
    pub fn id(&self) -> Option<AnnotationId> {
        match self {
            Annotation::Stroke { .. } => None,
            Annotation::Text { id, .. }
            | Annotation::Arrow { id, .. }
            | Annotation::Rectangle { id, .. } => Some(*id),
        }
    }
}

/// Pick the label-box edge facing the arrow head
///
/// The direction vector from box center to head falls into one of four
/// angular buckets (45-degree diagonals as boundaries). Y grows downward,
/// so a positive-y direction points at the bottom edge.
pub fn anchor_edge(center: NormPoint, head: NormPoint) -> AnchorEdge {
    let dx = head.x - center.x;
    let dy = head.y - center.y;

    if dx.abs() >= dy.abs() {
        if dx >= 0.0 {
            AnchorEdge::Right
        } else {
            AnchorEdge::Left
        }
    } else if dy >= 0.0 {
        AnchorEdge::Bottom
    } else {
        AnchorEdge::Top
    }
}

/// The point on the label-box border where the arrow line attaches:
/// the midpoint of the edge facing the head
pub fn anchor_point(bounds: &NormRect, head: NormPoint) -> NormPoint {
    let center = bounds.center();
    match anchor_edge(center, head) {
        AnchorEdge::Right => NormPoint::new(bounds.x + bounds.w, center.y),
        AnchorEdge::Left => NormPoint::new(bounds.x, center.y),
        AnchorEdge::Bottom => NormPoint::new(center.x, bounds.y + bounds.h),
        AnchorEdge::Top => NormPoint::new(center.x, bounds.y),
    }
}

/// Partial update applied to an addressable annotation
///
/// Fields are applied only where the variant has a matching slot; the rest
/// are ignored. Label markup passes through the sanitizer in the store
/// before it reaches the record.
#[derive(Debug, Clone, Default)]
pub struct AnnotationPatch {
    /// New bounds for a text box, rectangle, or arrow label
    pub bounds: Option<NormRect>,
    /// New arrow tip position
    pub arrow_head: Option<NormPoint>,
    pub color: Option<Color>,
    pub width: Option<f32>,
    /// Raw label markup; sanitized on apply
    pub html: Option<String>,
    pub font_size: Option<f32>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub insight_id: Option<Option<String>>,
}

impl AnnotationPatch {
    pub fn bounds(bounds: NormRect) -> Self {
        Self { bounds: Some(bounds), ..Self::default() }
    }

    pub fn html(html: impl Into<String>) -> Self {
        Self { html: Some(html.into()), ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_bounds() -> NormRect {
        NormRect::new(0.4, 0.4, 0.2, 0.1)
    }

    #[test]
    fn head_right_of_center_anchors_right_edge_midpoint() {
        let bounds = label_bounds();
        let head = NormPoint::new(0.9, 0.45);

        let anchor = anchor_point(&bounds, head);
        assert!((anchor.x - 0.6).abs() < 1e-6);
        assert!((anchor.y - 0.45).abs() < 1e-6);
    }

    #[test]
    fn head_below_center_anchors_bottom_edge_midpoint() {
        let bounds = label_bounds();
        let head = NormPoint::new(0.5, 0.9);

        let anchor = anchor_point(&bounds, head);
        assert!((anchor.x - 0.5).abs() < 1e-6);
        assert!((anchor.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn anchor_edge_buckets_cover_all_quadrants() {
        let center = NormPoint::new(0.5, 0.5);
        assert_eq!(anchor_edge(center, NormPoint::new(0.9, 0.5)), AnchorEdge::Right);
        assert_eq!(anchor_edge(center, NormPoint::new(0.1, 0.5)), AnchorEdge::Left);
        assert_eq!(anchor_edge(center, NormPoint::new(0.5, 0.9)), AnchorEdge::Bottom);
        assert_eq!(anchor_edge(center, NormPoint::new(0.5, 0.1)), AnchorEdge::Top);
    }

    #[test]
    fn stroke_has_no_id() {
        let stroke = Annotation::Stroke {
            points: vec![NormPoint::new(0.1, 0.1)],
            color: Color::RED,
            width: 2.0,
        };
        assert_eq!(stroke.id(), None);
    }

    #[test]
    fn records_serialize_with_kind_tag_and_camel_case_fields() {
        let rect = Annotation::Rectangle {
            id: AnnotationId::new_v4(),
            bounds: NormRect::new(0.1, 0.1, 0.2, 0.2),
            color: Color::RED,
            width: 2.0,
            title: "footing detail".to_string(),
            description: None,
            snapshot_data_url: None,
            insight_id: None,
        };

        let json = serde_json::to_value(&rect).expect("serialize");
        assert_eq!(json.get("kind").and_then(|v| v.as_str()), Some("rectangle"));
        assert!(json.get("snapshotDataUrl").is_some());
        let x = json
            .get("bounds")
            .and_then(|b| b.get("xNorm"))
            .and_then(|v| v.as_f64())
            .expect("bounds.xNorm");
        assert!((x - 0.1).abs() < 1e-6);
    }
}
