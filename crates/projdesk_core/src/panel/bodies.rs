//! Bodies section rendering for the three view modes.

use crate::model::body::{Body, BodyId};
use serde::{Deserialize, Serialize};

/// Bodies list presentation. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Grid,
    Table,
    Visual,
}

impl ViewMode {
    /// Toggle order as shown in the view switcher.
    pub const ALL: [ViewMode; 3] = [ViewMode::Grid, ViewMode::Table, ViewMode::Visual];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Table => "table",
            Self::Visual => "visual",
        }
    }
}

/// One toggle button in the view switcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewModeControl {
    pub mode: ViewMode,
    pub active: bool,
}

pub fn view_controls(active: ViewMode) -> [ViewModeControl; 3] {
    ViewMode::ALL.map(|mode| ViewModeControl {
        mode,
        active: mode == active,
    })
}

pub const TABLE_COLUMNS: [&str; 6] = ["#", "WIDTH", "HEIGHT", "DEPTH", "VOLUME", "ID"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionValue {
    pub label: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyCard {
    pub body_id: BodyId,
    pub index: u32,
    pub dimensions: [DimensionValue; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyTable {
    pub columns: [&'static str; 6],
    pub rows: Vec<[String; 6]>,
}

/// Box drawn in the visual mode, scaled against the largest dimension in the
/// project so relative sizes are comparable.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyBox {
    pub body_id: BodyId,
    pub index: u32,
    pub scale: [f64; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodiesView {
    Empty,
    Grid(Vec<BodyCard>),
    Table(BodyTable),
    Visual(Vec<BodyBox>),
}

pub fn render_bodies(bodies: &[Body], mode: ViewMode) -> BodiesView {
    if bodies.is_empty() {
        return BodiesView::Empty;
    }

    match mode {
        ViewMode::Grid => BodiesView::Grid(bodies.iter().map(body_card).collect()),
        ViewMode::Table => BodiesView::Table(BodyTable {
            columns: TABLE_COLUMNS,
            rows: bodies.iter().map(table_row).collect(),
        }),
        ViewMode::Visual => {
            let largest = bodies
                .iter()
                .map(|body| body.dimensions.largest())
                .fold(0.0_f64, f64::max);
            BodiesView::Visual(
                bodies
                    .iter()
                    .map(|body| {
                        let dims = body.dimensions;
                        BodyBox {
                            body_id: body.id,
                            index: body.index,
                            scale: [dims.width, dims.height, dims.depth]
                                .map(|value| value / largest),
                        }
                    })
                    .collect(),
            )
        }
    }
}

fn body_card(body: &Body) -> BodyCard {
    let dims = body.dimensions;
    BodyCard {
        body_id: body.id,
        index: body.index,
        dimensions: [
            DimensionValue {
                label: "W",
                value: dims.width,
            },
            DimensionValue {
                label: "H",
                value: dims.height,
            },
            DimensionValue {
                label: "D",
                value: dims.depth,
            },
        ],
    }
}

fn table_row(body: &Body) -> [String; 6] {
    let dims = body.dimensions;
    [
        body.index.to_string(),
        format_number(dims.width),
        format_number(dims.height),
        format_number(dims.depth),
        format_number(dims.volume()),
        body.id.to_string(),
    ]
}

fn format_number(value: f64) -> String {
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::{render_bodies, view_controls, BodiesView, ViewMode, TABLE_COLUMNS};
    use crate::model::body::{Body, BodyDimensions};
    use uuid::Uuid;

    fn bodies() -> Vec<Body> {
        let project_id = Uuid::new_v4();
        vec![
            Body {
                id: Uuid::new_v4(),
                project_id,
                index: 0,
                dimensions: BodyDimensions::new(2.0, 4.0, 1.0),
            },
            Body {
                id: Uuid::new_v4(),
                project_id,
                index: 1,
                dimensions: BodyDimensions::new(8.0, 1.5, 2.0),
            },
        ]
    }

    #[test]
    fn exactly_one_control_is_active() {
        for mode in ViewMode::ALL {
            let controls = view_controls(mode);
            assert_eq!(controls.iter().filter(|c| c.active).count(), 1);
        }
    }

    #[test]
    fn grid_cards_expose_three_dimensions() {
        let BodiesView::Grid(cards) = render_bodies(&bodies(), ViewMode::Grid) else {
            panic!("expected grid view");
        };
        assert_eq!(cards.len(), 2);
        assert!(cards.iter().all(|card| card.dimensions.len() == 3));
        assert_eq!(cards[1].index, 1);
    }

    #[test]
    fn table_has_six_columns() {
        let BodiesView::Table(table) = render_bodies(&bodies(), ViewMode::Table) else {
            panic!("expected table view");
        };
        assert_eq!(table.columns, TABLE_COLUMNS);
        assert_eq!(table.rows[0][1], "2");
        assert_eq!(table.rows[1][2], "1.5");
        assert_eq!(table.rows[1][4], "24");
    }

    #[test]
    fn visual_scales_against_largest_dimension() {
        let BodiesView::Visual(boxes) = render_bodies(&bodies(), ViewMode::Visual) else {
            panic!("expected visual view");
        };
        assert_eq!(boxes[1].scale[0], 1.0);
        assert_eq!(boxes[0].scale[1], 0.5);
    }

    #[test]
    fn no_bodies_renders_empty_state() {
        for mode in ViewMode::ALL {
            assert_eq!(render_bodies(&[], mode), BodiesView::Empty);
        }
    }
}
