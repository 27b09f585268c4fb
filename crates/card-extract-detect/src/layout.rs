//! Position-based slot assignment.

use std::fmt;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::ParamsError;

/// Which assignment rule maps region centroids to slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutKind {
    /// Topmost region is the talon, the rest are columns left to right.
    #[default]
    Tableau,
    /// Row-major grid; rows are equal-size chunks of the y-sorted regions.
    Grid { rows: usize },
    /// One card, one slot.
    Single,
}

impl LayoutKind {
    pub fn validate(&self, count: usize) -> Result<(), ParamsError> {
        if count == 0 {
            return Err(ParamsError::NoRegions);
        }
        match *self {
            LayoutKind::Tableau if count < 2 => Err(ParamsError::TableauTooSmall { regions: count }),
            LayoutKind::Grid { rows } if rows == 0 || count % rows != 0 => Err(ParamsError::UnevenGrid {
                regions: count,
                rows,
            }),
            _ => Ok(()),
        }
    }
}

/// Named position in the output ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Talon,
    /// 1-based tableau column.
    Column(usize),
    Grid { row: usize, col: usize },
    Card,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Talon => f.write_str("talon"),
            Slot::Column(n) => write!(f, "col_{n}"),
            Slot::Grid { row, col } => write!(f, "r{row}_c{col}"),
            Slot::Card => f.write_str("card"),
        }
    }
}

/// Fixed ordered slot list for one layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotMap {
    kind: LayoutKind,
    slots: Vec<Slot>,
}

impl SlotMap {
    pub fn for_layout(kind: LayoutKind, count: usize) -> Result<Self, ParamsError> {
        kind.validate(count)?;
        let slots = match kind {
            LayoutKind::Tableau => std::iter::once(Slot::Talon)
                .chain((1..count).map(Slot::Column))
                .collect(),
            LayoutKind::Grid { rows } => {
                let cols = count / rows;
                (0..rows)
                    .flat_map(|row| (0..cols).map(move |col| Slot::Grid { row, col }))
                    .collect()
            }
            LayoutKind::Single => (0..count).map(|_| Slot::Card).collect(),
        };
        Ok(Self { kind, slots })
    }

    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn sort_by_y(indices: &mut [usize], centroids: &[Point2<f32>]) {
    indices.sort_by(|&a, &b| centroids[a].y.total_cmp(&centroids[b].y));
}

fn sort_by_x(indices: &mut [usize], centroids: &[Point2<f32>]) {
    indices.sort_by(|&a, &b| centroids[a].x.total_cmp(&centroids[b].x));
}

/// Order region indices into slot order for `kind`.
///
/// `result[slot] = region index`. Sorts are stable, so equal keys keep
/// detection order.
pub fn layout_order(kind: LayoutKind, centroids: &[Point2<f32>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..centroids.len()).collect();
    match kind {
        LayoutKind::Tableau => {
            sort_by_y(&mut order, centroids);
            if let Some((_talon, columns)) = order.split_first_mut() {
                sort_by_x(columns, centroids);
            }
        }
        LayoutKind::Grid { rows } => {
            sort_by_y(&mut order, centroids);
            let per_row = if rows == 0 { order.len() } else { order.len() / rows };
            if per_row > 0 {
                for row in order.chunks_mut(per_row) {
                    sort_by_x(row, centroids);
                }
            }
        }
        LayoutKind::Single => {}
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(v: &[(f32, f32)]) -> Vec<Point2<f32>> {
        v.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    #[test]
    fn tableau_talon_then_columns_by_x() {
        // discovery order deliberately scrambled
        let c = pts(&[
            (500.0, 410.0),
            (100.0, 400.0),
            (300.0, 80.0),
            (700.0, 395.0),
            (200.0, 405.0),
        ]);
        let order = layout_order(LayoutKind::Tableau, &c);
        assert_eq!(order, vec![2, 1, 4, 0, 3]);
    }

    #[test]
    fn grid_is_row_major() {
        let c = pts(&[
            (30.0, 210.0),
            (10.0, 12.0),
            (20.0, 200.0),
            (30.0, 8.0),
            (10.0, 205.0),
            (20.0, 10.0),
        ]);
        let order = layout_order(LayoutKind::Grid { rows: 2 }, &c);
        assert_eq!(order, vec![1, 5, 3, 4, 2, 0]);
    }

    #[test]
    fn ties_keep_detection_order() {
        let c = pts(&[(50.0, 10.0), (50.0, 10.0), (10.0, 10.0)]);
        let order = layout_order(LayoutKind::Grid { rows: 1 }, &c);
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn order_does_not_depend_on_discovery_order() {
        let base = pts(&[(300.0, 50.0), (100.0, 300.0), (250.0, 310.0), (400.0, 290.0)]);
        let shuffled = vec![base[3], base[0], base[2], base[1]];
        let slots = |c: &[Point2<f32>]| -> Vec<(i32, i32)> {
            layout_order(LayoutKind::Tableau, c)
                .into_iter()
                .map(|i| (c[i].x as i32, c[i].y as i32))
                .collect()
        };
        assert_eq!(slots(&base), slots(&shuffled));
    }

    #[test]
    fn slot_names() {
        let map = SlotMap::for_layout(LayoutKind::Tableau, 8).unwrap();
        let names: Vec<String> = map.slots().iter().map(ToString::to_string).collect();
        assert_eq!(names[0], "talon");
        assert_eq!(names[7], "col_7");

        let grid = SlotMap::for_layout(LayoutKind::Grid { rows: 2 }, 14).unwrap();
        assert_eq!(grid.slots()[10].to_string(), "r1_c3");
        assert_eq!(Slot::Card.to_string(), "card");
    }

    #[test]
    fn invalid_layouts_are_rejected() {
        assert_eq!(
            SlotMap::for_layout(LayoutKind::Grid { rows: 3 }, 14),
            Err(ParamsError::UnevenGrid { regions: 14, rows: 3 })
        );
        assert_eq!(
            SlotMap::for_layout(LayoutKind::Tableau, 1),
            Err(ParamsError::TableauTooSmall { regions: 1 })
        );
        assert_eq!(SlotMap::for_layout(LayoutKind::Single, 0), Err(ParamsError::NoRegions));
    }
}
