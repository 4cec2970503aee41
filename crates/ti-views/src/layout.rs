//! Grid layout of panel slots and chart selection per panel

use egui::{Pos2, Rect, Vec2};
use ti_core::PanelId;
use ti_data::{ChartKind, FieldSchema, GridSize, PanelSpec};

/// Widget margin in pixels, on every side of a slot
pub const WIDGET_MARGIN: f32 = 3.0;

/// The grid never has fewer columns than this
pub const MIN_COLUMNS: usize = 3;

const MIN_BASE: f32 = 20.0;

/// Grid geometry derived from the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayoutConfig {
    /// Size of a 1x1 slot without margins
    pub base: Vec2,
    pub margin: f32,
    pub min_cols: usize,
}

impl GridLayoutConfig {
    /// Quarter-viewport cells, so a typical screen holds four columns
    pub fn for_viewport(width: f32, height: f32) -> Self {
        Self {
            base: Vec2::new((width / 4.0 - 7.0).max(MIN_BASE), (height / 4.0 - 5.0).max(MIN_BASE)),
            margin: WIDGET_MARGIN,
            min_cols: MIN_COLUMNS,
        }
    }

    /// Distance between the origins of two neighbouring slots
    pub fn pitch(&self) -> Vec2 {
        self.base + Vec2::splat(2.0 * self.margin)
    }

    /// Columns that fit into `width`, never below `min_cols`
    pub fn columns_for(&self, width: f32) -> usize {
        ((width / self.pitch().x).floor() as usize).max(self.min_cols)
    }
}

/// Grid position of one panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub col: usize,
    pub row: usize,
    pub size: GridSize,
}

/// Panels packed into a grid, in panel order
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    config: GridLayoutConfig,
    columns: usize,
    rows: usize,
    cells: Vec<GridCell>,
}

impl GridLayout {
    /// Place each panel at the first free position, scanning rows top-down
    /// and columns left-right. Columns grow to fit the widest panel.
    pub fn pack(config: GridLayoutConfig, viewport_width: f32, sizes: &[GridSize]) -> Self {
        let widest = sizes.iter().map(|s| s.cols).max().unwrap_or(0);
        let columns = config.columns_for(viewport_width).max(widest);

        let mut occupied: Vec<Vec<bool>> = Vec::new();
        let mut cells = Vec::with_capacity(sizes.len());

        for size in sizes {
            let size = GridSize::new(size.cols.max(1), size.rows.max(1));
            let (col, row) = first_fit(&occupied, columns, size);

            if occupied.len() < row + size.rows {
                occupied.resize(row + size.rows, vec![false; columns]);
            }
            for r in row..row + size.rows {
                for c in col..col + size.cols {
                    occupied[r][c] = true;
                }
            }
            cells.push(GridCell { col, row, size });
        }

        let layout = Self {
            config,
            columns,
            rows: occupied.len(),
            cells,
        };
        tracing::debug!(
            "Packed {} panels into {}x{} grid",
            layout.cells.len(),
            layout.columns,
            layout.rows
        );
        layout
    }

    pub fn config(&self) -> &GridLayoutConfig {
        &self.config
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn cell(&self, panel: PanelId) -> Option<&GridCell> {
        self.cells.get(panel.index())
    }

    /// Container rectangle of a panel in dashboard pixels
    pub fn rect(&self, panel: PanelId) -> Option<Rect> {
        let cell = self.cell(panel)?;
        let pitch = self.config.pitch();
        let m = self.config.margin;
        let min = Pos2::new(m + cell.col as f32 * pitch.x, m + cell.row as f32 * pitch.y);
        let size = Vec2::new(
            cell.size.cols as f32 * self.config.base.x + (cell.size.cols - 1) as f32 * 2.0 * m,
            cell.size.rows as f32 * self.config.base.y + (cell.size.rows - 1) as f32 * 2.0 * m,
        );
        Some(Rect::from_min_size(min, size))
    }

    /// Total size of the packed grid
    pub fn content_size(&self) -> Vec2 {
        let pitch = self.config.pitch();
        Vec2::new(self.columns as f32 * pitch.x, self.rows as f32 * pitch.y)
    }

    /// Panel whose container contains `pos`
    pub fn panel_at(&self, pos: Pos2) -> Option<PanelId> {
        (0..self.cells.len())
            .map(PanelId)
            .find(|&panel| self.rect(panel).map_or(false, |r| r.contains(pos)))
    }
}

fn first_fit(occupied: &[Vec<bool>], columns: usize, size: GridSize) -> (usize, usize) {
    let free = |col: usize, row: usize| {
        (row..row + size.rows).all(|r| {
            (col..col + size.cols).all(|c| occupied.get(r).map_or(true, |cells| !cells[c]))
        })
    };

    // A row past the last occupied one always fits
    for row in 0..=occupied.len() {
        for col in 0..=columns.saturating_sub(size.cols) {
            if free(col, row) {
                return (col, row);
            }
        }
    }
    (0, occupied.len())
}

/// Chart kind for a panel: the explicit declaration when present, otherwise
/// one field gives a line chart when numeric and a bar chart when not, and
/// two fields give a scatter plot.
pub fn select_chart(spec: &PanelSpec, schema: &FieldSchema) -> ChartKind {
    if let Some(kind) = spec.chart {
        return kind;
    }
    match spec.fields.as_slice() {
        [field] if schema.is_numeric(field) => ChartKind::Line,
        [_] => ChartKind::Bar,
        _ => ChartKind::Scatter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ti_data::{Record, TypeInference, Value};

    fn flights_sizes() -> Vec<GridSize> {
        [(2, 1), (1, 2), (1, 2), (2, 1), (2, 1), (1, 1), (1, 1), (2, 1), (2, 1)]
            .into_iter()
            .map(|(c, r)| GridSize::new(c, r))
            .collect()
    }

    #[test]
    fn test_flights_panels_fill_four_by_four() {
        let config = GridLayoutConfig::for_viewport(1600.0, 1000.0);
        let layout = GridLayout::pack(config, 1600.0, &flights_sizes());

        assert_eq!(layout.columns(), 4);
        assert_eq!(layout.rows(), 4);
        let positions: Vec<(usize, usize)> = layout.cells().iter().map(|c| (c.col, c.row)).collect();
        assert_eq!(
            positions,
            vec![(0, 0), (2, 0), (3, 0), (0, 1), (0, 2), (2, 2), (3, 2), (0, 3), (2, 3)]
        );
    }

    #[test]
    fn test_slot_rects_do_not_overlap() {
        let config = GridLayoutConfig::for_viewport(1600.0, 1000.0);
        let layout = GridLayout::pack(config, 1600.0, &flights_sizes());

        let rects: Vec<Rect> = (0..9).filter_map(|i| layout.rect(PanelId(i))).collect();
        assert_eq!(rects.len(), 9);
        for (i, a) in rects.iter().enumerate() {
            for b in rects.iter().skip(i + 1) {
                assert!(!a.intersects(b.shrink(0.5)));
            }
        }
        let wide = layout.rect(PanelId(0)).unwrap();
        assert_eq!(wide.width(), 2.0 * config.base.x + 2.0 * WIDGET_MARGIN);
        assert_eq!(layout.panel_at(wide.center()), Some(PanelId(0)));
        assert!(layout.rect(PanelId(9)).is_none());
    }

    #[test]
    fn test_columns_grow_for_wide_panels() {
        let config = GridLayoutConfig::for_viewport(300.0, 300.0);
        let layout = GridLayout::pack(config, 300.0, &[GridSize::new(5, 1), GridSize::new(1, 1)]);
        assert_eq!(layout.columns(), 5);
        assert_eq!(layout.cells()[1].row, 1);
    }

    #[test]
    fn test_select_chart() {
        let records = vec![
            Record::from_pairs([("origin", Value::from("SEA")), ("dep_delay", Value::from(5.0))]),
            Record::from_pairs([("origin", Value::from("SEA")), ("dep_delay", Value::from(10.0))]),
            Record::from_pairs([("origin", Value::from("PDX")), ("dep_delay", Value::from(3.0))]),
        ];
        let schema = TypeInference::new().infer([("origin", 100.0), ("dep_delay", 50.0)], &records);

        assert_eq!(select_chart(&PanelSpec::new(["dep_delay"], 2, 1), &schema), ChartKind::Line);
        assert_eq!(select_chart(&PanelSpec::new(["origin"], 1, 2), &schema), ChartKind::Bar);
        assert_eq!(select_chart(&PanelSpec::new(["unsampled"], 1, 1), &schema), ChartKind::Bar);
        assert_eq!(
            select_chart(&PanelSpec::new(["origin", "dep_delay"], 2, 1), &schema),
            ChartKind::Scatter
        );
        let declared = PanelSpec::new(["latitude", "longitude"], 2, 2).with_chart(ChartKind::ClusterMap);
        assert_eq!(select_chart(&declared, &schema), ChartKind::ClusterMap);
    }
}
