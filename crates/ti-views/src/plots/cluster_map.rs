//! Cluster map over a latitude / longitude pair.
//!
//! Locations sit at `(longitude, latitude)` in plot space and are binned into
//! square cells of `cell_size` pixels. Each non-empty cell is drawn as one
//! circle labelled with its count; clicking a cell toggles every key inside
//! it. Cells are rebuilt when the plot is resized, so annotations are stored
//! under a member location rather than under the cell.

use ahash::AHashMap;
use egui::Vec2;
use egui_plot::PlotPoint;
use ti_data::{AggregationKey, Bucket, ChartKind, Dimension};

use crate::chart::{ChartConfig, ChartCore, ChartWidget};
use crate::plots::utils::{extent, padded, viridis_color};
use crate::reconcile::reconcile;
use crate::scene::{Mark, MarkStyle, PlotAxis, PlotFrame, Shape, TextAnchor, TextMark};

/// Circle radius in pixels for the smallest cell
const MIN_RADIUS: f32 = 4.0;

/// Plot position of a composite `(latitude, longitude)` key
fn location(key: &AggregationKey) -> Option<PlotPoint> {
    let parts = key.parts()?;
    let lat = parts.first()?.1.as_f64()?;
    let lon = parts.get(1)?.1.as_f64()?;
    Some(PlotPoint::new(lon, lat))
}

/// One occupied cell
#[derive(Debug, Clone, Default)]
struct Cell {
    count: u64,
    weighted: [f64; 2],
}

impl Cell {
    /// Count-weighted mean location
    fn center(&self) -> PlotPoint {
        let count = self.count.max(1) as f64;
        PlotPoint::new(self.weighted[0] / count, self.weighted[1] / count)
    }
}

pub struct ClusterMap {
    core: ChartCore,
    /// Cell key to the composite keys binned into it
    members: AHashMap<AggregationKey, Vec<AggregationKey>>,
}

impl ClusterMap {
    pub fn new(config: ChartConfig, dimension: Dimension) -> Self {
        Self {
            core: ChartCore::new(config, dimension),
            members: AHashMap::new(),
        }
    }

    /// Frame over the padded extent of every location in the background
    fn frame(background: &[Bucket], size: Vec2) -> PlotFrame {
        let locations = || background.iter().filter_map(|b| location(&b.key));
        let (x0, x1) = padded(extent(locations().map(|p| p.x)).unwrap_or((0.0, 1.0)));
        let (y0, y1) = padded(extent(locations().map(|p| p.y)).unwrap_or((0.0, 1.0)));
        PlotFrame::new([x0, y0], [x1, y1], size)
    }

    fn cell_key(frame: &PlotFrame, at: PlotPoint, cell_size: f32) -> AggregationKey {
        let pos = frame.to_screen(at);
        let i = (pos.x / cell_size).floor() as i64;
        let j = (pos.y / cell_size).floor() as i64;
        AggregationKey::Text(format!("{},{}", i, j))
    }

    /// Sum counts per cell, with count-weighted centroids. Cells come out in
    /// key order.
    fn bin(frame: &PlotFrame, buckets: &[Bucket], cell_size: f32) -> Vec<(AggregationKey, Cell)> {
        let mut cells: AHashMap<AggregationKey, Cell> = AHashMap::new();
        for bucket in buckets {
            let Some(at) = location(&bucket.key) else {
                continue;
            };
            let cell = cells.entry(Self::cell_key(frame, at, cell_size)).or_default();
            cell.count += bucket.value;
            cell.weighted[0] += at.x * bucket.value as f64;
            cell.weighted[1] += at.y * bucket.value as f64;
        }

        let mut cells: Vec<(AggregationKey, Cell)> = cells.into_iter().collect();
        cells.sort_by(|a, b| a.0.cmp(&b.0));
        cells
    }

    fn label(&self, count: u64) -> String {
        let objects = if count == 1 {
            self.core.config.object_singular()
        } else {
            self.core.config.object_plural()
        };
        format!("{} {}", count, objects)
    }

    fn radius(count: u64, max: u64, cell_size: f32) -> f32 {
        let max_radius = (cell_size / 2.0).max(MIN_RADIUS);
        if max == 0 {
            return MIN_RADIUS;
        }
        MIN_RADIUS + (max_radius - MIN_RADIUS) * ((count as f32) / (max as f32)).sqrt()
    }
}

impl ChartWidget for ClusterMap {
    fn kind(&self) -> ChartKind {
        ChartKind::ClusterMap
    }

    fn core(&self) -> &ChartCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ChartCore {
        &mut self.core
    }

    fn members(&self, mark: &AggregationKey) -> Vec<AggregationKey> {
        self.members.get(mark).cloned().unwrap_or_default()
    }

    fn annotation_key(&self, mark: &AggregationKey) -> AggregationKey {
        self.members
            .get(mark)
            .and_then(|keys| keys.first())
            .cloned()
            .unwrap_or_else(|| mark.clone())
    }

    fn restyle(&mut self) {
        let members = &self.members;
        self.core
            .restyle_by(|cell| members.get(cell).cloned().unwrap_or_else(|| vec![cell.clone()]));
    }

    fn render(&mut self) {
        let (background, foreground) = self.core.pull();
        let cell_size = self.core.config.cell_size();
        let theme = *self.core.config.theme();
        let frame = Self::frame(&background, self.core.inner_size());
        let origin = PlotPoint::new(frame.min[0], frame.min[1]);

        // Membership follows the background so a cell keeps its keys while filtered
        self.members.clear();
        for bucket in &background {
            if let Some(at) = location(&bucket.key) {
                self.members
                    .entry(Self::cell_key(&frame, at, cell_size))
                    .or_default()
                    .push(bucket.key.clone());
            }
        }

        let background_cells = Self::bin(&frame, &background, cell_size);
        let bg_max = background_cells.iter().map(|(_, c)| c.count).max().unwrap_or(0);
        let bg_buckets: Vec<Bucket> = background_cells.iter().map(|(k, c)| Bucket::new(k.clone(), c.count)).collect();
        let bg_centers: AHashMap<AggregationKey, PlotPoint> =
            background_cells.iter().map(|(k, c)| (k.clone(), c.center())).collect();
        // Cells move with the pixel grid, so ghost cells follow a resize
        let ghost = |bucket: &Bucket, mark: &mut Mark| {
            mark.shape = Shape::Point {
                at: bg_centers.get(&bucket.key).copied().unwrap_or(origin),
                radius: Self::radius(bucket.value, bg_max, cell_size),
            };
            // Shaded by unfiltered density
            mark.style = MarkStyle::new(viridis_color(bucket.value as f32 / bg_max.max(1) as f32), 0.15, 0.3);
        };
        let diff = reconcile(&self.core.rendered_background, &bg_buckets);
        self.core.scene.background.apply(
            &diff,
            |bucket| {
                let mut mark = Mark::new(
                    bucket,
                    Shape::Point { at: origin, radius: MIN_RADIUS },
                    MarkStyle::new(theme.background_fill_color, 0.15, 0.3),
                );
                ghost(bucket, &mut mark);
                mark
            },
            |bucket, mark| ghost(bucket, mark),
        );
        self.core.rendered_background = bg_buckets;

        let cells = Self::bin(&frame, &foreground, cell_size);
        let fg_max = cells.iter().map(|(_, c)| c.count).max().unwrap_or(0);
        let fg_buckets: Vec<Bucket> = cells.iter().map(|(k, c)| Bucket::new(k.clone(), c.count)).collect();
        let centers: AHashMap<AggregationKey, PlotPoint> =
            cells.iter().map(|(k, c)| (k.clone(), c.center())).collect();
        let labels: AHashMap<AggregationKey, String> =
            cells.iter().map(|(k, c)| (k.clone(), self.label(c.count))).collect();
        let mut fills: AHashMap<AggregationKey, egui::Color32> = AHashMap::new();
        let mut visible: AHashMap<AggregationKey, bool> = AHashMap::new();
        for (key, _) in &cells {
            let members = self.members.get(key).map(Vec::as_slice).unwrap_or(&[]);
            fills.insert(key.clone(), self.core.fill_for_any(members));
            visible.insert(key.clone(), self.core.filters.is_any_visible(members));
        }

        let layout = |bucket: &Bucket, mark: &mut Mark| {
            let center = centers.get(&bucket.key).copied().unwrap_or(origin);
            mark.shape = Shape::Point {
                at: center,
                radius: Self::radius(bucket.value, fg_max, cell_size),
            };
            if let Some(fill) = fills.get(&bucket.key) {
                mark.style.fill = *fill;
                mark.style.stroke = *fill;
            }
            mark.text = Some(TextMark::new(
                center,
                labels.get(&bucket.key).cloned().unwrap_or_default(),
                TextAnchor::Middle,
                theme.text,
                10.0,
            ));
            mark.set_visible(visible.get(&bucket.key).copied().unwrap_or(false));
        };

        let previous = std::mem::take(&mut self.core.foreground);
        self.core.scene.foreground.apply(
            &reconcile(&previous, &fg_buckets),
            |bucket| {
                let mut mark = Mark::new(
                    bucket,
                    Shape::Point { at: origin, radius: MIN_RADIUS },
                    MarkStyle::new(theme.fill_color, 0.6, 0.9),
                );
                mark.interactive = true;
                layout(bucket, &mut mark);
                mark
            },
            |bucket, mark| layout(bucket, mark),
        );
        self.core.foreground = fg_buckets;

        if self.core.scene.title.is_none() {
            self.core.scene.title = Some(self.core.config.title());
        }
        self.core.scene.x_axis = PlotAxis::hidden();
        self.core.scene.y_axis = PlotAxis::hidden();
        self.core.scene.frame = frame;
        self.core.scene.size = self.core.container.max(Vec2::ZERO);
        self.core.render_count += 1;

        tracing::debug!(
            "{} rendered cluster map: {} cells over {} locations",
            self.core.config.panel(),
            self.core.foreground.len(),
            background.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartAction;
    use egui::Modifiers;
    use ti_core::{PanelId, QueryOperator};
    use ti_data::{AggregationIndex, DimensionKey, FieldKind, Record, Value};

    fn permit(lat: f64, lon: f64) -> Record {
        Record::from_pairs([("latitude", Value::from(lat)), ("longitude", Value::from(lon))])
    }

    fn map() -> (AggregationIndex, ClusterMap) {
        let index = AggregationIndex::new(vec![
            permit(47.60, -122.33),
            permit(47.60, -122.33),
            permit(47.61, -122.32),
            permit(45.52, -122.68),
        ]);
        let dimension = index.dimension(DimensionKey::Composite("latitude".into(), "longitude".into()));
        let config = ChartConfig::builder(PanelId(5), ["latitude", "longitude"])
            .field_kind(0, Some(FieldKind::Numeric))
            .field_kind(1, Some(FieldKind::Numeric))
            .objects("permit", "permits")
            .cell_size(40.0)
            .build();
        let mut map = ClusterMap::new(config, dimension);
        map.resize(Vec2::new(400.0, 400.0));
        map.render();
        (index, map)
    }

    fn labels(map: &ClusterMap) -> Vec<String> {
        let mut labels: Vec<String> = map
            .scene()
            .foreground
            .visible()
            .filter_map(|m| m.text.as_ref().map(|t| t.text.clone()))
            .collect();
        labels.sort();
        labels
    }

    #[test]
    fn test_nearby_points_share_a_cell() {
        let (_, map) = map();
        assert_eq!(map.scene().foreground.len(), 2);
        assert_eq!(labels(&map), vec!["1 permit".to_string(), "3 permits".to_string()]);
    }

    #[test]
    fn test_click_toggles_every_member() {
        let (index, mut map) = map();
        let seattle = map
            .scene()
            .foreground
            .iter()
            .find(|m| m.value == 3)
            .map(|m| (m.key.clone(), m.shape.center()))
            .unwrap();
        assert_eq!(map.members(&seattle.0).len(), 2);

        match map.click(seattle.1, Modifiers::NONE) {
            ChartAction::Toggled { descriptor, keys, selected, .. } => {
                assert!(selected);
                assert_eq!(keys.len(), 2);
                assert_eq!(descriptor.operator, Some(QueryOperator::In));
                assert_eq!(descriptor.index.as_deref(), Some("latitude,longitude"));
            }
            other => panic!("unexpected action {:?}", other),
        }
        map.render();
        assert_eq!(index.filtered_len(), 3);
        assert_eq!(labels(&map), vec!["3 permits".to_string()]);

        map.click(seattle.1, Modifiers::NONE);
        map.render();
        assert_eq!(index.filtered_len(), 4);
        assert_eq!(labels(&map).len(), 2);
    }

    #[test]
    fn test_annotation_follows_location_across_resize() {
        let (_, mut map) = map();
        let alt = Modifiers { alt: true, ..Modifiers::NONE };
        let seattle = map.scene().foreground.iter().find(|m| m.value == 3).map(|m| m.key.clone()).unwrap();
        let center = map.scene().foreground.get(&seattle).unwrap().shape.center();

        let key = match map.click(center, alt) {
            ChartAction::Annotate { key } => key,
            other => panic!("unexpected action {:?}", other),
        };
        assert!(map.members(&seattle).contains(&key));
        assert!(key.parts().is_some());

        map.mark_annotated(key.clone());
        map.resize(Vec2::new(250.0, 600.0));
        map.render();

        let theme = *map.config().theme();
        let cell = map
            .scene()
            .foreground
            .keys()
            .find(|cell| map.members(cell).contains(&key))
            .cloned()
            .unwrap();
        let fill = map.scene().foreground.get(&cell).map(|m| m.style.fill);
        assert_eq!(fill, Some(theme.annotated));
        for mark in map.scene().foreground.iter().filter(|m| m.key != cell) {
            assert_eq!(mark.style.fill, theme.fill_color);
        }
    }

    #[test]
    fn test_frame_covers_every_location() {
        let (_, map) = map();
        let frame = map.scene().frame;
        assert!(frame.min[0] < -122.68 && frame.max[0] > -122.32);
        assert!(frame.min[1] < 45.52 && frame.max[1] > 47.61);
        assert!(!map.scene().x_axis.is_visible());
    }
}
