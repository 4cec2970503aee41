//! Main application entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use eframe::egui::{self, Context, Sense, Stroke, Vec2};
use parking_lot::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ti_core::{DashboardEvent, EventKind, PanelId};
use ti_data::{CsvSource, DashboardConfig, DataError, DataSource, HttpSource, Record};
use ti_ui::{EditorAction, StatusTone, UiTheme};
use ti_views::Dashboard;

/// Linked-chart analytics dashboard
#[derive(Parser, Debug)]
#[command(name = "touchinsight", version, about)]
struct Cli {
    /// Data endpoint answering `POST {}` with `{"content": [...]}`
    #[arg(long, env = "TOUCHINSIGHT_ENDPOINT")]
    endpoint: Option<String>,

    /// Dashboard configuration file (JSON)
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Built-in dashboard: flights or building
    #[arg(long)]
    preset: Option<String>,

    /// Load records from a CSV file instead of the endpoint
    #[arg(long)]
    csv: Option<PathBuf>,

    #[arg(long, default_value_t = 1200.0)]
    width: f32,

    #[arg(long, default_value_t = 800.0)]
    height: f32,
}

type FetchSlot = Arc<Mutex<Option<Result<Vec<Record>, DataError>>>>;

/// What the status line shows, kept current by dashboard events
#[derive(Debug, Clone, PartialEq)]
enum Status {
    Loading,
    Ready(usize),
    Filtered { rows: usize, matching: usize },
    Failed(String),
}

impl Status {
    fn apply(&mut self, event: &DashboardEvent) {
        *self = match (event, &*self) {
            (DashboardEvent::DataLoaded { row_count, .. }, _) => Status::Ready(*row_count),
            (DashboardEvent::DataLoadFailed { error, .. }, _) => Status::Failed(error.clone()),
            (
                DashboardEvent::FilterChanged { matching, .. },
                Status::Ready(rows) | Status::Filtered { rows, .. },
            ) => Status::Filtered {
                rows: *rows,
                matching: *matching,
            },
            _ => return,
        };
    }
}

/// Keep `status` in step with the events of `dashboard`
fn watch(dashboard: &Dashboard, status: &Arc<Mutex<Status>>) {
    let status = status.clone();
    dashboard.events().subscribe(
        &[EventKind::DataLoaded, EventKind::DataLoadFailed, EventKind::FilterChanged],
        move |event| status.lock().apply(event),
    );
}

/// Main application state
struct DashboardApp {
    dashboard: Dashboard,

    /// Filled by the fetch task, drained on the UI thread
    fetch: FetchSlot,

    source_name: String,

    /// Pick the template from the loaded field names
    auto_template: bool,

    status: Arc<Mutex<Status>>,

    theme: UiTheme,

    /// Keeps the fetch task alive
    _runtime: tokio::runtime::Runtime,
}

impl DashboardApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        dashboard: Dashboard,
        source: Box<dyn DataSource>,
        auto_template: bool,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        let theme = UiTheme::default();
        ti_ui::apply_theme(&cc.egui_ctx, &theme);
        let status = Arc::new(Mutex::new(Status::Loading));
        watch(&dashboard, &status);

        let fetch: FetchSlot = Arc::new(Mutex::new(None));
        let source_name = source.source_name().to_string();
        let sink = fetch.clone();
        let ctx = cc.egui_ctx.clone();
        runtime.spawn(async move {
            let result = source.fetch().await;
            *sink.lock() = Some(result);
            ctx.request_repaint();
        });
        info!("Fetching records from {}", source_name);

        Self {
            dashboard,
            fetch,
            source_name,
            auto_template,
            status,
            theme,
            _runtime: runtime,
        }
    }

    fn poll_fetch(&mut self) {
        let Some(result) = self.fetch.lock().take() else {
            return;
        };

        if let (true, Ok(records)) = (self.auto_template, &result) {
            let fields: Vec<&str> = records.first().map(|r| r.field_names().collect()).unwrap_or_default();
            if let Some(template) = ti_templates::best_match(&fields) {
                info!("Using the '{}' template for {}", template.id, self.source_name);
                let viewport = self.dashboard.layout().content_size();
                match Dashboard::new(template.config, viewport) {
                    Ok(dashboard) => {
                        watch(&dashboard, &self.status);
                        self.dashboard = dashboard;
                    }
                    Err(e) => warn!("Template '{}' rejected: {}", template.id, e),
                }
            }
        }

        self.dashboard.handle_fetch_result(&self.source_name, result);
    }

    fn status_bar(&self, ctx: &Context) {
        egui::TopBottomPanel::top(ti_ui::panel_ids::STATUS).show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong(self.dashboard.config().name.as_str());
                ui.separator();
                let (tone, text) = match &*self.status.lock() {
                    Status::Loading => (StatusTone::Pending, format!("Loading from {}", self.source_name)),
                    Status::Ready(rows) => (StatusTone::Ready, format!("{} records from {}", rows, self.source_name)),
                    Status::Filtered { rows, matching } => {
                        (StatusTone::Ready, format!("{} of {} records match the selection", matching, rows))
                    }
                    Status::Failed(message) => (StatusTone::Failed, format!("Failed to load data: {}", message)),
                };
                ui.colored_label(self.theme.status_color(tone), text);
            });
        });
    }

    fn panels(&mut self, ui: &mut egui::Ui) {
        let content = self.dashboard.layout().content_size();
        let (area, _) = ui.allocate_exact_size(content, Sense::hover());
        let offset = area.min.to_vec2();
        let modifiers = ui.input(|i| i.modifiers);
        let page = ui.input(|i| i.pointer.hover_pos()).unwrap_or_default();
        let border = Stroke::new(1.0, self.theme.palette.axis.linear_multiply(0.4));

        let mut clicks = Vec::new();
        let mut hovered = None;

        for i in 0..self.dashboard.config().panels.len() {
            let panel = PanelId(i);
            let Some(rect) = self.dashboard.panel_rect(panel).map(|r| r.translate(offset)) else {
                continue;
            };
            ui.painter().rect_stroke(rect, 0.0, border);
            let Some(widget) = self.dashboard.visualization(panel) else {
                continue;
            };

            let scene = widget.scene();
            let interaction = ui
                .allocate_ui_at_rect(rect.shrink(4.0), |ui| {
                    if let Some(title) = &scene.title {
                        ui.strong(title.as_str());
                    }
                    // Bar charts taller than their panel scroll
                    egui::ScrollArea::vertical()
                        .id_source(ti_ui::panel_widget_id(panel, "scroll"))
                        .auto_shrink([false, false])
                        .show(ui, |ui| ti_ui::show_scene(ui, ti_ui::panel_widget_id(panel, "plot"), scene))
                        .inner
                })
                .inner;

            if let Some(point) = interaction.clicked {
                clicks.push((panel, point));
            }
            if let Some(point) = interaction.hovered {
                hovered = Some((panel, point));
            }
        }

        for (panel, point) in clicks {
            if let Err(e) = self.dashboard.click(panel, point, page, modifiers) {
                warn!("Click on {} ignored: {}", panel, e);
            }
        }
        match hovered {
            Some((panel, point)) => {
                if let Err(e) = self.dashboard.hover(panel, point, page) {
                    warn!("Hover on {} ignored: {}", panel, e);
                }
            }
            None => self.dashboard.hover_end(),
        }
    }

    fn overlays(&mut self, ctx: &Context) {
        if let Some(tooltip) = self.dashboard.overlay().tooltip() {
            ti_ui::show_tooltip(ctx, tooltip);
        }

        let Some(mut annotation_box) = self.dashboard.overlay().annotation_box().cloned() else {
            return;
        };
        let action = ti_ui::annotation_editor(ctx, &mut annotation_box);
        self.dashboard.set_annotation_draft(annotation_box.draft.clone());
        match action {
            EditorAction::None => {}
            EditorAction::Confirm => {
                self.dashboard.confirm_annotation(&annotation_box.draft);
            }
            EditorAction::Cancel => self.dashboard.cancel_annotation(),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_fetch();
        self.status_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            self.dashboard.resize(available.x, available.y);
            egui::ScrollArea::both()
                .id_source(ti_ui::panel_ids::DASHBOARD)
                .show(ui, |ui| self.panels(ui));
        });

        self.overlays(ctx);
    }
}

fn load_config(cli: &Cli) -> Result<(DashboardConfig, bool)> {
    let (mut config, auto_template) = match (&cli.config, &cli.preset) {
        (Some(path), _) => (DashboardConfig::from_json_file(path)?, false),
        (None, Some(preset)) => {
            let template = ti_templates::find(preset).with_context(|| format!("Unknown preset '{}'", preset))?;
            (template.config, false)
        }
        (None, None) => {
            let template = ti_templates::flights();
            (template.config, cli.csv.is_some())
        }
    };

    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    config.validate()?;
    Ok((config, auto_template))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let (config, auto_template) = load_config(&cli)?;
    info!("Starting dashboard '{}'", config.name);

    let source: Box<dyn DataSource> = match &cli.csv {
        Some(path) => Box::new(CsvSource::new(path).with_null_config(config.null_config.clone())),
        None => Box::new(HttpSource::new(config.endpoint.clone())?),
    };
    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    let dashboard = Dashboard::new(config, Vec2::new(cli.width, cli.height))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([cli.width, cli.height])
            .with_min_inner_size([640.0, 480.0]),
        default_theme: eframe::Theme::Light,
        persist_window: false,
        ..Default::default()
    };

    eframe::run_native(
        "TouchInsight",
        options,
        Box::new(move |cc| Box::new(DashboardApp::new(cc, dashboard, source, auto_template, runtime))),
    )
    .map_err(|e| {
        error!("Application error: {}", e);
        anyhow::anyhow!("Failed to run app: {}", e)
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ti_core::{GlobalQuery, QueryOperator};

    #[test]
    fn test_status_follows_events() {
        let bus = ti_core::EventBus::new();
        let status = Arc::new(Mutex::new(Status::Loading));
        let sink = status.clone();
        bus.subscribe(&[EventKind::DataLoaded, EventKind::FilterChanged], move |e| sink.lock().apply(e));

        let filter = DashboardEvent::FilterChanged {
            panel: PanelId(1),
            query: GlobalQuery {
                index: "origin".into(),
                value: serde_json::json!("SEA"),
                operator: QueryOperator::Equal,
            },
            notified: 2,
            matching: 40,
        };
        // A selection before any data leaves the status alone
        bus.publish(filter.clone());
        assert_eq!(*status.lock(), Status::Loading);

        bus.publish(DashboardEvent::DataLoaded {
            source_name: "test".into(),
            row_count: 100,
            field_count: 3,
        });
        bus.publish(filter);
        assert_eq!(*status.lock(), Status::Filtered { rows: 100, matching: 40 });
    }
}
