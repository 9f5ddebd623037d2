pub mod capture;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod format;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod report;
pub mod tables;
pub mod text_metrics;
pub mod theme;

pub use capture::{CaptureError, RasterImage, Rasterizer, ResvgRasterizer, sanitize_for_capture};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, DiagramConfig, RenderConfig, ReportConfig, load_config};
pub use ir::{ChartDocument, ChartInput, ChartKind, ChartResult, HouseCusp, PlanetPlacement};
pub use layout::{ChartLayout, DiagramLayout, DiagramStyle, RegionKey, RegionLayout, compute_layout};
pub use render::{CHART_REGION_MARKER, RenderedView, render_svg};
pub use report::{
    DiagramHost, ExportClock, ExportOutcome, ReportError, assemble_report, export_chart,
    export_file_name,
};
pub use tables::{TableData, TableMode, chart_tables};
pub use theme::Theme;
