use crate::layout::{ChartLayout, DiagramLayout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub diagrams: Vec<DiagramDump>,
}

#[derive(Debug, Serialize)]
pub struct DiagramDump {
    pub style: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub regions: Vec<RegionDump>,
}

#[derive(Debug, Serialize)]
pub struct RegionDump {
    pub key: String,
    pub heading: Option<String>,
    pub label: String,
    pub planets: Vec<String>,
    pub row: usize,
    pub col: usize,
    pub anchor: [f32; 2],
    pub outline: Vec<[f32; 2]>,
}

impl DiagramDump {
    fn from_diagram(diagram: &DiagramLayout) -> Self {
        let regions = diagram
            .regions
            .iter()
            .map(|region| RegionDump {
                key: region.key.to_string(),
                heading: region.heading.clone(),
                label: region.label.clone(),
                planets: region.planets.clone(),
                row: region.row,
                col: region.col,
                anchor: [region.anchor.0, region.anchor.1],
                outline: region.outline.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();
        DiagramDump {
            style: format!("{:?}", diagram.style),
            x: diagram.x,
            y: diagram.y,
            size: diagram.size,
            regions,
        }
    }
}

impl LayoutDump {
    pub fn from_layout(layout: &ChartLayout) -> Self {
        LayoutDump {
            width: layout.width,
            height: layout.height,
            diagrams: layout
                .diagrams()
                .iter()
                .map(|diagram| DiagramDump::from_diagram(diagram))
                .collect(),
        }
    }
}

pub fn layout_dump_json(layout: &ChartLayout) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_layout(layout))?)
}

pub fn write_layout_dump(path: &Path, layout: &ChartLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiagramConfig;
    use crate::ir::{ChartResult, PlanetPlacement};
    use crate::layout::compute_layout;

    #[test]
    fn dump_lists_regions_of_both_styles() {
        let chart = ChartResult {
            planets: Some(vec![PlanetPlacement::new("Moon", "Taurus", 2)]),
            ..Default::default()
        };
        let layout = compute_layout(&chart, &DiagramConfig::default());
        let json = layout_dump_json(&layout).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["diagrams"][0]["style"], "NorthIndian");
        assert_eq!(value["diagrams"][1]["regions"][1]["key"], "sign-taurus");
        assert_eq!(value["diagrams"][1]["regions"][1]["planets"][0], "Mo");
        assert_eq!(value["diagrams"][0]["regions"][1]["key"], "house-2");
    }
}
