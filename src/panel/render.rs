use std::collections::BTreeMap;
use serde::Serialize;

use crate::panel::board::StockPanel;
use crate::panel::fields::{Field, NEWS_SLOTS};

/// Rendered in place of a field whose upstream value was missing.
pub const ABSENT_MARKER: &str = "N/A";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewsSlot {
    pub title: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PanelView {
    pub key: String,
    pub ticker: String,
    pub expanded: bool,
    /// Only fields that have been written; a pending fetch leaves them out.
    pub fields: BTreeMap<String, String>,
    pub news: Vec<NewsSlot>,
}

fn display(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| ABSENT_MARKER.to_string())
}

pub fn render_panel(panel: &StockPanel) -> PanelView {
    let fields = panel
        .fields
        .iter()
        .filter(|(field, _)| !field.is_news())
        .map(|(field, value)| (field.key(), display(value)))
        .collect();

    let news = (0..NEWS_SLOTS)
        .filter_map(|i| {
            let title = panel.field(Field::NewsTitle(i))?;
            let url = panel.field(Field::NewsLink(i)).cloned().flatten();
            Some(NewsSlot { title: display(title), url })
        })
        .collect();

    PanelView {
        key: panel.key.clone(),
        ticker: panel.ticker.clone(),
        expanded: panel.expanded,
        fields,
        news,
    }
}
