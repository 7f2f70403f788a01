pub mod board;
pub mod factory;
pub mod fields;
pub mod render;

pub use board::{ExchangeVolume, FieldValue, PanelBoard};
pub use factory::{panel_key, StockPanelFactory};
pub use fields::{Field, NEWS_SLOTS};
pub use render::{render_panel, PanelView};
