pub mod aggregator;
pub mod colormap;
pub mod dataset;
pub mod palettes;
pub mod selection;
pub mod session;

pub use aggregator::{Aggregator, FilteredView};
pub use colormap::{ColorLegend, ColorMapper, LegendStop};
pub use dataset::{Dataset, DatasetExtrema};
pub use palettes::{palette_names, Palette, DEFAULT_PALETTE};
pub use selection::{FilterRequest, RelativeWindow, SelectionState, TimeWindow, ValueRange};
pub use session::Session;
