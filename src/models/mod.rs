pub mod row;
pub mod segment;
pub mod series;

pub use row::Row;
pub use segment::{Segment, SegmentId};
pub use series::{LabelSeries, WindowWidth};
