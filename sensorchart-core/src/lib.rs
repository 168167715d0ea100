pub mod channels;
pub mod chart;
pub mod config;
pub mod registry;
pub mod session;
pub mod store;
pub mod visibility;
pub mod window;

pub use channels::{
    transform, transform_sensors, AxisId, ChannelCatalog, ChannelDefinition, ChannelGroup,
    ChannelPoint, ChannelSeries, Color, SensorBundle,
};
pub use chart::{axis_config, AxisConfig, AxisPosition, ChartFrame, FrameStatus, OverviewFrame};
pub use config::{ChartConfig, ConfigError};
pub use registry::{SelectionChange, SelectionStatus, SensorRegistry};
pub use session::{ChartSession, SessionOptions};
pub use store::{FileSelectionStore, MemorySelectionStore, SelectionStore, StoreError};
pub use visibility::{GroupState, VisibilityController};
pub use window::{filter, Clock, FixedClock, SystemClock, WindowSelector, WindowTable};
