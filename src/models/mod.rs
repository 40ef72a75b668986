pub mod display;
pub mod relay;
pub mod window_placement;

pub use display::DisplayBounds;
pub use relay::{RelayRequest, RelayResponse};
pub use window_placement::{Point, WidgetPosition, WidgetSize};
