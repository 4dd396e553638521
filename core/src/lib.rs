pub mod cache;
pub mod config;
pub mod hover;
pub mod link;
pub mod lookup;
pub mod placement;
pub mod sequencer;
pub mod settings;

pub use cache::PreviewCache;
pub use config::{ConfigKey, HoverTiming, PreviewConfig};
pub use hover::{HoverCommand, HoverController, HoverPhase};
pub use link::{document_path, resolve_link, LinkError, LinkPolicy, RelativeLinks};
pub use lookup::{decode_preview, preview_url, LookupError, PreviewPayload};
pub use placement::{place_overlay, Placement, PlacementConfig, Rect, Side, Viewport};
pub use sequencer::{RequestId, RequestSequencer};
pub use settings::{FontSize, ReaderSettings, ThemeMode};
