pub mod audio;
pub mod error;
pub mod examples;
pub mod favorite;
pub mod gateway;
pub mod lookup;
pub mod popover;
pub mod preprocess;
pub mod settings;
pub mod view;

pub use error::{ActionError, GatewayError, SettingsError};
pub use gateway::{GatewayPlayback, MessageGateway, PlaybackSurface};
pub use lookup::LookupState;
pub use popover::{
    Command, Notice, Output, Popover, PopoverClosed, PopoverDeps, PopoverHandle, PopoverOptions,
};
pub use settings::{SettingsStore, Subscription};
pub use view::View;
