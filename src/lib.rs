pub use input;
pub use rose_platform as platform;

pub mod prelude {
    pub use eyre::{Context, Result};
    pub use glam::*;
    pub use tracing::{self, debug, error, info, trace, warn};

    pub use input::*;
    pub use rose_platform::prelude::*;
}
