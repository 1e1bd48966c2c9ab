/*!
# Portal 3D Engine

Linked-portal rendering and traversal for 3D engines.

Two portals form a pair: looking into one shows what lies behind the other,
and anything passing through one comes out of the other. This crate computes
everything needed for that effect and leaves the actual drawing to a backend
implementing the `Renderer` trait.

## Architecture

- **PortalWorld**: registry of portals and travellers, frame driver
- **Portal**: pose, link, display surface, virtual camera and view texture
- **CrossingTracker**: detects travellers crossing a portal plane
- **Camera / Frustum**: viewer state and visibility culling
- **Oblique clipping**: near plane aligned with the portal plane
- **Renderer / Texture**: backend seam (textures release GPU memory on drop)

All public types live under the `portal3d` namespace.
*/

// Internal modules
mod error;
mod engine;
mod config;
pub mod log;
pub mod math;
pub mod camera;
pub mod renderer;
pub mod portal;

// Main portal3d namespace module
pub mod portal3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton (logging)
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::{PortalConfig, RenderOrder};

    // World and portals
    pub use crate::portal::{
        PortalWorld, Portal, PortalKey, RenderOutcome, FrameStats,
        Traveller, TravellerKey, RigidTraveller, BodyTraveller, PortalEndpoint,
        TeleportEvent,
    };

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Math sub-module
    pub mod math {
        pub use crate::math::*;
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Render sub-module with the backend interface
    pub mod render {
        pub use crate::renderer::*;
    }

    // Portal sub-module with surfaces and crossing detection
    pub mod portal {
        pub use crate::portal::*;
    }
}

// Re-export math library at crate root
pub use glam;
