//! Asset injection subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     assets.rs reads custom.css + custom.js once
//!     → InjectionPayload (immutable, shared via Arc)
//!
//! Per HTML response:
//!     rewrite.rs splices the payload into the buffered document
//!     → style block before the first </head>
//!     → script block before the first </body>
//! ```

pub mod assets;
pub mod rewrite;

pub use assets::{AssetError, InjectionPayload};
pub use rewrite::inject;
