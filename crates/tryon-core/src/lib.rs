//! # tryon-core: Pure Types for the AR Try-On Session
//!
//! Everything the try-on engine and the web view agree on, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          tryon Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web View (try-on page)                       │   │
//! │  │      <canvas> ──► status banner ──► back / buy links            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ mount / unmount                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              tryon-session (TryOnController)                    │   │
//! │  │      probe ──► acquire ──► load lens ──► apply ──► release      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tryon-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   state   │  │   error   │  │ messages  │  │   │
//! │  │   │  Product  │  │SessionSta-│  │ ErrorKind │  │  Locale   │  │   │
//! │  │   │ EffectRef │  │ te + table│  │ CoreError │  │ TryOnView │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DEVICES • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product record, effect identifiers, try-on target
//! - [`state`] - Session lifecycle states and the transition table
//! - [`error`] - Failure taxonomy and domain errors
//! - [`messages`] - User-facing messages and the view model
//!
//! ## Example Usage
//!
//! ```rust
//! use tryon_core::{ErrorKind, Locale, SessionState};
//!
//! let state = SessionState::Idle;
//! assert!(state.can_transition_to(&SessionState::ProbingCapability));
//! assert!(!state.can_transition_to(&SessionState::Streaming));
//!
//! let message = ErrorKind::NoCamera.user_message(Locale::En);
//! assert_eq!(message, "No camera was found on this device.");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod messages;
pub mod state;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, DeviceErrorKind, ErrorKind};
pub use messages::{Locale, TryOnView};
pub use state::SessionState;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Lens applied when the target product carries no lens of its own.
///
/// Generic try-on (the `featured` route) always resolves to this lens.
pub const DEFAULT_EFFECT_ID: &str = "967302b9-f409-48d8-b310-0141b6c51425";

/// Lens group that [`DEFAULT_EFFECT_ID`] belongs to.
pub const DEFAULT_EFFECT_GROUP_ID: &str = "5b40ca22-8160-4210-8bbd-c2ac69befd8d";

/// Route placeholder meaning "no specific product".
pub const FEATURED_TARGET: &str = "featured";

/// Document store collection holding product records.
pub const PRODUCTS_COLLECTION: &str = "products";
