//! # Messages & View Model
//!
//! User-facing text for each failure kind and the data the try-on page
//! renders around the canvas.
//!
//! The storefront ships in Spanish; English is available for other
//! deployments.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, DeviceErrorKind, ErrorKind};
use crate::state::SessionState;
use crate::types::{Product, TryOnTarget};

// =============================================================================
// Locale
// =============================================================================

/// Language of user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::Es => write!(f, "es"),
            Locale::En => write!(f, "en"),
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "es" | "es-es" | "spanish" => Ok(Locale::Es),
            "en" | "en-us" | "en-gb" | "english" => Ok(Locale::En),
            other => Err(CoreError::UnsupportedLocale(other.to_string())),
        }
    }
}

// =============================================================================
// Failure Messages
// =============================================================================

impl ErrorKind {
    /// Short message shown in place of the camera feed.
    ///
    /// A missing camera at probe time and a camera that vanished before
    /// acquisition read the same to the user.
    pub fn user_message(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::Es, ErrorKind::NoCamera)
            | (Locale::Es, ErrorKind::Device { device: DeviceErrorKind::NotFound }) => {
                "No se encontró ninguna cámara en el dispositivo."
            }
            (Locale::Es, ErrorKind::Device { device: DeviceErrorKind::Denied }) => {
                "Acceso a la cámara denegado. Por favor, permite el acceso a la cámara."
            }
            (Locale::Es, ErrorKind::Device { device: DeviceErrorKind::Busy }) => {
                "La cámara está siendo utilizada por otra aplicación."
            }
            (Locale::Es, ErrorKind::Initialization { surface_binding: true }) => {
                "Error de inicialización del canvas. Por favor, recarga la página."
            }
            (Locale::Es, ErrorKind::Initialization { surface_binding: false }) => {
                "Error al inicializar la experiencia AR."
            }
            (Locale::Es, ErrorKind::AssetLoad) => {
                "No se pudo cargar el efecto AR para este producto."
            }
            (Locale::Es, ErrorKind::Unknown) => "Error al inicializar la cámara.",

            (Locale::En, ErrorKind::NoCamera)
            | (Locale::En, ErrorKind::Device { device: DeviceErrorKind::NotFound }) => {
                "No camera was found on this device."
            }
            (Locale::En, ErrorKind::Device { device: DeviceErrorKind::Denied }) => {
                "Camera access was denied. Please allow camera access in your settings."
            }
            (Locale::En, ErrorKind::Device { device: DeviceErrorKind::Busy }) => {
                "The camera is being used by another application."
            }
            (Locale::En, ErrorKind::Initialization { surface_binding: true }) => {
                "The canvas could not be initialized. Please reload the page."
            }
            (Locale::En, ErrorKind::Initialization { surface_binding: false }) => {
                "The AR experience could not be initialized."
            }
            (Locale::En, ErrorKind::AssetLoad) => "The AR effect for this product could not be loaded.",
            (Locale::En, ErrorKind::Unknown) => "The camera could not be initialized.",
        }
    }
}

// =============================================================================
// View Model
// =============================================================================

const PRODUCTS_ROUTE: &str = "/productos";

/// Everything the try-on page shows besides the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TryOnView {
    /// Header title.
    pub title: String,

    /// Where "back" goes.
    pub back_href: String,

    /// "Buy" link, only when a product was resolved.
    pub buy_href: Option<String>,

    /// Failure message replacing the canvas.
    pub error_message: Option<String>,

    /// Whether the canvas should be mounted at all.
    pub show_canvas: bool,
}

impl TryOnView {
    /// Derives the view from what the session knows.
    ///
    /// `product` is the resolved record, `None` for generic try-on or when
    /// the lookup fell back.
    pub fn derive(product: Option<&Product>, state: &SessionState, locale: Locale) -> Self {
        let title = match (product, locale) {
            (Some(p), _) => p.name.clone(),
            (None, Locale::Es) => "Experiencia AR".to_string(),
            (None, Locale::En) => "AR Experience".to_string(),
        };

        let product_href = product.map(|p| format!("{}/{}", PRODUCTS_ROUTE, p.id));
        let error_message = state
            .error_kind()
            .map(|kind| kind.user_message(locale).to_string());

        TryOnView {
            title,
            back_href: product_href
                .clone()
                .unwrap_or_else(|| PRODUCTS_ROUTE.to_string()),
            buy_href: product_href,
            show_canvas: error_message.is_none() && !state.is_terminal(),
            error_message,
        }
    }

    /// Link to the try-on page for a target (`/ar/:productId`).
    pub fn try_on_href(target: &TryOnTarget) -> String {
        match target {
            TryOnTarget::Featured => format!("/ar/{}", crate::FEATURED_TARGET),
            TryOnTarget::Product(id) => format!("/ar/{}", id),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
