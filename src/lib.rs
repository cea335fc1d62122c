//! # qrgen - Styled QR Code Generator
//!
//! qrgen drives a styled QR code page: the user types text, picks a style,
//! optionally attaches a logo, and downloads the result. It provides:
//!
//! - **Style resolution**: style ids mapped onto dot and corner shapes
//! - **Generation control**: debounced previews, a single in-flight generation,
//!   status text and notifications
//! - **Rendering**: a raster engine on top of the `qrcode` and `image` crates
//! - **Server**: an HTTP host running one controller per browser session
//!
//! ## Quick Start
//!
//! ```no_run
//! use qrgen::{
//!     config::GeneratorConfig,
//!     controller::{Feedback, GenerationController},
//! };
//! use std::time::{Duration, Instant};
//!
//! let mut controller = GenerationController::with_raster(GeneratorConfig::default())?;
//! let now = Instant::now();
//!
//! controller.on_text_input("https://example.com".to_string(), now);
//! controller.set_style("dots", now);
//! controller.generate(Feedback::Full, now);
//!
//! // the success message follows after a short delay
//! controller.poll(now + Duration::from_millis(500));
//! assert_eq!(controller.surface().status, "QR Code Generated!");
//!
//! controller.download();
//! let file = controller.surface_mut().take_saved().unwrap();
//! std::fs::write(&file.file_name, &file.bytes)?;
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`style`] | Style id to shape resolution |
//! | [`controller`] | Generation and download control |
//! | [`engine`] | Rendering engine trait and raster engine |
//! | [`page`] | UI surface trait and in-memory page |
//! | [`server`] | HTTP host |
//! | [`error`] | Error types |

pub mod config;
pub mod controller;
pub mod download;
pub mod engine;
pub mod error;
pub mod logo;
pub mod notify;
pub mod options;
pub mod page;
pub mod server;
pub mod shortcuts;
pub mod style;
pub mod timer;

// Re-exports for convenience
pub use config::GeneratorConfig;
pub use controller::GenerationController;
pub use error::QrGenError;
