//! # topostamp-renderer
//!
//! Tera-based template renderer: binds an [`InstanceContext`] into a template
//! and returns the rendered text. Rendering is pure; loading the template
//! library from search locations happens once, when the [`Renderer`] is built.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use topostamp_core::types::{InstanceContext, TemplateFile};
//! use topostamp_renderer::Renderer;
//!
//! fn render_one(template: &TemplateFile, ctx: &InstanceContext) {
//!     if let Ok(renderer) = Renderer::standalone(std::slice::from_ref(template)) {
//!         if let Ok(text) = renderer.render(template, ctx) {
//!             println!("{}: {} bytes", template.path.display(), text.len());
//!         }
//!     }
//! }
//! ```
//!
//! [`InstanceContext`]: topostamp_core::types::InstanceContext

pub mod context;
pub mod engine;
pub mod error;

pub use context::to_tera_context;
pub use engine::{render, Renderer};
pub use error::RenderError;
