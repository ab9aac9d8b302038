//! Output rendering.

pub mod html;

pub use html::render_dashboard_html;
