//! Styling and interactive HTML rendering of lineage graphs

pub mod assets;
pub mod html;
pub mod style;


#[cfg(test)]
pub mod test_utils;

pub use html::{RenderError, RenderOptions, render_html, write_html};
pub use style::{ColorBy, Layout};
