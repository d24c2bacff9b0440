//! Site-specific extractors
//!
//! One module per supported site. Each builds its CSS selectors once at
//! construction and implements [`NewsSource`](crate::crawler::source::NewsSource)
//! over raw page bodies.

mod aif;
mod rt;
mod svpressa;

pub use aif::AifRu;
pub use rt::RtRu;
pub use svpressa::SvpressaRu;

use crate::crawler::source::NewsSource;
use crate::error::{Error, Result};
use scraper::Selector;

/// Build every supported source, in crawl order
pub fn all_sources() -> Result<Vec<Box<dyn NewsSource>>> {
    Ok(vec![
        Box::new(AifRu::new()?),
        Box::new(RtRu::new()?),
        Box::new(SvpressaRu::new()?),
    ])
}

/// Compile a CSS selector, mapping parse failures into our error type
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::config(format!("invalid selector {css:?}: {e}")))
}

/// Joined trimmed text of an element
pub(crate) fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
