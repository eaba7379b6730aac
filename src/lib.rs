//! Archive a rendered web page as a self-contained MHTML file or a folder
//! of rewritten assets: walk the DOM, rewrite every referenced URL, and
//! download everything it points at (following CSS `@import`/`url()`
//! chains transitively).

#[macro_use]
pub mod logger;

pub mod cli;
pub mod coordinator;
pub mod core;
pub mod css;
pub mod dom;
pub mod download;
pub mod writer;
