//! Built-in pipeline stages.

mod anchors;
mod attrs;
mod gfm;
mod highlight;
mod ignore;
mod meta;
mod raw;
mod slug;

pub use anchors::HeadingAnchors;
pub use attrs::AttrChannel;
pub use gfm::GfmSyntax;
pub use highlight::Highlight;
pub use ignore::IgnoreBlocks;
pub use meta::StripReservedMeta;
pub use raw::RawHtml;
pub use slug::HeadingSlugs;
