//! Stage list assembly.

use crate::config::PreviewConfig;
use crate::stage::{Pass, Stage};
use crate::stages::{
    AttrChannel, GfmSyntax, HeadingAnchors, HeadingSlugs, Highlight, IgnoreBlocks, RawHtml,
    StripReservedMeta,
};

/// Assemble the ordered stage list for one pass: built-ins first, then the
/// caller's extras in caller order.
///
/// The built-in tree order is load-bearing: reserved metadata is stripped
/// before anything else sees the tree, slugs are assigned before anchors
/// reference them, and raw HTML is admitted before comment-reading stages so
/// markers embedded in raw fragments are visible to them.
///
/// Lists are never deduplicated; re-adding a built-in as an extra runs it
/// twice.
#[must_use]
pub fn build_stage_list(pass: Pass, config: &PreviewConfig) -> Vec<Stage> {
    let mut list = match pass {
        Pass::Source => vec![Stage::source(GfmSyntax)],
        Pass::Tree => vec![
            Stage::tree(StripReservedMeta),
            Stage::tree(Highlight::new(config.highlight)),
            Stage::tree(RawHtml),
            Stage::tree(HeadingSlugs),
            Stage::tree(HeadingAnchors),
            Stage::tree(IgnoreBlocks::new(config.ignore_markers.clone())),
            Stage::tree(AttrChannel::new(config.attr_channel.clone())),
        ],
    };
    let extras = match pass {
        Pass::Source => &config.source_stages,
        Pass::Tree => &config.tree_stages,
    };
    list.extend(extras.iter().cloned());
    list
}
