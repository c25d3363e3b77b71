//! The output CSS tree: an arena of [`node::CssNode`]s with parent
//! back-edges, media-query merging, and the two-pass text/source-map
//! serializer (§3, §4.6).

mod arena;
mod at_root;
mod colors;
mod keyframes;
mod media;
mod node;
mod serializer;

pub use arena::{CssTree, NodeId};
pub use at_root::{parse_at_root_query, AtRootQuery};
pub use keyframes::parse_keyframe_selector;
pub use media::{merge_lists as merge_media_queries, parse_media_query_list, MediaMerge, MediaQuery};
pub use node::CssNode;
pub use serializer::{format_value, serialize, LineFeed, OutputStyle, SerializeOptions, SerializeOutput};
