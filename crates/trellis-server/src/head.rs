//! Head-block collection over a resolved chain.

use trellis_core::{sort_head_blocks, ComponentContext, HeadBlock, SortedHeadBlocks};

use crate::resolver::ResolvedPath;

/// Collects head blocks for one resolved chain: framework defaults first,
/// then each rendered depth's blocks, shallowest to deepest, so deeper routes
/// win under the later-declaration-wins dedup rules.
///
/// Depths truncated by a loader-time error boundary contribute nothing.
pub fn collect_head(defaults: &[HeadBlock], resolved: &ResolvedPath) -> SortedHeadBlocks {
	let data = &resolved.data;
	let rendered_depths = match data.outermost_error_boundary_index {
		Some(boundary) => boundary + 1,
		None => data.len(),
	};

	let mut blocks = defaults.to_vec();
	for depth in 0..rendered_depths {
		let ctx = ComponentContext {
			depth,
			loader_data: data.active_data[depth].as_ref(),
			action_data: data.action_data[depth].as_ref(),
			params: &data.params,
			splat_segments: &data.splat_segments,
		};
		blocks.extend(resolved.modules[depth].head(&ctx));
	}
	sort_head_blocks(&blocks)
}
