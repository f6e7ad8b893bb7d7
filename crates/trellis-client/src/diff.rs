//! Import-list diffing.
//!
//! Navigation cost is bounded by the number of nested segments that actually
//! changed: an index whose import URL is unchanged keeps its already-resolved
//! module, and only changed or newly appearing indices trigger a dynamic
//! import. Old entries past the new list's length are simply dropped.

/// Returns the indices of `new` that need a (re)import, in ascending order.
pub fn changed_indices(old: &[String], new: &[String]) -> Vec<usize> {
	(0..new.len())
		.filter(|&index| old.get(index) != Some(&new[index]))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn urls(raw: &[&str]) -> Vec<String> {
		raw.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn test_appended_segment_is_the_only_change() {
		let old = urls(&["/a.js", "/b.js"]);
		let new = urls(&["/a.js", "/b.js", "/c.js"]);
		assert_eq!(changed_indices(&old, &new), vec![2]);
	}

	#[test]
	fn test_identical_lists_change_nothing() {
		let old = urls(&["/a.js", "/b.js"]);
		assert_eq!(changed_indices(&old, &old), Vec::<usize>::new());
	}

	#[test]
	fn test_midpoint_swap_reimports_only_that_index() {
		let old = urls(&["/a.js", "/b.js", "/c.js"]);
		let new = urls(&["/a.js", "/x.js", "/c.js"]);
		assert_eq!(changed_indices(&old, &new), vec![1]);
	}

	#[test]
	fn test_shrinking_chain_imports_nothing() {
		let old = urls(&["/a.js", "/b.js", "/c.js"]);
		let new = urls(&["/a.js"]);
		assert_eq!(changed_indices(&old, &new), Vec::<usize>::new());
	}

	#[test]
	fn test_empty_previous_list_imports_everything() {
		let new = urls(&["/a.js", "/b.js"]);
		assert_eq!(changed_indices(&[], &new), vec![0, 1]);
	}
}
