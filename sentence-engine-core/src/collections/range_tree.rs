/// An item placed on the position axis.
///
/// The item covers the half-open range `[position_min, position_max)`.
/// An item whose range is empty can never be found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeItem<T> {
	pub item: T,
	pub position_min: u64,
	pub position_max: u64,
}

/// A node of the range tree.
///
/// Every item in the left subtree sits before this node's range and every
/// item in the right subtree sits after it.
#[derive(Clone, Debug)]
pub struct TreeNode<T> {
	item: TreeItem<T>,
	left: Option<Box<TreeNode<T>>>,
	right: Option<Box<TreeNode<T>>>,
}

impl<T> TreeNode<T> {
	/// Builds a balanced subtree from items sorted by position.
	///
	/// The index range is split at its midpoint (rounded down) at each
	/// level, so the shape only depends on the number of items, never on
	/// their weights.
	///
	/// Returns `None` when `items` is empty.
	pub fn create(mut items: Vec<TreeItem<T>>) -> Option<Box<Self>> {
		if items.is_empty() {
			return None;
		}

		let middle = (items.len() - 1) / 2;
		let right = items.split_off(middle + 1);
		let item = items.pop()?;

		Some(Box::new(Self {
			item,
			left: Self::create(items),
			right: Self::create(right),
		}))
	}

	/// Returns the item whose range contains `position`.
	///
	/// Walks down from this node, going left when the position is before the
	/// current range and right when it is at or after its end.
	pub fn find(&self, position: u64) -> Option<&T> {
		let mut node = self;
		loop {
			if position < node.item.position_min {
				node = node.left.as_deref()?;
			} else if position >= node.item.position_max {
				node = node.right.as_deref()?;
			} else {
				return Some(&node.item.item);
			}
		}
	}

	/// Number of nodes in this subtree.
	pub fn count(&self) -> usize {
		1 + self.left.as_ref().map_or(0, |node| node.count()) + self.right.as_ref().map_or(0, |node| node.count())
	}

	/// Number of nodes on the longest root-to-leaf path.
	pub fn max_depth(&self) -> usize {
		let left = self.left.as_ref().map_or(0, |node| node.max_depth());
		let right = self.right.as_ref().map_or(0, |node| node.max_depth());
		1 + left.max(right)
	}
}

/// Balanced binary search tree over cumulative weight ranges.
///
/// Each weighted item is laid out on a position axis, one after the other,
/// with a range as wide as its weight:
///
/// ```text
/// a(1) b(4) c(2) d(1)  =>  a:[0,1) b:[1,5) c:[5,7) d:[7,8)
/// ```
///
/// Finding the item at a position is then an `O(log n)` descent instead of
/// a linear scan over the running sum.
///
/// # Invariants
/// - Ranges are contiguous and follow the insertion order
/// - `max_position` is the sum of all weights
#[derive(Clone, Debug)]
pub struct RangeTree<T> {
	root: Option<Box<TreeNode<T>>>,
	max_position: u64,
}

impl<T> RangeTree<T> {
	/// Lays out `(item, weight)` pairs in the given order and builds the tree.
	pub fn create<I>(items: I) -> Self
	where
		I: IntoIterator<Item = (T, u64)>,
	{
		let mut current_position = 0;
		let tree_items: Vec<TreeItem<T>> = items
			.into_iter()
			.map(|(item, weight)| {
				let next_position = current_position + weight;
				let tree_item = TreeItem {
					item,
					position_min: current_position,
					position_max: next_position,
				};
				current_position = next_position;
				tree_item
			})
			.collect();

		Self {
			root: TreeNode::create(tree_items),
			max_position: current_position,
		}
	}

	/// Returns the item covering `position`, or `None` when the position is
	/// outside `[0, max_position)`.
	pub fn find(&self, position: u64) -> Option<&T> {
		self.root.as_ref()?.find(position)
	}

	/// End of the last range, i.e. the total weight.
	pub fn max_position(&self) -> u64 {
		self.max_position
	}

	/// Number of items stored in the tree.
	pub fn count(&self) -> usize {
		self.root.as_ref().map_or(0, |node| node.count())
	}

	/// Depth of the tree (0 when empty).
	pub fn max_depth(&self) -> usize {
		self.root.as_ref().map_or(0, |node| node.max_depth())
	}
}
