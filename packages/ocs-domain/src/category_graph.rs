//! Hierarchical category graph rebuilt from the flat `categoryPath` facet.
//!
//! Facet values are full paths such as `1.bcs.Men's Clothing`. Every path prefix becomes a
//! node whose id is the prefix itself and whose name is its last segment.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Filter, FilterQuery};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGraphNode {
	pub id: String,
	pub name: String,
	pub count: u64,
	/// Id of the parent node, `None` for top-level nodes.
	pub parent_id: Option<String>,
	pub children: Vec<CategoryGraphNode>,
}
impl CategoryGraphNode {
	/// Depth-first search for `id` in this subtree.
	pub fn find(&self, id: &str) -> Option<&CategoryGraphNode> {
		if self.id == id {
			return Some(self);
		}

		self.children.iter().find_map(|child| child.find(id))
	}
}

pub fn find<'a>(nodes: &'a [CategoryGraphNode], id: &str) -> Option<&'a CategoryGraphNode> {
	nodes.iter().find_map(|node| node.find(id))
}

#[derive(Debug)]
struct Slot {
	id: String,
	name: String,
	count: u64,
	parent: Option<usize>,
	children: Vec<usize>,
}

#[derive(Debug)]
pub struct CategoryGraphBuilder {
	separator: String,
	depth_limit: u32,
	slots: Vec<Slot>,
	roots: Vec<usize>,
	by_id: HashMap<String, usize>,
}
impl CategoryGraphBuilder {
	/// A depth limit of zero or a blank separator disables pruning. A blank separator
	/// falls back to ".".
	pub fn new(depth_limit: u32, separator: &str) -> Self {
		let blank = separator.trim().is_empty();

		Self {
			separator: if blank { ".".to_string() } else { separator.to_string() },
			depth_limit: if blank { 0 } else { depth_limit },
			slots: Vec::new(),
			roots: Vec::new(),
			by_id: HashMap::new(),
		}
	}

	/// Full path carried by a facet filter: its own clause's value, else its display name.
	pub fn filter_path(filter: &Filter) -> String {
		FilterQuery::parse(&filter.filter_query)
			.map(|filter_query| filter_query.unescaped_expression())
			.unwrap_or_else(|_| filter.name.clone())
	}

	pub fn is_pruned(&self, path: &str) -> bool {
		self.depth_limit > 0 && path.matches(self.separator.as_str()).count() > self.depth_limit as usize
	}

	/// Inserts a filter's path. Returns false when the path exceeds the depth limit.
	pub fn add_filter(&mut self, filter: &Filter) -> bool {
		let path = Self::filter_path(filter);

		self.add_path(&path, filter.count)
	}

	pub fn add_path(&mut self, path: &str, count: u64) -> bool {
		if path.is_empty() || self.is_pruned(path) {
			return false;
		}

		let separator = self.separator.clone();
		let mut parent: Option<usize> = None;
		let mut prefix = String::with_capacity(path.len());

		for (depth, segment) in path.split(separator.as_str()).enumerate() {
			if depth > 0 {
				prefix.push_str(&separator);
			}
			prefix.push_str(segment);

			let index = match self.by_id.get(&prefix) {
				Some(index) => *index,
				None => self.insert(prefix.clone(), segment.to_string(), parent),
			};

			parent = Some(index);
		}

		if let Some(index) = parent {
			self.slots[index].count += count;
		}

		true
	}

	fn insert(&mut self, id: String, name: String, parent: Option<usize>) -> usize {
		let index = self.slots.len();

		self.slots.push(Slot { id: id.clone(), name, count: 0, parent, children: Vec::new() });
		self.by_id.insert(id, index);

		match parent {
			Some(parent) => self.slots[parent].children.push(index),
			None => self.roots.push(index),
		}

		index
	}

	pub fn build(&self) -> Vec<CategoryGraphNode> {
		self.roots.iter().map(|index| self.node(*index)).collect()
	}

	fn node(&self, index: usize) -> CategoryGraphNode {
		let slot = &self.slots[index];

		CategoryGraphNode {
			id: slot.id.clone(),
			name: slot.name.clone(),
			count: slot.count,
			parent_id: slot.parent.map(|parent| self.slots[parent].id.clone()),
			children: slot.children.iter().map(|child| self.node(*child)).collect(),
		}
	}

	/// Children of the node with `id`, or the top-level nodes when no id is given.
	/// Empty when the id is unknown, which is expected for leaf categories.
	pub fn graph_for(&self, id: Option<&str>) -> Vec<CategoryGraphNode> {
		let Some(id) = id.filter(|id| !id.trim().is_empty()) else {
			return self.build();
		};

		match self.by_id.get(id) {
			Some(index) => {
				self.slots[*index].children.iter().map(|child| self.node(*child)).collect()
			},
			None => {
				tracing::debug!(category_id = id, "Category graph is empty for category.");

				Vec::new()
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::CategoryGraphBuilder;

	#[test]
	fn intermediate_nodes_are_created_with_zero_count() {
		let mut builder = CategoryGraphBuilder::new(0, ".");
		assert!(builder.add_path("1.bcs.Jackets", 7));
		let graph = builder.build();
		assert_eq!(graph.len(), 1);
		assert_eq!(graph[0].count, 0);
		assert_eq!(graph[0].children[0].id, "1.bcs");
		assert_eq!(graph[0].children[0].children[0].name, "Jackets");
		assert_eq!(graph[0].children[0].children[0].count, 7);
		assert_eq!(graph[0].children[0].children[0].parent_id.as_deref(), Some("1.bcs"));
	}

	#[test]
	fn repeated_paths_accumulate_counts() {
		let mut builder = CategoryGraphBuilder::new(0, ".");
		builder.add_path("1.bcs", 2);
		builder.add_path("1.bcs", 3);
		let graph = builder.build();
		assert_eq!(graph[0].children.len(), 1);
		assert_eq!(graph[0].children[0].count, 5);
	}

	#[test]
	fn multi_character_separator_builds_nested_nodes() {
		let mut builder = CategoryGraphBuilder::new(2, " > ");
		assert!(builder.add_path("1 > bcs > Jackets", 4));
		assert!(!builder.add_path("1 > bcs > Jackets > Rain", 1));
		let children = builder.graph_for(Some("1 > bcs"));
		assert_eq!(children.len(), 1);
		assert_eq!(children[0].id, "1 > bcs > Jackets");
		assert_eq!(children[0].name, "Jackets");
		assert_eq!(children[0].count, 4);
	}

	#[test]
	fn blank_separator_disables_pruning() {
		let mut builder = CategoryGraphBuilder::new(1, "");
		assert!(builder.add_path("1.a.b.c", 1));
	}
}
