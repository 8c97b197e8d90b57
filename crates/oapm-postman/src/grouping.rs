use std::collections::BTreeMap;

use oapm_core::config::FolderStrategy;

use crate::items::PostmanOperation;

/// Bucket for operations without tags.
pub const DEFAULT_TAG: &str = "default";

/// Processed operations, either in per-tag folders or in one flat list.
/// Every bucket stays sorted by path.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationGroups {
    Tags(BTreeMap<String, Vec<PostmanOperation>>),
    Paths(Vec<PostmanOperation>),
}

impl OperationGroups {
    pub fn new(strategy: FolderStrategy) -> Self {
        match strategy {
            FolderStrategy::Tags => OperationGroups::Tags(BTreeMap::new()),
            FolderStrategy::Paths => OperationGroups::Paths(Vec::new()),
        }
    }

    /// Add an operation to its bucket (first tag, or `default`), keeping the
    /// bucket ordered by path. Operations with equal paths keep arrival order.
    pub fn insert(&mut self, op: PostmanOperation) {
        let bucket = match self {
            OperationGroups::Tags(groups) => {
                let key = op
                    .tags
                    .first()
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_TAG.to_string());
                groups.entry(key).or_default()
            }
            OperationGroups::Paths(list) => list,
        };
        bucket.push(op);
        bucket.sort_by(|a, b| a.path.cmp(&b.path));
    }

    /// Number of operations across all buckets.
    pub fn len(&self) -> usize {
        match self {
            OperationGroups::Tags(groups) => groups.values().map(Vec::len).sum(),
            OperationGroups::Paths(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Buckets in order, the flat list being a single unnamed bucket.
    pub fn buckets(&self) -> Vec<(Option<&str>, &[PostmanOperation])> {
        match self {
            OperationGroups::Tags(groups) => groups
                .iter()
                .map(|(tag, ops)| (Some(tag.as_str()), ops.as_slice()))
                .collect(),
            OperationGroups::Paths(list) => vec![(None, list.as_slice())],
        }
    }
}

#[cfg(test)]
mod tests {
    use oapm_core::model::HttpMethod;

    use super::*;

    fn op(name: &str, path: &str, tags: &[&str]) -> PostmanOperation {
        PostmanOperation {
            name: name.to_string(),
            description: None,
            method: HttpMethod::Get,
            path: path.to_string(),
            path_segments: Vec::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            headers: Vec::new(),
            query: Vec::new(),
            path_variables: Vec::new(),
            requests: Vec::new(),
            responses: Vec::new(),
        }
    }

    fn paths(ops: &[PostmanOperation]) -> Vec<&str> {
        ops.iter().map(|o| o.path.as_str()).collect()
    }

    #[test]
    fn test_tag_buckets_sorted_by_path() {
        let mut groups = OperationGroups::new(FolderStrategy::Tags);
        groups.insert(op("c", "/users/:id", &["Users"]));
        groups.insert(op("a", "/accounts", &["Accounts", "Users"]));
        groups.insert(op("b", "/users", &["Users"]));
        groups.insert(op("d", "/health", &[]));

        let OperationGroups::Tags(ref buckets) = groups else {
            panic!("expected tag buckets");
        };
        let keys: Vec<&String> = buckets.keys().collect();
        assert_eq!(keys, vec!["Accounts", "Users", "default"]);
        assert_eq!(paths(&buckets["Users"]), vec!["/users", "/users/:id"]);
        assert_eq!(paths(&buckets["default"]), vec!["/health"]);
        assert_eq!(groups.len(), 4);
    }

    #[test]
    fn test_flat_list_sorted_and_stable() {
        let mut groups = OperationGroups::new(FolderStrategy::Paths);
        groups.insert(op("post", "/b", &["X"]));
        groups.insert(op("get", "/a", &[]));
        groups.insert(op("delete", "/b", &["Y"]));

        let OperationGroups::Paths(ref list) = groups else {
            panic!("expected flat list");
        };
        assert_eq!(paths(list), vec!["/a", "/b", "/b"]);
        let names: Vec<&str> = list.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["get", "post", "delete"]);
    }

    #[test]
    fn test_buckets_view() {
        let mut groups = OperationGroups::new(FolderStrategy::Paths);
        assert!(groups.is_empty());
        groups.insert(op("get", "/a", &[]));
        let buckets = groups.buckets();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].0, None);
    }
}
