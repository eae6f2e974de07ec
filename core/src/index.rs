use crate::{DocId, Posting};
use std::collections::BTreeMap;

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Default, Clone)]
struct Node {
    // Edge label from the parent. Empty only for the root.
    label: String,
    // Keyed by the first char of each child's label.
    children: BTreeMap<char, NodeId>,
    // Non-empty iff the path to this node is a stored token.
    postings: Vec<Posting>,
}

/// Token → postings mapping backed by a path-compressed (radix) trie.
///
/// Nodes live in one arena and refer to their children by index, so walking,
/// cloning and dropping never recurse no matter how long a token is. Each edge
/// holds a run of characters; a node only exists where stored tokens branch or
/// end. Tokens whose posting list becomes empty are pruned and single-child
/// chains left behind are merged back into one edge.
#[derive(Debug, Clone)]
pub struct InvertedIndex {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    num_tokens: usize,
}

impl Default for InvertedIndex {
    fn default() -> Self {
        Self { nodes: vec![Node::default()], free: Vec::new(), num_tokens: 0 }
    }
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Number of distinct tokens stored.
    pub fn len(&self) -> usize { self.num_tokens }

    pub fn is_empty(&self) -> bool { self.num_tokens == 0 }

    /// Nodes from the root down to the node for exactly `key`.
    fn path(&self, key: &str) -> Option<Vec<NodeId>> {
        let mut path = vec![ROOT];
        let mut node = ROOT;
        let mut rest = key;
        while let Some(c) = rest.chars().next() {
            let child = *self.nodes[node].children.get(&c)?;
            rest = rest.strip_prefix(self.nodes[child].label.as_str())?;
            path.push(child);
            node = child;
        }
        Some(path)
    }

    fn node(&self, key: &str) -> Option<&Node> {
        let mut node = ROOT;
        let mut rest = key;
        while let Some(c) = rest.chars().next() {
            let child = *self.nodes[node].children.get(&c)?;
            rest = rest.strip_prefix(self.nodes[child].label.as_str())?;
            node = child;
        }
        Some(&self.nodes[node])
    }

    /// Postings for exactly `token`.
    pub fn get(&self, token: &str) -> Option<&[Posting]> {
        self.node(token)
            .filter(|n| !n.postings.is_empty())
            .map(|n| n.postings.as_slice())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.get(token).is_some()
    }

    /// Appends `posting` to the token's list, creating the entry if needed.
    pub fn put(&mut self, token: &str, posting: Posting) {
        let mut node = ROOT;
        let mut rest = token;
        while let Some(c) = rest.chars().next() {
            let Some(child) = self.nodes[node].children.get(&c).copied() else {
                let leaf = self.alloc(Node { label: rest.to_string(), ..Node::default() });
                self.nodes[node].children.insert(c, leaf);
                node = leaf;
                break;
            };
            let common = common_prefix_len(&self.nodes[child].label, rest);
            if common < self.nodes[child].label.len() {
                node = self.split(node, c, child, common);
            } else {
                node = child;
            }
            rest = &rest[common..];
        }

        let postings = &mut self.nodes[node].postings;
        if postings.is_empty() {
            self.num_tokens += 1;
        }
        postings.push(posting);
    }

    /// Inserts a node holding the first `at` bytes of `child`'s label between
    /// `parent` and `child`. Returns the new node.
    fn split(&mut self, parent: NodeId, c: char, child: NodeId, at: usize) -> NodeId {
        let suffix = self.nodes[child].label.split_off(at);
        let prefix = std::mem::replace(&mut self.nodes[child].label, suffix);
        // `at` is shorter than the label, so the suffix has a first char.
        let first = self.nodes[child].label.chars().next().unwrap_or_default();
        let mut middle = Node { label: prefix, ..Node::default() };
        middle.children.insert(first, child);
        let middle = self.alloc(middle);
        self.nodes[parent].children.insert(c, middle);
        middle
    }

    /// Every stored token starting with `prefix` (including `prefix` itself),
    /// in lexicographic order.
    pub fn prefix_entries(&self, prefix: &str) -> Vec<(String, &[Posting])> {
        let mut out = Vec::new();
        let mut node = ROOT;
        let mut key = String::new();
        let mut rest = prefix;
        while let Some(c) = rest.chars().next() {
            let Some(&child) = self.nodes[node].children.get(&c) else {
                return out;
            };
            let label = self.nodes[child].label.as_str();
            if let Some(after) = rest.strip_prefix(label) {
                rest = after;
            } else if label.starts_with(rest) {
                // The prefix ends inside this edge.
                rest = "";
            } else {
                return out;
            }
            key.push_str(label);
            node = child;
        }

        let mut stack = vec![(node, key)];
        while let Some((id, key)) = stack.pop() {
            let node = &self.nodes[id];
            if !node.postings.is_empty() {
                out.push((key.clone(), node.postings.as_slice()));
            }
            for &child in node.children.values().rev() {
                stack.push((child, format!("{key}{}", self.nodes[child].label)));
            }
        }
        out
    }

    /// All tokens with their postings, in lexicographic order.
    pub fn entries(&self) -> Vec<(String, &[Posting])> {
        self.prefix_entries("")
    }

    /// Drops `doc_id`'s postings from each of `tokens`, deleting tokens left
    /// without postings. Returns how many tokens were deleted.
    pub fn remove_document<'t, I>(&mut self, doc_id: DocId, tokens: I) -> usize
    where
        I: IntoIterator<Item = &'t str>,
    {
        let mut pruned = 0;
        for token in tokens {
            let Some(path) = self.path(token) else {
                continue;
            };
            let Some(&last) = path.last() else {
                continue;
            };
            let postings = &mut self.nodes[last].postings;
            if postings.is_empty() {
                continue;
            }
            postings.retain(|p| p.doc_id != doc_id);
            if postings.is_empty() {
                pruned += 1;
                self.prune(&path);
            }
        }
        self.num_tokens -= pruned;
        pruned
    }

    /// Frees vacant nodes at the end of `path`, then folds a leftover
    /// single-child node into its child.
    fn prune(&mut self, path: &[NodeId]) {
        let mut depth = path.len() - 1;
        while depth > 0 {
            let id = path[depth];
            let node = &self.nodes[id];
            if !node.postings.is_empty() || !node.children.is_empty() {
                break;
            }
            let first = node.label.chars().next();
            if let Some(c) = first {
                self.nodes[path[depth - 1]].children.remove(&c);
            }
            self.release(id);
            depth -= 1;
        }

        let id = path[depth];
        let node = &self.nodes[id];
        if id == ROOT || !node.postings.is_empty() || node.children.len() != 1 {
            return;
        }
        let Some(&child) = node.children.values().next() else {
            return;
        };
        let merged = std::mem::take(&mut self.nodes[child]);
        let node = &mut self.nodes[id];
        node.label.push_str(&merged.label);
        node.children = merged.children;
        node.postings = merged.postings;
        self.free.push(child);
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.nodes[id] = Node::default();
        self.free.push(id);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Byte length of the longest common prefix of `a` and `b`, on a char boundary.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map_or(a.len().min(b.len()), |((i, _), _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(doc_id: DocId, property: &str) -> Posting {
        Posting { doc_id, property: property.into(), property_length: 3, offsets: vec![0] }
    }

    fn live_nodes(ix: &InvertedIndex) -> usize {
        ix.nodes.len() - ix.free.len()
    }

    #[test]
    fn put_and_get() {
        let mut ix = InvertedIndex::new();
        ix.put("cat", posting(1, "text"));
        ix.put("cat", posting(2, "text"));
        ix.put("car", posting(2, "text"));
        assert_eq!(ix.len(), 2);
        assert_eq!(ix.get("cat").map(|p| p.len()), Some(2));
        assert!(ix.get("ca").is_none());
        assert!(ix.get("cats").is_none());
        assert!(ix.get("c").is_none());
    }

    #[test]
    fn prefix_entries_include_the_prefix_itself() {
        let mut ix = InvertedIndex::new();
        for t in ["fo", "foil", "football", "bar"] {
            ix.put(t, posting(1, "text"));
        }
        let tokens: Vec<String> = ix.prefix_entries("fo").into_iter().map(|(t, _)| t).collect();
        assert_eq!(tokens, vec!["fo", "foil", "football"]);
        assert!(ix.prefix_entries("x").is_empty());
        assert_eq!(ix.entries().len(), 4);
    }

    #[test]
    fn prefix_may_end_inside_an_edge() {
        let mut ix = InvertedIndex::new();
        for t in ["romane", "romanus", "romulus", "rubens", "ruber", "rubicon"] {
            ix.put(t, posting(1, "text"));
        }
        let tokens: Vec<String> = ix.prefix_entries("roma").into_iter().map(|(t, _)| t).collect();
        assert_eq!(tokens, vec!["romane", "romanus"]);
        let tokens: Vec<String> = ix.prefix_entries("rube").into_iter().map(|(t, _)| t).collect();
        assert_eq!(tokens, vec!["rubens", "ruber"]);
        assert!(ix.prefix_entries("romx").is_empty());
        assert_eq!(ix.prefix_entries("r").len(), 6);
    }

    #[test]
    fn edges_are_compressed() {
        let mut ix = InvertedIndex::new();
        ix.put("football", posting(1, "text"));
        assert_eq!(live_nodes(&ix), 2);
        ix.put("foil", posting(1, "text"));
        // root, "fo", "otball", "il"
        assert_eq!(live_nodes(&ix), 4);
        ix.put("fo", posting(2, "text"));
        assert_eq!(live_nodes(&ix), 4);
    }

    #[test]
    fn removing_last_posting_prunes_token_and_branch() {
        let mut ix = InvertedIndex::new();
        ix.put("sat", posting(1, "text"));
        ix.put("sat", posting(2, "text"));
        ix.put("cat", posting(1, "text"));
        ix.put("cat", posting(1, "title"));

        let pruned = ix.remove_document(1, ["sat", "cat"]);
        assert_eq!(pruned, 1);
        assert_eq!(ix.len(), 1);
        assert!(ix.get("cat").is_none());
        assert!(ix.prefix_entries("c").is_empty());
        assert_eq!(ix.get("sat").map(|p| p[0].doc_id), Some(2));
        assert_eq!(live_nodes(&ix), 2);
    }

    #[test]
    fn pruning_merges_single_child_chains() {
        let mut ix = InvertedIndex::new();
        for t in ["rub", "rubens", "ruber"] {
            ix.put(t, posting(1, "text"));
        }
        ix.put("rubicon", posting(2, "text"));
        ix.remove_document(1, ["rub", "rubens", "ruber"]);
        assert_eq!(ix.len(), 1);
        assert_eq!(live_nodes(&ix), 2);
        assert_eq!(ix.entries().into_iter().map(|(t, _)| t).collect::<Vec<_>>(), vec!["rubicon"]);

        // Freed slots are reused.
        let before = ix.nodes.len();
        ix.put("ruby", posting(3, "text"));
        ix.put("rubric", posting(3, "text"));
        assert_eq!(ix.nodes.len(), before);
        assert!(ix.contains("rubicon") && ix.contains("ruby") && ix.contains("rubric"));
        ix.remove_document(3, ["ruby", "rubric"]);
        ix.remove_document(2, ["rubicon"]);
        assert!(ix.is_empty());
        assert_eq!(live_nodes(&ix), 1);
    }

    #[test]
    fn removing_unknown_tokens_is_harmless() {
        let mut ix = InvertedIndex::new();
        ix.put("über", posting(1, "text"));
        assert_eq!(ix.remove_document(1, ["unknown", "üb", "übers"]), 0);
        assert_eq!(ix.remove_document(9, ["über"]), 0);
        assert_eq!(ix.len(), 1);
        assert_eq!(ix.prefix_entries("ü").len(), 1);
        ix.clear();
        assert!(ix.is_empty());
        assert!(ix.entries().is_empty());
    }

    #[test]
    fn very_long_and_deeply_nested_tokens() {
        let mut ix = InvertedIndex::new();
        let long = "a".repeat(200_000);
        ix.put(&long, posting(1, "body"));
        // Every length shares the previous token as a prefix.
        for n in 1..=3_000 {
            ix.put(&"b".repeat(n), posting(2, "body"));
        }
        assert_eq!(ix.len(), 3_001);
        assert!(ix.contains(&long));
        assert_eq!(ix.prefix_entries("aaaa").len(), 1);
        assert_eq!(ix.prefix_entries("b").len(), 3_000);

        let copy = ix.clone();
        assert_eq!(copy.len(), ix.len());
        drop(copy);

        let tokens: Vec<String> = (1..=3_000).map(|n| "b".repeat(n)).collect();
        assert_eq!(ix.remove_document(2, tokens.iter().map(String::as_str)), 3_000);
        assert_eq!(ix.remove_document(1, [long.as_str()]), 1);
        assert_eq!(live_nodes(&ix), 1);
        ix.put(&long, posting(1, "body"));
        drop(ix);
    }

    #[test]
    fn common_prefix_respects_char_boundaries() {
        assert_eq!(common_prefix_len("über", "übel"), "übe".len());
        assert_eq!(common_prefix_len("fo", "football"), 2);
        assert_eq!(common_prefix_len("abc", "xyz"), 0);
    }
}
