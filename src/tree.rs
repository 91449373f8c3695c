//! The radix tree itself: insertion (`add_route`), exact lookup
//! (`get_value`) and case-insensitive repair (`find_case_insensitive_path`).
//!
//! Structurally this follows the `matchit`/`httprouter` family: a node owns
//! a prefix, a parallel byte array (`indices`) naming the first byte of
//! each static child for a branchless scan, and at most one wildcard child
//! kept last in `children`. It differs from `matchit` in the lookup half:
//! `get_value` returns an explicit trailing-slash-recommendation bool
//! instead of a `MatchError`/backtracking-stack design, matching the
//! simpler contract this crate's callers need.

use crate::params::Params;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeType {
    Static,
    Root,
    Param,
    CatchAll,
}

/// One node of the compressed trie. Generic over the handler payload `T` so
/// the tree itself stays ignorant of what a "handler" is — `registry`
/// instantiates `T`.
pub struct Node<T> {
    path: Vec<u8>,
    wild_child: bool,
    node_type: NodeType,
    indices: Vec<u8>,
    priority: u32,
    children: Vec<Node<T>>,
    handler: Option<T>,
    /// Largest number of dynamic segments any route under this (root) node
    /// requires. Tracked only on the tree root; lets [`Node::get_value`]
    /// pre-size its [`Params`] instead of growing it one push at a time.
    max_params: u16,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Node {
            path: Vec::new(),
            wild_child: false,
            node_type: NodeType::Static,
            indices: Vec::new(),
            priority: 0,
            children: Vec::new(),
            handler: None,
            max_params: 0,
        }
    }
}

/// Registration-time failures. `registry` turns these into panics, per the
/// crate's fail-fast-at-startup error policy.
#[derive(Debug)]
pub enum InsertError {
    /// Two wildcards with different names/sigils collide at the same node,
    /// or a wildcard conflicts with an existing static child.
    Conflict { pattern: String, existing: String },
    /// The exact same pattern was already registered under this method.
    Duplicate { pattern: String },
    EmptyParamName,
    CatchAllNotFinal,
}

impl<T> Node<T> {
    pub fn new() -> Self {
        Self {
            node_type: NodeType::Root,
            ..Self::default()
        }
    }

    /// Register `path` (already validated to start with `/` by the caller)
    /// against `handler`. An empty-tree fast path, then a walk that splits
    /// on the longest common prefix, descending into or creating a child
    /// at the first mismatching byte.
    pub fn add_route(&mut self, path: &str, handler: T) -> Result<(), InsertError> {
        let full_path = path;
        let path = path.as_bytes();
        self.priority += 1;
        self.max_params = self.max_params.max(count_dynamic_segments(path));

        if self.path.is_empty() && self.children.is_empty() {
            self.insert_child(path, handler)?;
            self.node_type = NodeType::Root;
            return Ok(());
        }

        self.insert(path, full_path, handler)
    }

    fn insert(&mut self, mut path: &[u8], full_path: &str, handler: T) -> Result<(), InsertError> {
        let mut current = self;

        'walk: loop {
            let max = current.path.len().min(path.len());
            let mut i = 0;
            while i < max && path[i] == current.path[i] {
                i += 1;
            }

            if i < current.path.len() {
                let child = Node {
                    path: current.path[i..].to_vec(),
                    wild_child: current.wild_child,
                    node_type: NodeType::Static,
                    indices: current.indices.clone(),
                    priority: current.priority.saturating_sub(1),
                    children: std::mem::take(&mut current.children),
                    handler: current.handler.take(),
                };
                current.children = vec![child];
                current.indices = current.path[i..=i].to_vec();
                current.path = path[..i].to_vec();
                current.wild_child = false;
            }

            if path.len() > i {
                path = &path[i..];
                let first = path[0];

                if current.node_type == NodeType::Param
                    && first == b'/'
                    && current.children.len() == 1
                {
                    current = &mut current.children[0];
                    current.priority += 1;
                    continue 'walk;
                }

                if let Some(pos) = current.indices.iter().position(|&b| b == first) {
                    let pos = current.bump_priority(pos);
                    current = &mut current.children[pos];
                    continue 'walk;
                }

                if first != b':' && first != b'*' && current.node_type != NodeType::CatchAll {
                    current.indices.push(first);
                    current.children.push(Node::default());
                    let pos = current.children.len() - 1;
                    let pos = current.bump_priority(pos);
                    current = &mut current.children[pos];
                    return current.insert_child(path, handler);
                }

                if current.wild_child {
                    current = current.children.last_mut().unwrap();
                    current.priority += 1;

                    let compatible = path.len() >= current.path.len()
                        && current.path == path[..current.path.len()]
                        && current.node_type != NodeType::CatchAll
                        && (current.path.len() >= path.len() || path[current.path.len()] == b'/');

                    if compatible {
                        continue 'walk;
                    }

                    return Err(InsertError::Conflict {
                        pattern: full_path.to_string(),
                        existing: String::from_utf8_lossy(&current.path).into_owned(),
                    });
                }

                return current.insert_child(path, handler);
            }

            if current.handler.is_some() {
                return Err(InsertError::Duplicate {
                    pattern: full_path.to_string(),
                });
            }
            current.handler = Some(handler);
            return Ok(());
        }
    }

    /// Bump the priority of `children[pos]` and bubble it toward the front
    /// of the sibling list, keeping `indices` in lockstep. Returns the
    /// child's new index.
    fn bump_priority(&mut self, pos: usize) -> usize {
        self.children[pos].priority += 1;
        let priority = self.children[pos].priority;

        let mut new_pos = pos;
        while new_pos > 0 && self.children[new_pos - 1].priority < priority {
            self.children.swap(new_pos - 1, new_pos);
            new_pos -= 1;
        }

        if new_pos != pos {
            self.indices = [
                &self.indices[..new_pos],
                &self.indices[pos..=pos],
                &self.indices[new_pos..pos],
                &self.indices[pos + 1..],
            ]
            .concat();
        }

        new_pos
    }

    /// Walk `path` looking for a `:name`/`*name` wildcard, splitting the
    /// static prefix before it off into `self` and recursing into fresh
    /// child nodes for the wildcard (and whatever static suffix follows a
    /// `:param`).
    fn insert_child(&mut self, mut path: &[u8], handler: T) -> Result<(), InsertError> {
        let mut current = self;

        loop {
            let wildcard = match find_wildcard(path) {
                Some(w) => w,
                None => {
                    current.path = path.to_vec();
                    current.handler = Some(handler);
                    return Ok(());
                }
            };

            if wildcard.name.is_empty() {
                return Err(InsertError::EmptyParamName);
            }

            if path[wildcard.start] == b':' {
                if wildcard.start > 0 {
                    current.path = path[..wildcard.start].to_vec();
                    path = &path[wildcard.start..];
                }

                let child = Node {
                    node_type: NodeType::Param,
                    path: wildcard.raw.to_vec(),
                    ..Node::default()
                };
                current.children.push(child);
                current.wild_child = true;
                current = current.children.last_mut().unwrap();
                current.priority += 1;

                if wildcard.raw.len() < path.len() {
                    path = &path[wildcard.raw.len()..];
                    current.children.push(Node {
                        priority: 1,
                        ..Node::default()
                    });
                    current = current.children.last_mut().unwrap();
                    continue;
                }

                current.handler = Some(handler);
                return Ok(());
            }

            // catch-all: must be the final segment.
            if wildcard.start + wildcard.raw.len() != path.len() {
                return Err(InsertError::CatchAllNotFinal);
            }
            if wildcard.start > 0 && path[wildcard.start - 1] != b'/' {
                return Err(InsertError::CatchAllNotFinal);
            }

            // The boundary slash belongs to the catch-all node's own path,
            // not the static prefix before it — a catch-all node's path
            // always begins with `/*`.
            if wildcard.start > 0 {
                current.path = path[..wildcard.start - 1].to_vec();
            }

            let mut catch_all_path = Vec::with_capacity(wildcard.raw.len() + 1);
            catch_all_path.push(b'/');
            catch_all_path.extend_from_slice(wildcard.raw);

            current.children.push(Node {
                path: catch_all_path,
                node_type: NodeType::CatchAll,
                handler: Some(handler),
                priority: 1,
                ..Node::default()
            });
            current.wild_child = true;
            return Ok(());
        }
    }

    /// Exact-match lookup. Returns the handler and captured params on a
    /// hit; `tsr` reports whether a route exists one trailing-slash away
    /// from `path`, regardless of whether this lookup hit.
    pub fn get_value(&self, path: &str) -> LookupResult<'_, T> {
        let mut current = self;
        let mut path = path.as_bytes();
        let mut params = Params::with_capacity(self.max_params as usize);

        loop {
            if path.len() > current.path.len() {
                if path[..current.path.len()] != current.path[..] {
                    return LookupResult {
                        handler: None,
                        params: None,
                        tsr: false,
                    };
                }
                path = &path[current.path.len()..];

                if !current.wild_child {
                    let first = path[0];
                    match current.indices.iter().position(|&b| b == first) {
                        Some(i) => {
                            current = &current.children[i];
                            continue;
                        }
                        None => {
                            let tsr = path == b"/" && current.handler.is_some();
                            return LookupResult {
                                handler: None,
                                params: None,
                                tsr,
                            };
                        }
                    }
                }

                let child = current.children.last().unwrap();
                match child.node_type {
                    NodeType::Param => {
                        let end = path.iter().position(|&b| b == b'/').unwrap_or(path.len());
                        params.push(param_name(&child.path), std::str::from_utf8(&path[..end]).unwrap_or(""));

                        if end < path.len() {
                            path = &path[end..];
                            if child.children.len() == 1 {
                                current = &child.children[0];
                                continue;
                            }
                            return LookupResult {
                                handler: None,
                                params: None,
                                tsr: path == b"/" && child.handler.is_some(),
                            };
                        }

                        return match &child.handler {
                            Some(h) => LookupResult {
                                handler: Some(h),
                                params: Some(params),
                                tsr: false,
                            },
                            None => {
                                let tsr = child.children.len() == 1
                                    && child.children[0].path == b"/"
                                    && child.children[0].handler.is_some();
                                LookupResult {
                                    handler: None,
                                    params: None,
                                    tsr,
                                }
                            }
                        };
                    }
                    NodeType::CatchAll => {
                        params.push(catch_all_name(&child.path), std::str::from_utf8(path).unwrap_or(""));
                        return LookupResult {
                            handler: child.handler.as_ref(),
                            params: Some(params),
                            tsr: false,
                        };
                    }
                    _ => unreachable!("wild_child always points at Param or CatchAll"),
                }
            } else if path == current.path.as_slice() {
                if let Some(h) = &current.handler {
                    return LookupResult {
                        handler: Some(h),
                        params: Some(params),
                        tsr: false,
                    };
                }

                // no handler here — a catch-all child matches the request
                // path's trailing slash boundary (e.g. `/files` against
                // `/files/*filepath`), or a static child one slash away does.
                if current.wild_child {
                    let child = current.children.last().unwrap();
                    let tsr = child.node_type == NodeType::CatchAll && child.handler.is_some();
                    return LookupResult {
                        handler: None,
                        params: None,
                        tsr,
                    };
                }
                if let Some(i) = current.indices.iter().position(|&b| b == b'/') {
                    let child = &current.children[i];
                    let tsr = child.path == b"/" && child.handler.is_some();
                    return LookupResult {
                        handler: None,
                        params: None,
                        tsr,
                    };
                }
                return LookupResult {
                    handler: None,
                    params: None,
                    tsr: false,
                };
            } else {
                // neither a prefix of path, nor equal to it.
                let tsr = path.len() + 1 == current.path.len()
                    && current.path[..path.len()] == path[..]
                    && current.path[path.len()] == b'/'
                    && current.handler.is_some();
                return LookupResult {
                    handler: None,
                    params: None,
                    tsr,
                };
            }
        }
    }

    /// Depth-first, backtracking search for a path that matches `path`
    /// under ASCII case-folding (see DESIGN.md for why case folding is
    /// restricted to ASCII). `fix_trailing_slash` controls whether a
    /// found-but-for-a-trailing-slash result counts.
    pub fn find_case_insensitive_path(
        &self,
        path: &str,
        fix_trailing_slash: bool,
    ) -> Option<String> {
        let mut buf = Vec::with_capacity(path.len() + 1);
        if self.find_ci(path.as_bytes(), &mut buf, fix_trailing_slash) {
            Some(String::from_utf8(buf).expect("input was valid UTF-8 and we only copy bytes"))
        } else {
            None
        }
    }

    fn find_ci(&self, path: &[u8], buf: &mut Vec<u8>, fix_trailing_slash: bool) -> bool {
        if path.len() >= self.path.len()
            && eq_ignore_ascii_case(&path[..self.path.len()], &self.path)
        {
            buf.extend_from_slice(&self.path);
            let rest = &path[self.path.len()..];

            if rest.is_empty() {
                if self.handler.is_some() {
                    return true;
                }
                if fix_trailing_slash {
                    for child in &self.children {
                        if child.path == b"/" && child.handler.is_some() {
                            buf.push(b'/');
                            return true;
                        }
                        if child.node_type == NodeType::CatchAll {
                            return child.handler.is_some();
                        }
                    }
                }
                return false;
            }

            if !self.wild_child {
                let first = rest[0];
                for child in &self.children {
                    if !child.path.is_empty() && child.path[0].eq_ignore_ascii_case(&first) {
                        let mark = buf.len();
                        if child.find_ci(rest, buf, fix_trailing_slash) {
                            return true;
                        }
                        buf.truncate(mark);
                    }
                }

                if fix_trailing_slash && rest == b"/" && self.handler.is_some() {
                    return true;
                }
                return false;
            }

            let child = self.children.last().unwrap();
            match child.node_type {
                NodeType::Param => {
                    let end = rest.iter().position(|&b| b == b'/').unwrap_or(rest.len());
                    buf.extend_from_slice(&rest[..end]);

                    let after = &rest[end..];
                    if after.is_empty() {
                        if child.handler.is_some() {
                            return true;
                        }
                        if fix_trailing_slash
                            && child.children.len() == 1
                            && child.children[0].path == b"/"
                            && child.children[0].handler.is_some()
                        {
                            buf.push(b'/');
                            return true;
                        }
                        return false;
                    }

                    if child.children.len() == 1 {
                        let mark = buf.len();
                        if child.children[0].find_ci(after, buf, fix_trailing_slash) {
                            return true;
                        }
                        buf.truncate(mark);
                    }
                    false
                }
                NodeType::CatchAll => {
                    buf.extend_from_slice(rest);
                    child.handler.is_some()
                }
                _ => unreachable!("wild_child always points at Param or CatchAll"),
            }
        } else if fix_trailing_slash && eq_ignore_ascii_case_prefix(path, &self.path) {
            // `self.path` is one trailing slash longer/shorter than the
            // matched prefix of `path` — covers the `/foo` vs `/foo/` case.
            if self.path.len() == path.len() + 1
                && self.path[path.len()] == b'/'
                && eq_ignore_ascii_case(path, &self.path[..path.len()])
                && self.handler.is_some()
            {
                buf.extend_from_slice(&self.path);
                return true;
            }
            false
        } else {
            false
        }
    }
}

fn eq_ignore_ascii_case(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignore_ascii_case(y))
}

fn eq_ignore_ascii_case_prefix(a: &[u8], b: &[u8]) -> bool {
    let n = a.len().min(b.len());
    a[..n].iter().zip(&b[..n]).all(|(x, y)| x.eq_ignore_ascii_case(y))
}

fn param_name(raw_wildcard_path: &[u8]) -> &str {
    std::str::from_utf8(&raw_wildcard_path[1..]).unwrap_or("")
}

/// A catch-all node's own path is `/*name` (the boundary slash plus the
/// sigil), so its parameter name starts two bytes in.
fn catch_all_name(raw_wildcard_path: &[u8]) -> &str {
    std::str::from_utf8(&raw_wildcard_path[2..]).unwrap_or("")
}

/// Count of `:`/`*` wildcard markers in a registered pattern — an upper
/// bound on the params a single lookup against it can capture.
fn count_dynamic_segments(path: &[u8]) -> u16 {
    path.iter()
        .filter(|&&b| b == b':' || b == b'*')
        .count() as u16
}

struct Wildcard<'a> {
    /// byte offset, within the segment passed to `find_wildcard`, of the
    /// `:`/`*` sigil.
    start: usize,
    /// the sigil plus name, e.g. `:id` or `*filepath`.
    raw: &'a [u8],
    name: &'a [u8],
}

/// Find the first `:name` or `*name` wildcard in `path`, stopping at the
/// next `/`.
fn find_wildcard(path: &[u8]) -> Option<Wildcard<'_>> {
    for (start, &b) in path.iter().enumerate() {
        if b != b':' && b != b'*' {
            continue;
        }
        let end = path[start + 1..]
            .iter()
            .position(|&c| c == b'/')
            .map(|p| start + 1 + p)
            .unwrap_or(path.len());
        return Some(Wildcard {
            start,
            raw: &path[start..end],
            name: &path[start + 1..end],
        });
    }
    None
}

/// The outcome of [`Node::get_value`].
pub struct LookupResult<'n, T> {
    pub handler: Option<&'n T>,
    pub params: Option<Params>,
    /// Whether redirecting with/without a trailing slash would have hit a
    /// registered route.
    pub tsr: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(routes: &[&str]) -> Node<&'static str> {
        let mut root = Node::new();
        for r in routes {
            root.add_route(r, "h").unwrap();
        }
        root
    }

    #[test]
    fn exact_match_static_routes() {
        let tree = build(&["/", "/users", "/users/profile"]);
        assert!(tree.get_value("/users/profile").handler.is_some());
        assert!(tree.get_value("/users").handler.is_some());
        assert!(tree.get_value("/").handler.is_some());
    }

    #[test]
    fn named_param_capture() {
        let tree = build(&["/users/:id"]);
        let r = tree.get_value("/users/42");
        assert!(r.handler.is_some());
        assert_eq!(r.params.unwrap().get("id"), Some("42"));
    }

    #[test]
    fn catch_all_capture() {
        let tree = build(&["/files/*filepath"]);
        let r = tree.get_value("/files/a/b/c.txt");
        assert!(r.handler.is_some());
        assert_eq!(r.params.unwrap().get("filepath"), Some("/a/b/c.txt"));
    }

    #[test]
    fn missing_route_reports_no_handler() {
        let tree = build(&["/users/:id"]);
        let r = tree.get_value("/nope");
        assert!(r.handler.is_none());
    }

    #[test]
    fn tsr_detected_for_missing_trailing_slash() {
        let tree = build(&["/users/"]);
        let r = tree.get_value("/users");
        assert!(r.handler.is_none());
        assert!(r.tsr);
    }

    #[test]
    fn tsr_detected_for_extra_trailing_slash() {
        let tree = build(&["/users"]);
        let r = tree.get_value("/users/");
        assert!(r.handler.is_none());
        assert!(r.tsr);
    }

    #[test]
    fn no_tsr_when_neither_variant_registered() {
        let tree = build(&["/users/:id"]);
        let r = tree.get_value("/accounts");
        assert!(!r.tsr);
    }

    #[test]
    fn conflicting_param_names_are_rejected() {
        let mut tree: Node<&'static str> = Node::new();
        tree.add_route("/users/:id", "h").unwrap();
        let err = tree.add_route("/users/:name", "h").unwrap_err();
        assert!(matches!(err, InsertError::Conflict { .. }));
    }

    #[test]
    fn duplicate_route_is_rejected() {
        let mut tree: Node<&'static str> = Node::new();
        tree.add_route("/users", "h").unwrap();
        let err = tree.add_route("/users", "h").unwrap_err();
        assert!(matches!(err, InsertError::Duplicate { .. }));
    }

    #[test]
    fn case_insensitive_repair_finds_canonical_casing() {
        let tree = build(&["/Users/Profile"]);
        let fixed = tree.find_case_insensitive_path("/users/profile", false);
        assert_eq!(fixed.as_deref(), Some("/Users/Profile"));
    }

    #[test]
    fn case_insensitive_repair_can_fix_trailing_slash() {
        let tree = build(&["/Users/"]);
        let fixed = tree.find_case_insensitive_path("/users", true);
        assert_eq!(fixed.as_deref(), Some("/Users/"));
    }

    #[test]
    fn case_insensitive_repair_respects_fix_trailing_slash_flag() {
        let tree = build(&["/Users/"]);
        assert_eq!(tree.find_case_insensitive_path("/users", false), None);
    }

    #[test]
    fn catch_all_matches_its_own_boundary_slash() {
        let tree = build(&["/files/*filepath"]);
        let r = tree.get_value("/files/");
        assert!(r.handler.is_some());
        assert_eq!(r.params.unwrap().get("filepath"), Some("/"));
    }

    #[test]
    fn tsr_detected_short_of_a_catch_all() {
        let tree = build(&["/", "/users/:id", "/files/*filepath"]);
        let r = tree.get_value("/files");
        assert!(r.handler.is_none());
        assert!(r.tsr);
    }

    #[test]
    fn priority_bubbles_frequently_inserted_siblings() {
        let mut tree: Node<&'static str> = Node::new();
        for r in ["/a", "/b", "/b"] {
            let _ = tree.add_route(r, "h");
        }
        // second `/b` insert is rejected as a duplicate, but the first
        // insert's priority bump should still have left `/b` reachable.
        assert!(tree.get_value("/b").handler.is_some());
        assert!(tree.get_value("/a").handler.is_some());
    }
}
