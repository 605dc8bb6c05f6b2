//! Radix tree node.
//!
//! Each node owns one path segment. Nodes that terminate a registered
//! pattern carry the index of that pattern's [`RouteMeta`](crate::RouteMeta)
//! inside the owning [`RouteTable`](crate::RouteTable).

use crate::error::RouteError;
use crate::params::Params;

/// Why a pattern could not be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Conflict {
    /// Another route already ends at the same node.
    Route(usize),
    /// The position is already captured under a different name.
    ParamName(String),
}

/// Kind of path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Literal segment (e.g. `users`)
    Static,
    /// Named parameter (e.g. `{users_pk}`)
    Param(String),
    /// Catch-all capturing the rest of the path (e.g. `*action`)
    Wildcard(String),
}

/// A node in the route tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// The raw segment text
    pub segment: String,

    /// The kind of segment
    pub kind: SegmentKind,

    /// Index of the route terminating at this node
    pub route: Option<usize>,

    /// Static children, sorted by segment for binary search
    pub static_children: Vec<Node>,

    /// Parameter child (at most one per node)
    pub param_child: Option<Box<Node>>,

    /// Wildcard child (at most one per node, always a leaf)
    pub wildcard_child: Option<Box<Node>>,
}

impl Node {
    fn with_kind(segment: String, kind: SegmentKind) -> Self {
        Self {
            segment,
            kind,
            route: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates the root node.
    #[must_use]
    pub fn root() -> Self {
        Self::with_kind(String::new(), SegmentKind::Static)
    }

    /// Splits a pattern into typed segments.
    pub(crate) fn parse_pattern(pattern: &str) -> Result<Vec<(String, SegmentKind)>, RouteError> {
        let raw: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw.len());

        for (position, s) in raw.iter().enumerate() {
            let kind = if let Some(name) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                SegmentKind::Param(name.to_string())
            } else if let Some(name) = s.strip_prefix('*') {
                if position + 1 != raw.len() {
                    return Err(RouteError::WildcardNotLast {
                        pattern: pattern.to_string(),
                    });
                }
                SegmentKind::Wildcard(name.to_string())
            } else {
                SegmentKind::Static
            };

            if let SegmentKind::Param(name) | SegmentKind::Wildcard(name) = &kind {
                if name.is_empty() {
                    return Err(RouteError::EmptyParamName {
                        pattern: pattern.to_string(),
                    });
                }
            }

            segments.push(((*s).to_string(), kind));
        }

        Ok(segments)
    }

    /// Inserts a parsed pattern.
    pub(crate) fn insert(
        &mut self,
        segments: &[(String, SegmentKind)],
        route: usize,
    ) -> Result<(), Conflict> {
        let Some(((segment, kind), remaining)) = segments.split_first() else {
            return match self.route {
                Some(existing) => Err(Conflict::Route(existing)),
                None => {
                    self.route = Some(route);
                    Ok(())
                }
            };
        };

        match kind {
            SegmentKind::Static => {
                match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(i) => self.static_children[i].insert(remaining, route),
                    Err(i) => {
                        let mut child = Self::with_kind(segment.clone(), SegmentKind::Static);
                        child.insert(remaining, route)?;
                        self.static_children.insert(i, child);
                        Ok(())
                    }
                }
            }
            SegmentKind::Param(_) => {
                let child = self
                    .param_child
                    .get_or_insert_with(|| Box::new(Self::with_kind(segment.clone(), kind.clone())));
                if child.kind != *kind {
                    return Err(Conflict::ParamName(child.segment.clone()));
                }
                child.insert(remaining, route)
            }
            SegmentKind::Wildcard(_) => {
                let child = self
                    .wildcard_child
                    .get_or_insert_with(|| Box::new(Self::with_kind(segment.clone(), kind.clone())));
                if child.kind != *kind {
                    return Err(Conflict::ParamName(child.segment.clone()));
                }
                child.insert(remaining, route)
            }
        }
    }

    /// Matches a concrete path, capturing parameters on the way.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(usize, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        let route = self.match_segments(&segments, &mut params)?;
        Some((route, params))
    }

    // Static beats param beats wildcard; params are unwound on failed branches.
    fn match_segments(&self, segments: &[&str], params: &mut Params) -> Option<usize> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.route;
        };

        if let Some(child) = self.find_static_child(segment) {
            if let Some(route) = child.match_segments(remaining, params) {
                return Some(route);
            }
        }

        if let Some(child) = &self.param_child {
            if let SegmentKind::Param(name) = &child.kind {
                params.push(name.clone(), (*segment).to_string());
                if let Some(route) = child.match_segments(remaining, params) {
                    return Some(route);
                }
                params.pop();
            }
        }

        if let Some(child) = &self.wildcard_child {
            if let (SegmentKind::Wildcard(name), Some(route)) = (&child.kind, child.route) {
                params.push(name.clone(), segments.join("/"));
                return Some(route);
            }
        }

        None
    }

    fn find_static_child(&self, segment: &str) -> Option<&Node> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}
