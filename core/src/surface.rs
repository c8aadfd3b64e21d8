//! Caret mapping between flat buffer offsets and the rendered surface.
//!
//! The rendered markup is parsed into a small node tree. A surface position
//! names a container by its child-index path from the root plus an offset:
//! a char offset for text nodes, a child index for elements. Walking the tree
//! in document order, text nodes contribute their char length and line breaks
//! count as one offset unit each.

use crate::buffer::Selection;

/// A node of the rendered surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element {
        name: String,
        attrs: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Text(String),
    LineBreak,
}

impl Node {
    /// Offset units this node spans.
    pub fn len(&self) -> usize {
        match self {
            Node::Text(t) => t.chars().count(),
            Node::LineBreak => 1,
            Node::Element { children, .. } => children.iter().map(Node::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of attribute `key` on an element.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Node::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::LineBreak => out.push('\n'),
            Node::Element { children, .. } => {
                for c in children {
                    c.push_text(out);
                }
            }
        }
    }
}

/// A position on the surface: container path and offset within it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SurfacePosition {
    pub path: Vec<usize>,
    pub offset: usize,
}

impl SurfacePosition {
    pub fn new(path: Vec<usize>, offset: usize) -> Self {
        Self { path, offset }
    }
}

/// An element found under an offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanInfo {
    pub classes: Vec<String>,
    pub text: String,
    pub start: usize,
}

/// Rendered surface: the children of the editable root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Surface {
    pub nodes: Vec<Node>,
}

impl Surface {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Parse highlighter markup. Tags other than `br` become elements, `br`
    /// becomes a line break, and entities decode to single chars. Unbalanced
    /// closing tags are ignored; unclosed elements end at the input end.
    pub fn from_markup(markup: &str) -> Self {
        let mut stack: Vec<(String, Vec<(String, String)>, Vec<Node>)> =
            vec![(String::new(), Vec::new(), Vec::new())];
        let mut text = String::new();
        let mut chars = markup.chars().peekable();

        fn flush_text(text: &mut String, stack: &mut [(String, Vec<(String, String)>, Vec<Node>)]) {
            if !text.is_empty() {
                if let Some(top) = stack.last_mut() {
                    top.2.push(Node::Text(std::mem::take(text)));
                }
            }
        }

        while let Some(ch) = chars.next() {
            match ch {
                '<' => {
                    let mut tag = String::new();
                    let mut quote: Option<char> = None;
                    for c in chars.by_ref() {
                        match (c, quote) {
                            ('>', None) => break,
                            ('"' | '\'', None) => quote = Some(c),
                            (q, Some(open)) if q == open => quote = None,
                            _ => {}
                        }
                        tag.push(c);
                    }
                    flush_text(&mut text, &mut stack);
                    let tag = tag.trim().trim_end_matches('/').trim();
                    if let Some(name) = tag.strip_prefix('/') {
                        let name = name.trim().to_ascii_lowercase();
                        if stack.len() > 1 && stack.last().map(|t| t.0 == name).unwrap_or(false) {
                            if let Some((name, attrs, children)) = stack.pop() {
                                if let Some(parent) = stack.last_mut() {
                                    parent.2.push(Node::Element { name, attrs, children });
                                }
                            }
                        }
                    } else {
                        let (name, rest) = tag
                            .split_once(char::is_whitespace)
                            .unwrap_or((tag, ""));
                        let name = name.to_ascii_lowercase();
                        if name == "br" {
                            if let Some(top) = stack.last_mut() {
                                top.2.push(Node::LineBreak);
                            }
                        } else if !name.is_empty() {
                            stack.push((name, parse_attrs(rest), Vec::new()));
                        }
                    }
                }
                '&' => {
                    let mut entity = String::new();
                    while let Some(&c) = chars.peek() {
                        if c == ';' || entity.len() > 6 {
                            break;
                        }
                        if !(c.is_ascii_alphanumeric() || c == '#') {
                            break;
                        }
                        entity.push(c);
                        chars.next();
                    }
                    let decoded = match entity.as_str() {
                        "lt" => Some('<'),
                        "gt" => Some('>'),
                        "amp" => Some('&'),
                        "quot" => Some('"'),
                        "#39" | "apos" => Some('\''),
                        "nbsp" => Some('\u{a0}'),
                        _ => None,
                    };
                    match decoded {
                        Some(c) => {
                            if chars.peek() == Some(&';') {
                                chars.next();
                            }
                            text.push(c);
                        }
                        None => {
                            text.push('&');
                            text.push_str(&entity);
                        }
                    }
                }
                _ => text.push(ch),
            }
        }
        flush_text(&mut text, &mut stack);
        while stack.len() > 1 {
            if let Some((name, attrs, children)) = stack.pop() {
                if let Some(parent) = stack.last_mut() {
                    parent.2.push(Node::Element { name, attrs, children });
                }
            }
        }
        let nodes = stack.pop().map(|(_, _, children)| children).unwrap_or_default();
        Self { nodes }
    }

    /// Total offset units on the surface.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(Node::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text content, with line breaks as `\n`.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for n in &self.nodes {
            n.push_text(&mut out);
        }
        out
    }

    fn children_at(&self, path: &[usize]) -> Option<&[Node]> {
        let mut children: &[Node] = &self.nodes;
        for &i in path {
            match children.get(i)? {
                Node::Element { children: c, .. } => children = c,
                _ => return None,
            }
        }
        Some(children)
    }

    fn node_at(&self, path: &[usize]) -> Option<&Node> {
        let (last, parent) = path.split_last()?;
        self.children_at(parent)?.get(*last)
    }

    /// Flat offset of a surface position. Unresolvable positions map to 0.
    pub fn offset_from_surface_position(&self, pos: &SurfacePosition) -> usize {
        let mut offset = 0;
        let mut children: &[Node] = &self.nodes;
        for (depth, &i) in pos.path.iter().enumerate() {
            if i >= children.len() {
                return 0;
            }
            offset += children[..i].iter().map(Node::len).sum::<usize>();
            let is_last = depth + 1 == pos.path.len();
            match &children[i] {
                Node::Element { children: c, .. } => children = c,
                Node::Text(t) if is_last => {
                    return offset + pos.offset.min(t.chars().count());
                }
                Node::LineBreak if is_last => return offset,
                _ => return 0,
            }
        }
        let upto = pos.offset.min(children.len());
        offset + children[..upto].iter().map(Node::len).sum::<usize>()
    }

    /// Surface position of a flat offset.
    ///
    /// Walks text nodes and line breaks in document order. A line break
    /// sitting exactly at the offset is chosen; otherwise the first text node
    /// whose end reaches the offset. Past the end, the position is the end of
    /// the root.
    pub fn surface_position_from_offset(&self, offset: usize) -> SurfacePosition {
        fn walk(
            nodes: &[Node],
            path: &mut Vec<usize>,
            acc: &mut usize,
            target: usize,
        ) -> Option<SurfacePosition> {
            for (i, node) in nodes.iter().enumerate() {
                path.push(i);
                match node {
                    Node::LineBreak => {
                        if *acc == target {
                            return Some(SurfacePosition::new(path.clone(), 0));
                        }
                        *acc += 1;
                    }
                    Node::Text(t) => {
                        let len = t.chars().count();
                        if *acc + len >= target {
                            return Some(SurfacePosition::new(path.clone(), target - *acc));
                        }
                        *acc += len;
                    }
                    Node::Element { children, .. } => {
                        if let Some(found) = walk(children, path, acc, target) {
                            return Some(found);
                        }
                    }
                }
                path.pop();
            }
            None
        }

        let mut path = Vec::new();
        let mut acc = 0;
        walk(&self.nodes, &mut path, &mut acc, offset)
            .unwrap_or_else(|| SurfacePosition::new(Vec::new(), self.nodes.len()))
    }

    /// Map both endpoints of a surface selection independently.
    pub fn selection_from_surface(
        &self,
        anchor: &SurfacePosition,
        focus: &SurfacePosition,
    ) -> Selection {
        Selection::new(
            self.offset_from_surface_position(anchor),
            self.offset_from_surface_position(focus),
        )
    }

    /// Surface positions for both endpoints of `selection`.
    pub fn surface_selection(&self, selection: Selection) -> (SurfacePosition, SurfacePosition) {
        (
            self.surface_position_from_offset(selection.start),
            self.surface_position_from_offset(selection.end),
        )
    }

    /// Innermost element with a `class` attribute covering `offset`.
    pub fn span_at(&self, offset: usize) -> Option<SpanInfo> {
        fn walk(nodes: &[Node], acc: &mut usize, target: usize) -> Option<SpanInfo> {
            for node in nodes {
                let len = node.len();
                if target >= *acc && target < *acc + len {
                    if let Node::Element { children, .. } = node {
                        let start = *acc;
                        if let Some(inner) = walk(children, acc, target) {
                            return Some(inner);
                        }
                        if let Some(class) = node.attr("class") {
                            let mut text = String::new();
                            node.push_text(&mut text);
                            return Some(SpanInfo {
                                classes: class.split_whitespace().map(str::to_string).collect(),
                                text,
                                start,
                            });
                        }
                    }
                    return None;
                }
                *acc += len;
            }
            None
        }
        let mut acc = 0;
        walk(&self.nodes, &mut acc, offset)
    }

    /// Node at a path, if any.
    pub fn get(&self, path: &[usize]) -> Option<&Node> {
        self.node_at(path)
    }
}

fn parse_attrs(s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut rest = s.trim();
    while !rest.is_empty() {
        let key_end = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let key = rest[..key_end].to_ascii_lowercase();
        rest = rest[key_end..].trim_start();
        let mut value = String::new();
        if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            let mut it = after_eq.char_indices();
            match it.next() {
                Some((_, q @ ('"' | '\''))) => {
                    let body = &after_eq[1..];
                    let end = body.find(q).unwrap_or(body.len());
                    value = body[..end].to_string();
                    rest = body.get(end + 1..).unwrap_or("").trim_start();
                }
                Some(_) => {
                    let end = after_eq
                        .find(char::is_whitespace)
                        .unwrap_or(after_eq.len());
                    value = after_eq[..end].to_string();
                    rest = after_eq[end..].trim_start();
                }
                None => rest = "",
            }
        }
        if !key.is_empty() {
            attrs.push((key, value));
        }
    }
    attrs
}
