//! Push-fed pull parser: feed chunks, then pull open/close events.

use std::collections::VecDeque;

use super::tokenizer::{Token, Tokenizer};
use super::tree::{NodeId, Tree};

/// Elements that never have content and close as soon as they open.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Tag of the synthetic node every parsed element descends from.
pub const DOCUMENT_TAG: &str = "#document";

/// Structural event for a node in the parser's [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The node's start tag was read; its attributes are available.
    Open(NodeId),
    /// The node ended; its text and children are complete.
    Close(NodeId),
}

/// Lenient incremental markup parser.
///
/// Events are produced as soon as the input that determines them has been
/// fed. Consumers interleave [`PullParser::next_event`] with tree access and
/// may release closed nodes while parsing continues.
#[derive(Debug)]
pub struct PullParser {
    tokenizer: Tokenizer,
    tokens: Vec<Token>,
    tree: Tree,
    root: NodeId,
    stack: Vec<NodeId>,
    events: VecDeque<Event>,
}

impl Default for PullParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PullParser {
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Tree::new();
        let root = tree.create(DOCUMENT_TAG, Vec::new(), None);
        Self {
            tokenizer: Tokenizer::new(),
            tokens: Vec::new(),
            tree,
            root,
            stack: Vec::new(),
            events: VecDeque::new(),
        }
    }

    /// Feeds the next piece of markup.
    pub fn feed(&mut self, chunk: &str) {
        self.tokenizer.feed(chunk, &mut self.tokens);
        self.apply_pending();
    }

    /// Signals end of input: flushes buffered text and closes all open elements.
    pub fn finish(&mut self) {
        self.tokenizer.finish(&mut self.tokens);
        self.apply_pending();
        while !self.stack.is_empty() {
            self.close_top();
        }
    }

    /// Pops the oldest unread event.
    pub fn next_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// The synthetic document node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(self.root)
    }

    fn apply_pending(&mut self) {
        let tokens = std::mem::take(&mut self.tokens);
        for token in tokens {
            self.apply(token);
        }
    }

    fn apply(&mut self, token: Token) {
        match token {
            Token::Text(text) => {
                let current = self.current();
                self.tree.append_text(current, &text);
            }
            Token::Start {
                name,
                attrs,
                self_closing,
            } => {
                self.close_implied(&name);
                let is_void = self_closing || VOID_ELEMENTS.contains(&name.as_str());
                let parent = self.current();
                let id = self.tree.create(name, attrs, Some(parent));
                self.events.push_back(Event::Open(id));
                if is_void {
                    self.events.push_back(Event::Close(id));
                } else {
                    self.stack.push(id);
                }
            }
            Token::End { name } => {
                // Unmatched end tags are ignored.
                if let Some(depth) = self.find_open(&name, &[]) {
                    self.close_to(depth);
                }
            }
        }
    }

    /// Closes an element that the new start tag implicitly ends.
    fn close_implied(&mut self, name: &str) {
        let (closes, scope): (&[&str], &[&str]) = match name {
            "li" => (&["li"], &["ul", "ol"]),
            "dt" | "dd" => (&["dt", "dd"], &["dl"]),
            "tr" => (&["tr"], &["table", "tbody", "thead", "tfoot"]),
            "td" | "th" => (&["td", "th"], &["tr", "table"]),
            "option" => (&["option"], &["select", "datalist"]),
            "p" => {
                if self.tree.tag(self.current()) == Some("p") {
                    self.close_top();
                }
                return;
            }
            _ => return,
        };

        for tag in closes {
            if let Some(depth) = self.find_open(tag, scope) {
                self.close_to(depth);
                return;
            }
        }
    }

    /// Stack depth of the innermost open `tag`, not looking past any `scope` element.
    fn find_open(&self, tag: &str, scope: &[&str]) -> Option<usize> {
        for (depth, id) in self.stack.iter().enumerate().rev() {
            let open = self.tree.tag(*id).unwrap_or_default();
            if open == tag {
                return Some(depth);
            }
            if scope.contains(&open) {
                return None;
            }
        }
        None
    }

    fn close_to(&mut self, depth: usize) {
        while self.stack.len() > depth {
            self.close_top();
        }
    }

    fn close_top(&mut self) {
        if let Some(id) = self.stack.pop() {
            self.events.push_back(Event::Close(id));
        }
    }
}
