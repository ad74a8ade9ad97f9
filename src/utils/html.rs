use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Node, Selector};

// base
pub trait DOMProcessor<T>: Sync + Send {
    fn process(&self, el: &ElementRef) -> T;
}

// text nodes
#[derive(Default)]
pub struct TextValue {
    pub all_nodes: bool,
}

impl DOMProcessor<String> for TextValue {
    fn process(&self, el: &ElementRef) -> String {
        if self.all_nodes {
            el.text().collect::<Vec<_>>().join("")
        } else {
            el.text().next().unwrap_or_default().into()
        }
    }
}

impl TextValue {
    pub fn new() -> TextValue {
        TextValue { all_nodes: false }
    }

    pub fn all_nodes(mut self) -> Self {
        self.all_nodes = true;
        self
    }
}

pub struct AttrValue {
    pub attr: &'static str,
}

impl DOMProcessor<String> for AttrValue {
    fn process(&self, el: &ElementRef) -> String {
        el.attr(self.attr).map(|s| s.into()).unwrap_or_default()
    }
}

impl AttrValue {
    pub fn new(attr: &'static str) -> AttrValue {
        AttrValue { attr }
    }
}

// transformation

pub struct ExtractValue<Out> {
    pub extract: Box<dyn Fn(&ElementRef) -> Out + Sync + Send>,
}

impl<Out> DOMProcessor<Out> for ExtractValue<Out> {
    fn process(&self, el: &ElementRef) -> Out {
        (self.extract)(el)
    }
}

impl<Out: 'static> From<ExtractValue<Out>> for Box<dyn DOMProcessor<Out>> {
    fn from(value: ExtractValue<Out>) -> Self {
        Box::new(value)
    }
}

impl<Out> ExtractValue<Out> {
    pub fn new<Extract>(extract: Extract) -> ExtractValue<Out>
    where
        Extract: Fn(&ElementRef) -> Out + Sync + Send + 'static,
    {
        ExtractValue {
            extract: Box::new(extract),
        }
    }
}

impl<Out: 'static> ExtractValue<Out> {
    pub fn itr_scope(self, selectors: &str) -> ItemsProcessor<Out> {
        ItemsProcessor::new(selectors, self.into())
    }
}

// lists
pub struct ItemsProcessor<Item> {
    pub scope: Selector,
    pub item_processor: Box<dyn DOMProcessor<Item>>,
}

impl<Item> DOMProcessor<Vec<Item>> for ItemsProcessor<Item> {
    fn process(&self, el: &ElementRef) -> Vec<Item> {
        el.select(&self.scope)
            .map(|e| self.item_processor.process(&e))
            .collect()
    }
}

impl<Item> ItemsProcessor<Item> {
    pub fn new(scope: &str, item_processor: Box<dyn DOMProcessor<Item>>) -> ItemsProcessor<Item> {
        ItemsProcessor {
            scope: Selector::parse(scope).unwrap(),
            item_processor,
        }
    }
}

// traversal

/// Walks the elements that follow `start` in document order, skipping the
/// subtree of `start` itself. When a `bound` is given the walk stops once it
/// leaves the bound's subtree.
pub struct ForwardScan<'a> {
    next: Option<NodeRef<'a, Node>>,
    bound: Option<NodeId>,
}

impl<'a> ForwardScan<'a> {
    pub fn after(start: ElementRef<'a>, bound: Option<ElementRef<'a>>) -> Self {
        let bound = bound.map(|b| (*b).id());
        Self {
            next: skip_subtree(*start, bound),
            bound,
        }
    }

    /// First following element whose tag name is one of `names`.
    pub fn find_tag(mut self, names: &[&str]) -> Option<ElementRef<'a>> {
        self.find(|el| names.contains(&el.value().name()))
    }
}

impl<'a> Iterator for ForwardScan<'a> {
    type Item = ElementRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = self.next?;
            self.next = node
                .first_child()
                .or_else(|| skip_subtree(node, self.bound));

            if let Some(el) = ElementRef::wrap(node) {
                return Some(el);
            }
        }
    }
}

fn skip_subtree(node: NodeRef<'_, Node>, bound: Option<NodeId>) -> Option<NodeRef<'_, Node>> {
    let mut current = node;
    loop {
        if Some(current.id()) == bound {
            return None;
        }
        if let Some(sibling) = current.next_sibling() {
            return Some(sibling);
        }
        current = current.parent()?;
    }
}

/// Nearest ancestor of `el` matching `selector`.
pub fn closest<'a>(el: &ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| selector.matches(ancestor))
}
