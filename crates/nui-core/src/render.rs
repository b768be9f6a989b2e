#![forbid(unsafe_code)]

//! Tree renderer: virtual nodes to host elements.
//!
//! Rendering is a pure function of `(node, scope)` plus the host's factories:
//!
//! - text nodes become [`Rendered::Text`] unchanged;
//! - tagger nodes collapse with any directly nested tagger nodes into one
//!   new [`EventScope`], and their first non-tagger descendant is rendered
//!   under it;
//! - component nodes render their children in the same scope, assemble
//!   [`Props`] from their facts in order and ask the [`Host`] for an element.
//!
//! No state survives between passes: every call builds new scopes and new
//! event handlers.

use std::rc::Rc;

use tracing::trace_span;

use crate::handler::EventHandler;
use crate::host::Host;
use crate::message::Tagger;
use crate::node::{Component, FactKind, Node, NodeKind, TaggerNode};
use crate::props::{PropValue, Props, Rendered, STYLE_KEY};
use crate::scope::{EventScope, TaggerChain};

/// Render `node` under `scope` into host elements.
pub fn render<Msg, H>(node: &Node<Msg>, scope: &Rc<EventScope>, host: &H) -> Rendered<H::Element>
where
    H: Host + ?Sized,
{
    let _span = trace_span!("nui.render", scope_depth = scope.depth()).entered();
    render_kind(node.kind(), scope, host)
}

/// Render an untyped node. The caller vouches that `scope` dispatches into
/// a sink expecting the node's message type.
pub fn render_kind<H>(node: &NodeKind, scope: &Rc<EventScope>, host: &H) -> Rendered<H::Element>
where
    H: Host + ?Sized,
{
    match node {
        NodeKind::Text(text) => Rendered::Text(text.clone()),
        NodeKind::Tagger(tagger) => render_tagger(tagger, scope, host),
        NodeKind::Component(component) => {
            Rendered::Element(render_component(component, scope, host))
        }
    }
}

/// Collect the taggers of a run of directly nested tagger nodes, outermost
/// first, and return the first non-tagger descendant.
pub fn flatten_taggers(node: &TaggerNode) -> (Vec<Tagger>, &NodeKind) {
    let mut taggers = vec![node.tagger().clone()];
    let mut current = node.child();
    while let NodeKind::Tagger(inner) = current {
        taggers.push(inner.tagger().clone());
        current = inner.child();
    }
    (taggers, current)
}

fn render_tagger<H>(node: &TaggerNode, scope: &Rc<EventScope>, host: &H) -> Rendered<H::Element>
where
    H: Host + ?Sized,
{
    let (taggers, child) = flatten_taggers(node);
    let scope = EventScope::child(scope, TaggerChain::from_taggers(taggers));
    render_kind(child, &scope, host)
}

fn render_component<H>(node: &Component, scope: &Rc<EventScope>, host: &H) -> H::Element
where
    H: Host + ?Sized,
{
    let children: Vec<_> = node
        .children()
        .iter()
        .map(|child| render_kind(child, scope, host))
        .collect();

    let mut props = Props::new();
    for fact in node.facts() {
        match fact {
            FactKind::Property { name, value } => {
                props.set(name.as_str(), PropValue::Value(value.clone()));
            }
            FactKind::Event { name, decoder } => {
                let handler = EventHandler::new(Rc::clone(scope), name.as_str(), Rc::clone(decoder));
                props.set(name.as_str(), PropValue::Handler(handler));
            }
            FactKind::Style(style) => {
                props.set(STYLE_KEY, PropValue::Style(style.clone()));
            }
        }
    }
    props.set_children(children);

    host.create_element(node.tag(), props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;
    use crate::message::downcast;
    use crate::node::{map, node, on, property, style, text, void_node};
    use crate::props::Children;
    use crate::scope::DispatchSlot;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use std::cell::RefCell;

    /// Minimal host: keeps tag and props.
    struct Echo;

    #[derive(Debug)]
    struct El {
        tag: String,
        props: Props<El>,
    }

    impl Host for Echo {
        type Element = El;

        fn create_element(&self, tag: &str, props: Props<El>) -> El {
            El {
                tag: tag.to_owned(),
                props,
            }
        }
    }

    fn element(rendered: Rendered<El>) -> El {
        match rendered {
            Rendered::Element(el) => el,
            Rendered::Text(t) => panic!("expected element, got text {t:?}"),
        }
    }

    fn root_with_sink() -> (Rc<EventScope>, Rc<RefCell<Vec<String>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let slot = DispatchSlot::new();
        let sink_seen = Rc::clone(&seen);
        slot.install(Rc::new(move |msg| {
            if let Ok(s) = downcast::<String>(msg) {
                sink_seen.borrow_mut().push(s);
            }
        }));
        (EventScope::root(slot), seen)
    }

    #[test]
    fn text_renders_as_is() {
        let (root, _) = root_with_sink();
        let n: Node<String> = text("hello");
        assert_eq!(render(&n, &root, &Echo).as_text(), Some("hello"));
    }

    #[test]
    fn component_props_follow_fact_order() {
        let (root, _) = root_with_sink();
        let n: Node<String> = void_node(
            "TextInput",
            vec![
                property("placeholder", "name"),
                style([("color", "red")]),
                on("onChangeText", decode::string()),
                style([("color", "blue")]),
                property("placeholder", "who"),
            ],
        );
        let el = element(render(&n, &root, &Echo));
        assert_eq!(el.tag, "TextInput");
        assert_eq!(
            el.props.keys().collect::<Vec<_>>(),
            ["placeholder", "style", "onChangeText"]
        );
        assert_eq!(
            el.props.get("placeholder").and_then(PropValue::as_value),
            Some(&json!("who"))
        );
        let style = el.props.style().expect("style prop");
        assert_eq!(Value::Object(style.clone()), json!({"color": "blue"}));
        assert!(el.props.children().is_none());
    }

    #[test]
    fn children_arity() {
        let (root, _) = root_with_sink();
        let one: Node<String> = node("View", vec![], vec![text("a")]);
        let el = element(render(&one, &root, &Echo));
        assert!(matches!(
            el.props.children(),
            Some(Children::Single(only)) if only.as_text() == Some("a")
        ));

        let many: Node<String> = node(
            "View",
            vec![],
            vec![text("a"), void_node("Image", vec![]), text("c")],
        );
        let el = element(render(&many, &root, &Echo));
        let Some(Children::List(list)) = el.props.children() else {
            panic!("expected list of children");
        };
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].as_text(), Some("a"));
        assert_eq!(list[1].as_element().map(|e| e.tag.as_str()), Some("Image"));
        assert_eq!(list[2].as_text(), Some("c"));
    }

    #[test]
    fn nested_taggers_share_one_scope() {
        let (root, seen) = root_with_sink();
        let leaf: Node<i64> = void_node("Button", vec![on("onPress", decode::succeed(2_i64))]);
        let n: Node<String> = map(
            |n: i64| format!("outer({n})"),
            map(|n: i64| n * 10, map(|n: i64| n + 1, leaf)),
        );

        let NodeKind::Tagger(t) = n.kind() else {
            panic!("expected tagger");
        };
        let (taggers, stop) = flatten_taggers(t);
        assert_eq!(taggers.len(), 3);
        assert!(matches!(stop, NodeKind::Component(_)));

        let el = element(render(&n, &root, &Echo));
        let handler = el.props.handler("onPress").expect("handler");
        assert_eq!(handler.scope().depth(), 1);
        assert_eq!(handler.scope().chain().len(), 3);
        handler.call(&Value::Null);
        assert_eq!(*seen.borrow(), ["outer(30)"]);
    }

    #[test]
    fn separated_taggers_create_separate_scopes() {
        let (root, seen) = root_with_sink();
        let leaf: Node<i64> = void_node("Button", vec![on("onPress", decode::succeed(1_i64))]);
        let inner: Node<i64> = node("View", vec![], vec![leaf.map(|n: i64| n + 1)]);
        let n: Node<String> = inner.map(|n: i64| n.to_string());

        let outer = element(render(&n, &root, &Echo));
        let Some(Children::Single(child)) = outer.props.children() else {
            panic!("expected one child");
        };
        let button = child.as_element().expect("button element");
        let handler = button.props.handler("onPress").expect("handler");
        assert_eq!(handler.scope().depth(), 2);
        handler.call(&Value::Null);
        assert_eq!(*seen.borrow(), ["2"]);
    }

    #[test]
    fn component_children_reuse_scope() {
        let (root, _) = root_with_sink();
        let n: Node<String> = node(
            "View",
            vec![on("onLayout", decode::succeed(String::new()))],
            vec![void_node("Button", vec![on("onPress", decode::succeed(String::new()))])],
        );
        let el = element(render(&n, &root, &Echo));
        let outer = el.props.handler("onLayout").expect("outer handler");
        let Some(Children::Single(child)) = el.props.children() else {
            panic!("expected one child");
        };
        let inner = child
            .as_element()
            .and_then(|b| b.props.handler("onPress"))
            .expect("inner handler");
        assert!(Rc::ptr_eq(outer.scope(), &root));
        assert!(Rc::ptr_eq(inner.scope(), &root));
    }

    #[test]
    fn every_pass_builds_fresh_handlers() {
        let (root, _) = root_with_sink();
        let n: Node<String> = void_node("Button", vec![on("onPress", decode::succeed(String::new()))]);
        let first = element(render(&n, &root, &Echo));
        let second = element(render(&n, &root, &Echo));
        let a = first.props.handler("onPress").expect("handler");
        let b = second.props.handler("onPress").expect("handler");
        assert!(!a.ptr_eq(b));
    }
}
