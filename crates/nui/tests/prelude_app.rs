//! A small todo app written against the prelude only.

use nui::prelude::*;
use nui::{Dispatched, Phase};
use nui_harness::AppRegistry;
use pretty_assertions::assert_eq;
use serde_json::json;

struct Todos;

#[derive(Debug, Clone, PartialEq)]
enum Msg {
    Loaded(Vec<String>),
    Add(String),
    Clear,
}

fn submitted() -> impl Decoder<Output = Msg> {
    decode::field("text", decode::string()).map(Msg::Add)
}

impl Program for Todos {
    type Model = Vec<String>;
    type Message = Msg;

    fn init(&self) -> (Vec<String>, Cmd<Msg>) {
        (
            Vec::new(),
            Cmd::task(|| Msg::Loaded(vec!["milk".to_owned(), "eggs".to_owned()])),
        )
    }

    fn update(&self, msg: Msg, model: &Vec<String>) -> (Vec<String>, Cmd<Msg>) {
        match msg {
            Msg::Loaded(items) => (items, Cmd::log("loaded")),
            Msg::Add(item) => {
                let mut next = model.clone();
                next.push(item);
                (next, Cmd::none())
            }
            Msg::Clear => (Vec::new(), Cmd::none()),
        }
    }

    fn view(&self, model: &Vec<String>) -> Node<Msg> {
        let rows = model
            .iter()
            .map(|item| node("Text", vec![], vec![text(format!("{item};"))]))
            .collect();
        node(
            "View",
            vec![],
            vec![
                node("FlatList", vec![], rows),
                void_node("TextInput", vec![on("onSubmitEditing", submitted())]),
                void_node(
                    "Button",
                    vec![
                        property("title", "clear"),
                        on("onPress", decode::succeed(Msg::Clear)),
                    ],
                ),
            ],
        )
    }
}

fn launch() -> nui_harness::AppDriver {
    let mut apps = AppRegistry::new();
    apps.register_startable(program(Todos).named("todos"));
    apps.launch("todos").expect("launch")
}

#[test]
fn task_results_arrive_after_settling() {
    let mut app = launch();
    assert_eq!(app.text(), "");
    assert!(app.settle() > 0);
    assert_eq!(app.text(), "milk;eggs;");
    assert_eq!(app.component().phase(), Phase::Ready);
}

#[test]
fn submitted_text_is_appended_then_cleared() {
    let mut app = launch();
    app.settle();

    let outcome = app
        .fire("TextInput", "onSubmitEditing", &json!({"text": "bread"}))
        .expect("fire");
    assert_eq!(outcome, Dispatched::Delivered);
    assert_eq!(app.text(), "milk;eggs;bread;");

    let outcome = app
        .fire("TextInput", "onSubmitEditing", &json!({"value": "bread"}))
        .expect("fire");
    assert!(matches!(outcome, Dispatched::DecodeFailed(_)));

    app.press("Button").expect("press");
    assert_eq!(app.text(), "");
}
