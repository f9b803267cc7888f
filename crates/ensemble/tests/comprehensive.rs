//! Comprehensive tests for ensemble
//!
//! Construction rules, structural mutation, slots and events through the
//! public API.

use std::cell::RefCell;
use std::rc::Rc;

use ensemble::{
    ChildSpec, Composition, Config, CreationOptions, Data, Ensemble, Error, Event, Locale, Props,
    Slot, SlotCallback,
};

fn ui() -> Ensemble {
    Ensemble::new(Config::with_namespace("ui"))
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

#[test]
fn test_rejected_tags() {
    let ensemble = ui();
    for tag in ["html", "head", "body", "meta", "link", "style", "script", "SCRIPT", "Body"] {
        let result = ensemble.compo(tag, "x", Props::new());
        assert_eq!(result.unwrap_err(), Error::InvalidTagName(tag.to_string()), "{tag}");
    }
}

#[test]
fn test_reserved_props() {
    let ensemble = ui();
    for key in ["attributes", "classList", "innerHTML", "outerHTML", "nodeName", "nodeType"] {
        let result = ensemble.compo("div", "x", Props::new().set(key, "boom"));
        assert_eq!(result.unwrap_err(), Error::InvalidPropertyName(key.to_string()), "{key}");
    }
}

#[test]
fn test_reserved_prop_builds_nothing() {
    let ensemble = ui();
    let before = ensemble.dom().borrow().len();
    let _ = ensemble.compo("div", "x", Props::new().set("innerHTML", "<b>"));
    assert_eq!(ensemble.dom().borrow().len(), before);
    assert_eq!(ensemble.live_compositions(), 0);
}

#[test]
fn test_class_naming() {
    let ensemble = ui();
    let cases: Vec<(ensemble::Name, &str)> = vec![
        ("primary".into(), "ui-primary"),
        (["button", "primary"].into(), "ui-button ui-primary"),
        (vec!["a"].into(), "ui-a"),
    ];
    for (name, expected) in cases {
        let compo = ensemble.builder().tag("button").name(name).build().unwrap();
        assert_eq!(compo.get_attr("class").as_deref(), Some(expected));
    }
}

#[test]
fn test_button_primary_scenario() {
    let ensemble = ui();
    let plain = ensemble.compo("button", "primary", Props::new()).unwrap();
    assert_eq!(plain.class_list().value(), "ui-primary");

    let extra = ensemble
        .builder()
        .tag("button")
        .name("primary")
        .options(CreationOptions::with_class("extra"))
        .build()
        .unwrap();
    assert_eq!(extra.class_list().value(), "ui-primary extra");
}

#[test]
fn test_nested_children_are_named() {
    let ensemble = ui();
    let menu = ensemble
        .compo(
            "nav",
            "menu",
            Props::new().children(vec![
                ChildSpec::new("a", "link", Props::new().set("textContent", "Home")),
                ChildSpec::new(
                    "div",
                    "group",
                    Props::new().children(vec![ChildSpec::new("a", "link", Props::new())]),
                ),
            ]),
        )
        .unwrap();

    let children = menu.children();
    assert_eq!(children.len(), 2);
    assert!(children[0].class_list().contains("ui-link"));
    assert_eq!(children[1].children().len(), 1);
    assert_eq!(children[1].first().unwrap().parent(), Some(children[1].clone()));
}

// ============================================================================
// STRUCTURE
// ============================================================================

#[test]
fn test_append_sets_parent_and_order() {
    let ensemble = ui();
    let list = ensemble.compo("ul", "list", Props::new()).unwrap();
    let items: Vec<Composition> = (0..4)
        .map(|_| ensemble.compo("li", "item", Props::new()).unwrap())
        .collect();

    for item in &items {
        assert_eq!(list.append(item), Ok(true));
        assert_eq!(item.parent(), Some(list.clone()));
    }
    assert_eq!(list.children(), items);
}

#[test]
fn test_empty_any_size() {
    let ensemble = ui();
    for n in 0..5 {
        let list = ensemble.compo("ul", "list", Props::new()).unwrap();
        for _ in 0..n {
            list.append(&ensemble.compo("li", "item", Props::new()).unwrap())
                .unwrap();
        }
        assert_eq!(list.children().len(), n);

        list.empty().unwrap();
        assert!(list.first().is_none());
        assert!(list.children().is_empty());
        assert_eq!(list.owned_len(), 0);
    }
}

#[test]
fn test_empty_releases_dropped_children() {
    let ensemble = ui();
    let list = ensemble.compo("ul", "list", Props::new()).unwrap();
    for _ in 0..3 {
        list.append(&ensemble.compo("li", "item", Props::new()).unwrap())
            .unwrap();
    }
    let before = ensemble.dom().borrow().len();

    list.empty().unwrap();
    assert_eq!(ensemble.dom().borrow().len(), before - 3);
    assert_eq!(ensemble.live_compositions(), 1);
}

#[test]
fn test_install_uninstall_round_trip() {
    let ensemble = ui();
    let body = ensemble.body().unwrap();
    let existing = ensemble.dom().borrow_mut().create_element("main");
    ensemble.dom().borrow_mut().append_child(body, existing).unwrap();
    let before = ensemble.dom().borrow().child_nodes(body);

    let dialog = ensemble.compo("dialog", "modal", Props::new()).unwrap();
    assert_eq!(dialog.install(body), Ok(true));
    assert_eq!(ensemble.dom().borrow().child_nodes(body).len(), before.len() + 1);
    assert_eq!(dialog.uninstall(body), Ok(true));

    assert_eq!(ensemble.dom().borrow().child_nodes(body), before);
}

#[test]
fn test_install_with_callback_runs_first() {
    let ensemble = ui();
    let body = ensemble.body().unwrap();
    let dialog = ensemble.compo("dialog", "modal", Props::new()).unwrap();

    let attached = Rc::new(RefCell::new(None));
    let seen = attached.clone();
    dialog
        .install_with(body, |compo| {
            *seen.borrow_mut() = Some(compo.parent().is_some());
        })
        .unwrap();
    assert_eq!(*attached.borrow(), Some(false));

    dialog.uninstall_with(body, |compo| compo.hide().unwrap()).unwrap();
    assert!(dialog.is_hidden());
}

#[test]
fn test_install_into_composition_owns() {
    let ensemble = ui();
    let host = ensemble.compo("div", "host", Props::new()).unwrap();
    let child = ensemble.compo("span", "child", Props::new()).unwrap();

    child.install(host.node()).unwrap();
    assert_eq!(host.owned_len(), 1);
    child.uninstall(host.node()).unwrap();
    assert_eq!(host.owned_len(), 0);
}

#[test]
fn test_fill_replaces_children() {
    let ensemble = ui();
    let panel = ensemble.compo("div", "panel", Props::new()).unwrap();
    panel.append(&ensemble.compo("p", "old", Props::new()).unwrap()).unwrap();
    panel.append(&ensemble.compo("p", "old", Props::new()).unwrap()).unwrap();

    let fresh = {
        let mut doc = ensemble.dom().borrow_mut();
        let article = doc.create_element("article");
        let text = doc.create_text("hello");
        doc.append_child(article, text).unwrap();
        article
    };
    assert_eq!(panel.fill(fresh), Ok(true));

    let doc = ensemble.dom().borrow();
    assert_eq!(doc.element_children(panel.node()), vec![fresh]);
    assert_eq!(doc.text_content(panel.node()), "hello");
}

#[test]
fn test_fill_script_is_untrusted() {
    let ensemble = ui();
    let panel = ensemble.compo("div", "panel", Props::new()).unwrap();
    let keep = ensemble.compo("p", "keep", Props::new()).unwrap();
    panel.append(&keep).unwrap();

    let script = ensemble.dom().borrow_mut().create_element("SCRIPT");
    assert_eq!(panel.fill(script), Err(Error::UntrustedNode));
    assert_eq!(panel.children(), vec![keep]);
}

#[test]
fn test_fill_with_nested_script_is_untrusted() {
    let ensemble = ui();
    let panel = ensemble.compo("div", "panel", Props::new()).unwrap();
    let wrapper = {
        let mut doc = ensemble.dom().borrow_mut();
        let wrapper = doc.create_element("div");
        let style = doc.create_element("style");
        doc.append_child(wrapper, style).unwrap();
        wrapper
    };
    assert_eq!(panel.fill(wrapper), Err(Error::UntrustedNode));
}

#[test]
fn test_fill_with_composition_node() {
    let ensemble = ui();
    let panel = ensemble.compo("div", "panel", Props::new()).unwrap();
    let card = ensemble.compo("article", "card", Props::new()).unwrap();

    panel.fill(card.node()).unwrap();
    assert_eq!(panel.first(), Some(card));
    assert_eq!(panel.owned_len(), 1);
}

// ============================================================================
// SLOTS
// ============================================================================

fn recorder(log: &Rc<RefCell<Vec<String>>>, what: &'static str) -> SlotCallback {
    let log = log.clone();
    Rc::new(move |compo: &Composition| log.borrow_mut().push(format!("{what}:{}", compo.tag())))
}

#[test]
fn test_slot_lifecycle() {
    let ensemble = ui();
    let mut data = ensemble.data();
    let log = Rc::new(RefCell::new(Vec::new()));

    let slot = data
        .describe(
            "section",
            "page",
            Props::new(),
            true,
            Some(recorder(&log, "fresh")),
            Some(recorder(&log, "stale")),
        )
        .unwrap();
    assert!(matches!(slot, Slot::Deferred(_)));
    data.insert("page", slot);
    assert!(data.compo("page").is_none());

    let first = data.render("page").unwrap();
    let second = data.render("page").unwrap();
    assert_eq!(first.node(), second.node());

    data.stale("page").unwrap();
    let kept = data.reflow("page", false).unwrap().unwrap();
    assert_eq!(kept.node(), first.node());

    let rebuilt = data.reflow("page", true).unwrap().unwrap();
    assert_ne!(rebuilt.node(), first.node());

    assert_eq!(
        *log.borrow(),
        vec![
            "fresh:section",
            "fresh:section",
            "stale:section",
            "fresh:section",
            "fresh:section",
        ]
    );
}

#[test]
fn test_slot_rendered_into_page() {
    let ensemble = ui();
    let body = ensemble.body().unwrap();
    let mut data = ensemble.data();

    let mount: SlotCallback = Rc::new(move |compo: &Composition| {
        compo.install(body).unwrap();
    });
    let slot = data
        .describe("aside", "drawer", Props::new(), true, Some(mount), None)
        .unwrap();
    data.insert("drawer", slot);

    let drawer = data.render("drawer").unwrap();
    assert_eq!(ensemble.selector(".ui-drawer", None, false), vec![drawer.node()]);

    let rebuilt = data.reflow("drawer", true).unwrap().unwrap();
    assert_eq!(ensemble.selector(".ui-drawer", None, true), vec![rebuilt.node()]);
}

#[test]
fn test_data_type_check() {
    let ensemble = ui();
    assert!(Data::is_data(&ensemble.data()));
    assert!(!Data::is_data(&ensemble.fragment().unwrap()));
}

// ============================================================================
// EVENTS
// ============================================================================

#[test]
fn test_event_on_composition_bubbles_to_document() {
    let ensemble = ui();
    let body = ensemble.body().unwrap();
    let button = ensemble.compo("button", "go", Props::new()).unwrap();
    button.install(body).unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    let (a, b) = (log.clone(), log.clone());
    let on_button = Event::listener(move |_| a.borrow_mut().push("button"));
    let on_document = Event::listener(move |_| b.borrow_mut().push("document"));
    ensemble.event("click", &button).add(&on_button, false).unwrap();
    ensemble
        .event("click", ensemble::EventTarget::Document)
        .add(&on_document, false)
        .unwrap();

    ensemble.event("click", &button).fire().unwrap();
    assert_eq!(*log.borrow(), vec!["button", "document"]);
}

#[test]
fn test_handler_prop_sees_composition() {
    let ensemble = ui();
    let toggled = Rc::new(RefCell::new(Vec::new()));
    let seen = toggled.clone();
    let toggle = ensemble
        .compo(
            "button",
            "toggle",
            Props::new().on("click", move |compo, _| {
                let on = compo.class_list().toggle("is-on", None);
                seen.borrow_mut().push(on);
            }),
        )
        .unwrap();

    let click = ensemble.event("click", &toggle);
    click.fire().unwrap();
    click.fire().unwrap();
    assert_eq!(*toggled.borrow(), vec![true, false]);
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[test]
fn test_locale_round_trip() {
    let locale = Locale::markers();
    let json = serde_json::to_string(&locale).unwrap();
    let back: Locale = serde_json::from_str(&json).unwrap();
    assert_eq!(back, locale);
}

#[test]
fn test_config_from_partial_json() {
    let config: Config = serde_json::from_str(r#"{"namespace": "app"}"#).unwrap();
    assert_eq!(config.namespace, "app");
    assert_eq!(config.default_tag, "div");
    assert_eq!(config.locale, Locale::en());

    let ensemble = Ensemble::new(config);
    let compo = ensemble.compo("", "root", Props::new()).unwrap();
    assert_eq!(compo.tag(), "div");
    assert_eq!(compo.get_attr("class").as_deref(), Some("app-root"));
}

#[test]
fn test_localized_errors() {
    let ensemble = ui();
    let err = ensemble.compo("script", "x", Props::new()).unwrap_err();
    assert_eq!(err.localized(&Locale::markers()), "ETAGN: script");
    assert_eq!(
        err.localized(&ensemble.config().locale),
        "Provided tag name \"script\" is not a valid name."
    );
}
