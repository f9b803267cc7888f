//! Example: a tab panel built from deferred slots

use std::rc::Rc;

use ensemble::{ChildSpec, Composition, Config, Ensemble, Event, Props, SlotCallback};

fn main() -> ensemble::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ensemble=debug")),
        )
        .init();

    let ensemble = Ensemble::new(Config::with_namespace("tabs"));
    let body = ensemble.body().unwrap_or(ensemble::NodeId::ROOT);
    println!("ensemble v{} ready", ensemble::VERSION);

    let nav = ensemble.compo(
        "nav",
        "nav",
        Props::new().children(vec![
            ChildSpec::new("button", "tab", Props::new().set("textContent", "One")),
            ChildSpec::new("button", "tab", Props::new().set("textContent", "Two")),
        ]),
    )?;
    nav.install(body)?;

    let show: SlotCallback = Rc::new(move |panel: &Composition| {
        panel.install(body).ok();
        panel.show().ok();
    });
    let hide: SlotCallback = Rc::new(|panel: &Composition| {
        panel.hide().ok();
    });

    let mut data = ensemble.data();
    for key in ["one", "two"] {
        let slot = data.describe(
            "section",
            ["panel", key],
            Props::new().set("textContent", format!("Panel {key}")),
            true,
            Some(show.clone()),
            Some(hide.clone()),
        )?;
        data.insert(key, slot);
    }

    data.render("one")?;
    data.stale("one")?;
    data.render("two")?;

    let click = ensemble.event("click", &nav);
    let log = Event::listener(|e| println!("click on {:?}", e.target()));
    click.add(&log, false)?;
    if let Some(first) = nav.first() {
        ensemble.event("click", &first).fire()?;
    }
    click.remove(&log)?;

    for node in ensemble.selector("section", None, true) {
        let doc = ensemble.dom().borrow();
        println!(
            "<section class=\"{}\" hidden={}> {}",
            doc.class_name(node),
            doc.is_hidden(node),
            doc.text_content(node)
        );
    }
    Ok(())
}
