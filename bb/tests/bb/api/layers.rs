use expect_test::expect;

use crate::{new, spans};

#[test]
fn layer_swap_wraps() {
    let mut cx = new("");
    let path = cx.doc("notes.txt");
    cx.session.open(&path).unwrap();
    assert_eq!(cx.current(&path), "flagged");

    cx.run(&path, r#"{"subcommand": "layer_swap", "direction": "next"}"#).unwrap();
    assert_eq!(cx.current(&path), "done");

    cx.run(&path, r#"{"subcommand": "layer_swap", "direction": "next"}"#).unwrap();
    assert_eq!(cx.current(&path), "todo");

    cx.run(&path, r#"{"subcommand": "layer_swap", "direction": "prev"}"#).unwrap();
    assert_eq!(cx.current(&path), "done");
}

#[test]
fn layer_swap_invalid_direction() {
    let mut cx = new("");
    let path = cx.doc("notes.txt");
    cx.session.open(&path).unwrap();

    assert!(cx.run(&path, r#"{"subcommand": "layer_swap", "direction": "up"}"#).is_err());
    assert_eq!(cx.host.errors.len(), 1);
    assert!(cx.host.errors[0].contains("invalid direction `up`"), "{:?}", cx.host.errors);

    assert_eq!(cx.current(&path), "flagged");
    assert_eq!(cx.host.renders, 0);
}

#[test]
fn layer_swap_renders_new_layer() {
    let mut cx = new("");
    let path = cx.doc("notes.txt");
    cx.run(&path, r#"{"subcommand": "mark_line", "line": [[1, 2]], "layer": "done"}"#).unwrap();
    cx.mark(&path, &[[7, 8]]);

    cx.run(&path, r#"{"subcommand": "layer_swap", "direction": "next"}"#).unwrap();
    expect![[r#"
        Some(
            (
                "done",
                "bookmark",
                [
                    1..2,
                ],
            ),
        )
    "#]]
    .assert_debug_eq(&cx.host.rendered);

    // Marks now go to the new current layer.
    cx.mark(&path, &[[3, 4]]);
    assert_eq!(cx.marks(&path, "done"), spans(&[[1, 2], [3, 4]]));
    assert_eq!(cx.marks(&path, "flagged"), spans(&[[7, 8]]));
}

#[test]
fn layer_status_permanent() {
    let mut cx = new("");
    let path = cx.doc("notes.txt");

    cx.run(&path, r#"{"subcommand": "layer_swap", "direction": "next"}"#).unwrap();
    assert_eq!(cx.host.status.as_deref(), Some("Bookmark Layer: done"));
    assert!(cx.host.messages.is_empty());
    assert!(cx.host.popups.is_empty());
}

#[test]
fn layer_status_surfaces() {
    let mut cx = new(r#""layer_status_location": ["temporary", "popup"]"#);
    let path = cx.doc("notes.txt");
    cx.host.status = Some("stale".to_string());

    cx.run(&path, r#"{"subcommand": "layer_swap", "direction": "prev"}"#).unwrap();
    cx.run(&path, r#"{"subcommand": "layer_swap", "direction": "prev"}"#).unwrap();
    assert_eq!(cx.host.messages, ["todo", "done"]);
    assert_eq!(cx.host.popups, ["todo", "done"]);
    assert_eq!(cx.host.status, None);
}
