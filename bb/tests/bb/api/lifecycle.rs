use std::fs;

use bb::{Command, DocumentState, Span};

use crate::{new, spans};

#[test]
fn marks_survive_restart() {
    let mut cx = new("");
    let path = cx.doc("notes.txt");
    cx.mark(&path, &[[3, 7], [10, 10]]);
    cx.run(&path, r#"{"subcommand": "layer_swap", "direction": "next"}"#).unwrap();
    cx.mark(&path, &[[1, 1]]);
    assert_eq!(cx.session.document(&path).unwrap().state(), DocumentState::Modified);

    cx.run(&path, r#"{"subcommand": "on_save"}"#).unwrap();
    assert_eq!(cx.session.document(&path).unwrap().state(), DocumentState::Saved);
    assert!(cx.session.cache().exists(&path));

    cx.restart();
    assert!(cx.session.on_activated(&mut cx.host, &path).unwrap());
    assert_eq!(cx.marks(&path, "flagged"), spans(&[[3, 7], [10, 10]]));
    assert_eq!(cx.marks(&path, "done"), spans(&[[1, 1]]));
    // Loading resets to the default layer.
    assert_eq!(cx.current(&path), "flagged");
    assert_eq!(cx.host.status.as_deref(), Some("Bookmark Layer: flagged"));
    assert_eq!(cx.host.rendered.as_ref().unwrap().2, spans(&[[3, 7], [10, 10]]));
    assert_eq!(cx.session.document(&path).unwrap().state(), DocumentState::Loaded);
}

#[test]
fn only_first_activation_loads() {
    let mut cx = new("");
    let a = cx.doc("a.txt");
    let b = cx.doc("b.txt");
    cx.mark(&b, &[[1, 2]]);
    cx.run(&b, r#"{"subcommand": "on_save"}"#).unwrap();

    cx.restart();
    assert!(cx.session.on_activated(&mut cx.host, &a).unwrap());
    assert!(!cx.session.on_activated(&mut cx.host, &b).unwrap());
    assert!(cx.marks(&b, "flagged").is_empty());
    assert_eq!(cx.session.document(&b).unwrap().state(), DocumentState::Unloaded);

    cx.session.reset_latch();
    assert!(cx.session.on_activated(&mut cx.host, &b).unwrap());
    assert_eq!(cx.marks(&b, "flagged"), spans(&[[1, 2]]));
}

#[test]
fn load_on_open_is_opt_in() {
    for (enabled, expected) in [(false, vec![]), (true, spans(&[[4, 5]]))] {
        let mut cx = new(&format!(r#""uncache_marks_on_load": {enabled}"#));
        let path = cx.doc("notes.txt");
        cx.mark(&path, &[[4, 5]]);
        cx.run(&path, r#"{"subcommand": "on_save"}"#).unwrap();

        cx.restart();
        cx.session.on_loaded(&mut cx.host, &path).unwrap();
        assert_eq!(cx.marks(&path, "flagged"), expected);
    }
}

#[test]
fn loading_twice_keeps_marks() {
    let mut cx = new(r#""uncache_marks_on_load": true"#);
    let path = cx.doc("notes.txt");
    cx.mark(&path, &[[4, 5]]);
    cx.run(&path, r#"{"subcommand": "on_save"}"#).unwrap();

    // The host reports the load and then the first activation.
    cx.restart();
    cx.session.on_loaded(&mut cx.host, &path).unwrap();
    assert!(cx.session.on_activated(&mut cx.host, &path).unwrap());
    assert_eq!(cx.marks(&path, "flagged"), spans(&[[4, 5]]));
}

#[test]
fn toggle_restore_cancels_on_second_load() {
    let mut cx = new(r#""restore_mode": "toggle""#);
    let path = cx.doc("notes.txt");
    cx.mark(&path, &[[4, 5]]);
    cx.run(&path, r#"{"subcommand": "on_save"}"#).unwrap();

    cx.restart();
    cx.run(&path, r#"{"subcommand": "on_load"}"#).unwrap();
    assert_eq!(cx.marks(&path, "flagged"), spans(&[[4, 5]]));
    cx.run(&path, r#"{"subcommand": "on_load"}"#).unwrap();
    assert!(cx.marks(&path, "flagged").is_empty());
}

#[test]
fn save_on_save_is_opt_in() {
    for enabled in [false, true] {
        let mut cx = new(&format!(r#""cache_marks_on_save": {enabled}"#));
        let path = cx.doc("notes.txt");
        cx.mark(&path, &[[4, 5]]);
        cx.session.on_pre_save(&mut cx.host, &path).unwrap();
        assert_eq!(cx.session.cache().exists(&path), enabled);
    }
}

#[test]
fn empty_document_is_not_cached() {
    let mut cx = new(r#""cache_marks_on_save": true"#);
    let path = cx.doc("notes.txt");
    cx.session.on_pre_save(&mut cx.host, &path).unwrap();
    assert!(!cx.session.cache().exists(&path));

    cx.mark(&path, &[[4, 5]]);
    cx.mark(&path, &[[4, 5]]);
    cx.session.on_pre_save(&mut cx.host, &path).unwrap();
    assert!(!cx.session.cache().exists(&path));
}

#[test]
fn close_caches_marks() {
    let mut cx = new(r#""cache_marks_on_close": true"#);
    let path = cx.doc("notes.txt");
    cx.mark(&path, &[[4, 5]]);

    cx.session.on_closed(&mut cx.host, Some(&path)).unwrap();
    assert!(cx.session.document(&path).is_none());
    let entry = cx.session.cache().load(&path).unwrap();
    assert_eq!(entry.bookmarks.get("flagged").unwrap(), [Span::new(4, 5)]);
}

#[test]
fn close_without_caching_discards_marks() {
    let mut cx = new("");
    let path = cx.doc("notes.txt");
    cx.mark(&path, &[[4, 5]]);

    cx.session.on_closed(&mut cx.host, Some(&path)).unwrap();
    assert!(!cx.session.cache().exists(&path));
    assert!(cx.session.document(&path).is_none());
}

#[test]
fn close_cleans_up_stale_cache() {
    let mut cx = new(r#""cleanup_empty_cache_on_close": true"#);
    let path = cx.doc("notes.txt");
    cx.mark(&path, &[[4, 5]]);
    cx.run(&path, r#"{"subcommand": "on_save"}"#).unwrap();
    assert!(cx.session.cache().exists(&path));

    cx.run(&path, r#"{"subcommand": "clear_all"}"#).unwrap();
    cx.session.on_closed(&mut cx.host, Some(&path)).unwrap();
    assert!(!cx.session.cache().exists(&path));
    assert!(cx.session.cache().load(&path).is_none());
}

#[test]
fn close_keeps_cache_of_marked_document() {
    let mut cx = new(r#""cleanup_empty_cache_on_close": true"#);
    let path = cx.doc("notes.txt");
    cx.mark(&path, &[[4, 5]]);
    cx.run(&path, r#"{"subcommand": "on_save"}"#).unwrap();

    cx.session.on_closed(&mut cx.host, Some(&path)).unwrap();
    assert!(cx.session.cache().exists(&path));
}

#[test]
fn close_cleanup_is_opt_in() {
    let mut cx = new("");
    let path = cx.doc("notes.txt");
    cx.mark(&path, &[[4, 5]]);
    cx.run(&path, r#"{"subcommand": "on_save"}"#).unwrap();
    cx.run(&path, r#"{"subcommand": "clear_all"}"#).unwrap();

    cx.session.on_closed(&mut cx.host, Some(&path)).unwrap();
    assert!(cx.session.cache().exists(&path));
}

#[test]
fn cleared_marks_stay_cleared() {
    let mut cx = new(r#""cache_marks_on_save": true"#);
    let path = cx.doc("notes.txt");
    cx.mark(&path, &[[4, 5]]);
    cx.session.on_pre_save(&mut cx.host, &path).unwrap();
    assert!(cx.session.cache().exists(&path));

    cx.run(&path, r#"{"subcommand": "clear_all"}"#).unwrap();
    cx.session.on_pre_save(&mut cx.host, &path).unwrap();
    assert!(!cx.session.cache().exists(&path));

    cx.restart();
    assert!(cx.session.on_activated(&mut cx.host, &path).unwrap());
    assert!(cx.marks(&path, "flagged").is_empty());
}

#[test]
fn close_unnamed_document() {
    let mut cx = new(r#""cache_marks_on_close": true"#);
    cx.session.on_closed(&mut cx.host, None).unwrap();
    assert_eq!(cx.session.documents().count(), 0);
}

#[test]
fn cursor_order_is_persisted() {
    for (settings, expected) in [("", [3, 9]), (r#""ignore_cursor": false"#, [9, 3])] {
        let mut cx = new(settings);
        let path = cx.doc("notes.txt");
        cx.mark(&path, &[[9, 3]]);
        cx.run(&path, r#"{"subcommand": "on_save"}"#).unwrap();

        let entry = cx.session.cache().load(&path).unwrap();
        assert_eq!(entry.bookmarks.get("flagged").unwrap(), [Span::from(expected)]);
    }
}

#[test]
fn unconfigured_layers_are_retained() {
    let mut cx = new("");
    let path = cx.doc("notes.txt");
    let cache_path = cx.session.cache().path_for(&path);
    let json = serde_json::json!({
        "filename": path,
        "bookmarks": { "flagged": [[1, 2]], "archived": [[5, 6]] },
    });
    fs::write(&cache_path, json.to_string()).unwrap();

    cx.run(&path, r#"{"subcommand": "on_load"}"#).unwrap();
    assert_eq!(cx.marks(&path, "flagged"), spans(&[[1, 2]]));

    cx.mark(&path, &[[3, 4]]);
    cx.run(&path, r#"{"subcommand": "on_save"}"#).unwrap();
    let entry = cx.session.cache().load(&path).unwrap();
    assert_eq!(entry.bookmarks.get("archived").unwrap(), [Span::new(5, 6)]);
    assert_eq!(entry.bookmarks.get("flagged").unwrap(), [Span::new(1, 2), Span::new(3, 4)]);
}

#[test]
fn close_cleanup_keeps_unconfigured_layers() {
    let mut cx = new(r#""cache_marks_on_close": true, "cleanup_empty_cache_on_close": true"#);
    let path = cx.doc("notes.txt");
    let json = serde_json::json!({ "filename": path, "bookmarks": { "archived": [[5, 6]] } });
    fs::write(cx.session.cache().path_for(&path), json.to_string()).unwrap();

    cx.run(&path, r#"{"subcommand": "on_load"}"#).unwrap();
    let engine = cx.session.document(&path).unwrap();
    assert!(engine.store().is_empty(engine.ring()));
    assert_eq!(cx.marks(&path, "archived"), spans(&[[5, 6]]));

    cx.session.on_closed(&mut cx.host, Some(&path)).unwrap();
    let entry = cx.session.cache().load(&path).unwrap();
    assert_eq!(entry.bookmarks.get("archived").unwrap(), [Span::new(5, 6)]);
}

#[test]
fn malformed_cache_is_ignored() {
    let mut cx = new("");
    let path = cx.doc("notes.txt");
    fs::write(cx.session.cache().path_for(&path), "[1, 2").unwrap();

    cx.session.execute(&mut cx.host, &path, Command::OnLoad).unwrap();
    assert!(cx.marks(&path, "flagged").is_empty());
    assert!(cx.host.errors.is_empty());
    assert_eq!(cx.current(&path), "flagged");
}

#[test]
fn failed_save_does_not_abort() {
    let mut cx = new("");
    let path = cx.doc("notes.txt");
    cx.mark(&path, &[[4, 5]]);
    // A directory where the cache file should go makes the write fail.
    fs::create_dir(cx.session.cache().path_for(&path)).unwrap();

    cx.run(&path, r#"{"subcommand": "on_save"}"#).unwrap();
    assert!(cx.host.errors.is_empty());
    assert_eq!(cx.session.document(&path).unwrap().state(), DocumentState::Modified);

    let files = fs::read_dir(cx.session.cache().dir()).unwrap().count();
    assert_eq!(files, 1, "only the directory in the way remains");
}
