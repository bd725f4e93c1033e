//! Scripted sessions through the line front end.

mod common;

use common::fixtures::{cramming, start};
use common::TestContext;
use vocab_study::cli::run_session;

async fn transcript(ctx: &TestContext, script: &str) -> String {
    let mut driver = ctx.driver();
    let mut out = Vec::new();
    run_session(&mut driver, script.as_bytes(), &mut out)
        .await
        .expect("session should run");
    String::from_utf8(out).expect("output should be utf-8")
}

#[tokio::test]
async fn test_reveal_rate_and_finish() {
    let mut item = cramming("Haus", "house", 2, start());
    item.content.plural = Some("Häuser".to_string());
    let ctx = TestContext::new(vec![item]);

    let out = transcript(&ctx, "show\neasy\nquit\n").await;

    assert!(out.starts_with("[Final Round] Haus    (due 0/0/1)\n"), "{out}");
    assert!(out.contains("  = house (pl. Häuser)\n"), "{out}");
    assert!(out.contains("rate: very_hard | hard | medium | easy | finish\n"), "{out}");
    assert!(out.contains("Haus: next review 2026-03-09 10:00\n"), "{out}");
    assert!(out.ends_with("Nothing due. Session complete.\n"), "{out}");
}

#[tokio::test]
async fn test_bad_rating_is_reported_and_item_kept() {
    let ctx = TestContext::new(vec![cramming("Haus", "house", 0, start())]);

    let out = transcript(&ctx, "meh\n").await;

    assert!(out.contains("error: Schedule error: invalid rating: \"meh\""), "{out}");
    assert_eq!(out.matches("[Round 1/3] Haus").count(), 2, "{out}");
    assert_eq!(ctx.stored("Haus").version, 1);
}

#[tokio::test]
async fn test_add_from_empty_collection() {
    let ctx = TestContext::new(vec![]);

    let out = transcript(&ctx, "add Baum = tree\nadd Baum\nadd Baum = tree\n").await;

    assert!(out.contains("Added Baum\n"), "{out}");
    assert!(out.contains("usage: add <term> = <translation>\n"), "{out}");
    assert!(out.contains("error: Duplicate item: Baum\n"), "{out}");
    assert_eq!(ctx.stored("Baum").content.translation, "tree");
}

#[tokio::test]
async fn test_edit_shown_item() {
    let mut item = cramming("Haus", "house", 1, start());
    item.content.plural = Some("Häuser".to_string());
    let ctx = TestContext::new(vec![item]);

    let out = transcript(&ctx, "edit Haus = house, home\nedit Haus\nshow\n").await;

    assert!(out.contains("Edited Haus\n"), "{out}");
    assert!(out.contains("usage: edit <term> = <translation>\n"), "{out}");
    assert!(out.contains("  = house, home (pl. Häuser)\n"), "{out}");
    let stored = ctx.stored("Haus");
    assert_eq!(stored.content.translation, "house, home");
    assert_eq!(stored.content.plural.as_deref(), Some("Häuser"));
    assert_eq!(stored.due_at, Some(start()));
    assert_eq!(stored.version, 2);
}
