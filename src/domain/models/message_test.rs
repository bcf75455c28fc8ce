use anyhow::Result;

use super::Message;
use super::Role;

#[test]
fn it_executes_new() {
    let msg = Message::new(Role::User, "Hi there!");
    assert_eq!(msg.role, Role::User);
    assert_eq!(msg.role.to_string(), "user");
    assert_eq!(msg.content, "Hi there!".to_string());
    assert_eq!(msg.timestamp, None);
}

#[test]
fn it_serializes_without_empty_timestamp() -> Result<()> {
    let msg = Message::user("Hello world");
    insta::assert_snapshot!(serde_json::to_string(&msg)?, @r###"{"role":"user","content":"Hello world"}"###);

    let stamped = Message::user("Hello world").with_timestamp(42);
    insta::assert_snapshot!(serde_json::to_string(&stamped)?, @r###"{"role":"user","content":"Hello world","timestamp":42}"###);

    return Ok(());
}

#[test]
fn it_normalizes_text_parts_into_content() -> Result<()> {
    let msg: Message = serde_json::from_str(
        r#"{"role":"assistant","parts":[{"type":"text","text":"Hello "},{"type":"tool-call","text":"ignored"},{"type":"text","text":"world"}]}"#,
    )?;

    assert_eq!(msg.role, Role::Assistant);
    assert_eq!(msg.content, "Hello world");
    return Ok(());
}

#[test]
fn it_prefers_content_over_parts() -> Result<()> {
    let msg: Message = serde_json::from_str(
        r#"{"role":"user","content":"Plain","parts":[{"type":"text","text":"Parts"}]}"#,
    )?;

    assert_eq!(msg.content, "Plain");
    return Ok(());
}

#[test]
fn it_defaults_to_empty_content_without_parts() -> Result<()> {
    let msg: Message = serde_json::from_str(r#"{"role":"user"}"#)?;
    assert_eq!(msg.content, "");
    return Ok(());
}

#[test]
fn it_rejects_unknown_roles() {
    let res = serde_json::from_str::<Message>(r#"{"role":"system","content":"x"}"#);
    assert!(res.is_err());
}

#[test]
fn it_previews_first_line() {
    let msg = Message::user("First line\nSecond line");
    assert_eq!(msg.preview(70), "First line");

    let long = Message::user(&"a".repeat(80));
    assert_eq!(long.preview(10), "aaaaaaa...");
}
