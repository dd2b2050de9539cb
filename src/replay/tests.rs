//! Replay module tests

use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;
use crate::config::TopicsConfig;
use crate::hooks::DefaultHooks;

#[test]
fn test_parse_commands() {
    assert_eq!(
        Command::parse("sub a/+/c"),
        Ok(Some(Command::Subscribe("a/+/c".to_string())))
    );
    assert_eq!(
        Command::parse("  unsub   a/#  "),
        Ok(Some(Command::Unsubscribe("a/#".to_string())))
    );
    assert_eq!(
        Command::parse("has a/b/c"),
        Ok(Some(Command::HasSubscribers("a/b/c".to_string())))
    );
    assert_eq!(Command::parse("size"), Ok(Some(Command::Size)));
    assert_eq!(Command::parse("sweep"), Ok(Some(Command::Sweep)));
    assert_eq!(
        Command::parse("sleep 1.5"),
        Ok(Some(Command::Sleep(Duration::from_millis(1500))))
    );
}

#[test]
fn test_parse_skips_blank_and_comments() {
    assert_eq!(Command::parse(""), Ok(None));
    assert_eq!(Command::parse("   "), Ok(None));
    assert_eq!(Command::parse("# sub a"), Ok(None));
}

#[test]
fn test_parse_errors() {
    assert!(Command::parse("sub").is_err());
    assert!(Command::parse("publish a").is_err());
    assert!(Command::parse("sleep soon").is_err());
    assert!(Command::parse("sleep -1").is_err());
}

#[test]
fn test_parse_script_reports_line() {
    let script = "sub a\n\nbogus\n";
    match parse_script(script) {
        Err(ReplayError::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_run_script() {
    let script = "\
# sensor readings
sub sensors/+/temp
size
has sensors/42/temp
has sensors/42/humidity
unsub sensors/+/temp
has sensors/42/temp
size
sleep 31
sweep
size
";
    let commands = parse_script(script).unwrap();
    let manager = TopicManager::with_config(
        Arc::new(DefaultHooks),
        TopicsConfig {
            cleanup_interval: Duration::from_secs(3600),
            cleanup_threshold: Duration::from_secs(30),
        },
    );

    let mut out = Vec::new();
    run(&manager, &commands, &mut out).await.unwrap();

    let output = String::from_utf8(out).unwrap();
    assert_eq!(
        output,
        "\
size 1 (active 1)
has sensors/42/temp true
has sensors/42/humidity false
has sensors/42/temp false
size 1 (active 0)
sweep removed 1
size 0 (active 0)
"
    );
}
