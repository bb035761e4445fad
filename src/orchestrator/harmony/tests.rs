use super::*;

#[test]
fn tool_calls_take_priority_over_content() {
    let calls = vec![ToolCall {
        id: "1".to_string(),
        name: "web_search".to_string(),
        raw_json_arguments: "{}".to_string(),
    }];
    let parsed = parse_turn("some analysis content", &calls);
    match parsed {
        ParsedTurn::ToolCalls(c) => assert_eq!(c.len(), 1),
        ParsedTurn::Final(_) => panic!("expected tool calls"),
    }
}

#[test]
fn fenced_final_block_extracted() {
    let content = "some chain of thought\n```final\nThe answer is 42\n```";
    match parse_turn(content, &[]) {
        ParsedTurn::Final(text) => assert_eq!(text, "The answer is 42"),
        ParsedTurn::ToolCalls(_) => panic!("expected final"),
    }
}

#[test]
fn tag_final_extracted() {
    let content = "reasoning...\n<final>Answer here</final>";
    match parse_turn(content, &[]) {
        ParsedTurn::Final(text) => assert_eq!(text, "Answer here"),
        ParsedTurn::ToolCalls(_) => panic!("expected final"),
    }
}

#[test]
fn no_marker_returns_trimmed_whole_content() {
    let content = "  just the whole answer  ";
    match parse_turn(content, &[]) {
        ParsedTurn::Final(text) => assert_eq!(text, "just the whole answer"),
        ParsedTurn::ToolCalls(_) => panic!("expected final"),
    }
}

#[test]
fn fenced_marker_wins_when_both_present_and_fenced_is_first() {
    let content = "```final\nFenced answer\n```\n<final>Tag answer</final>";
    match parse_turn(content, &[]) {
        ParsedTurn::Final(text) => assert_eq!(text, "Fenced answer"),
        ParsedTurn::ToolCalls(_) => panic!("expected final"),
    }
}
