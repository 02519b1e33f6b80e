//! Property-based tests for turn routing
//!
//! These tests verify routing invariants hold across arbitrary histories.

use super::state::*;
use super::transition::*;
use super::*;
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_tool_input() -> impl Strategy<Value = ToolInput> {
    prop_oneof![
        Just(ToolInput::ListMovies),
        proptest::option::of("[a-z ]{1,12}")
            .prop_map(|query| ToolInput::SearchMovies(SearchMoviesInput { query })),
        (1i64..1000).prop_map(|movie_id| ToolInput::DeleteMovie(DeleteMovieInput { movie_id })),
        (1i64..1000, 0.0f64..50.0).prop_map(|(movie_id, new_price)| {
            ToolInput::UpdatePrice(UpdatePriceInput {
                movie_id,
                new_price,
            })
        }),
        "[a-z_]{3,12}".prop_map(|name| ToolInput::Unknown {
            name,
            input: json!({}),
        }),
    ]
}

fn arb_tool_call() -> impl Strategy<Value = ToolCall> {
    ("[a-z]{8}", arb_tool_input()).prop_map(|(id, input)| ToolCall::new(id, input))
}

fn arb_message() -> impl Strategy<Value = Message> {
    prop_oneof![
        "[a-zA-Z ]{0,20}".prop_map(|text| Message::System { text }),
        "[a-zA-Z ]{1,20}".prop_map(Message::user),
        (
            "[a-zA-Z ]{0,20}",
            proptest::collection::vec(arb_tool_call(), 0..3)
        )
            .prop_map(|(text, tool_calls)| Message::Assistant { text, tool_calls }),
        ("[a-z]{8}", "[a-zA-Z0-9 ]{0,20}", any::<bool>()).prop_map(
            |(tool_use_id, content, is_error)| Message::ToolResult {
                tool_use_id,
                content,
                is_error,
            }
        ),
    ]
}

fn arb_history() -> impl Strategy<Value = Vec<Message>> {
    proptest::collection::vec(arb_message(), 0..12)
}

fn arb_node() -> impl Strategy<Value = Node> {
    prop_oneof![
        Just(Node::Start),
        Just(Node::Assistant),
        Just(Node::Tools),
        Just(Node::WriteMemory),
        Just(Node::Search),
        Just(Node::Build),
        Just(Node::Confirm),
        Just(Node::Insert),
        Just(Node::End),
    ]
}

fn arb_workflow() -> impl Strategy<Value = Workflow> {
    prop_oneof![Just(Workflow::ToolCalling), Just(Workflow::LookupConfirmInsert)]
}

fn state_with(messages: Vec<Message>) -> ConversationState {
    ConversationState {
        messages,
        ..ConversationState::default()
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Pending tool calls always route to tools
    #[test]
    fn prop_pending_calls_route_to_tools(
        history in arb_history(),
        calls in proptest::collection::vec(arb_tool_call(), 1..4),
        text in "[a-zA-Z ]{0,20}"
    ) {
        let mut messages = history;
        messages.push(Message::Assistant { text, tool_calls: calls });
        prop_assert_eq!(smart_condition(&state_with(messages)), Node::Tools);
    }

    // A tool result at the tail never writes memory
    #[test]
    fn prop_tool_result_tail_skips_memory(
        history in arb_history(),
        id in "[a-z]{8}",
        is_error in any::<bool>()
    ) {
        let mut messages = history;
        messages.push(Message::ToolResult {
            tool_use_id: id,
            content: "ok".to_string(),
            is_error,
        });
        prop_assert_eq!(smart_condition(&state_with(messages)), Node::End);
    }

    // Anything else writes memory before ending
    #[test]
    fn prop_plain_tail_writes_memory(history in arb_history()) {
        let state = state_with(history);
        let expected = match state.last_message() {
            Some(m) if !m.pending_tool_calls().is_empty() => Node::Tools,
            Some(m) if m.is_tool_result() => Node::End,
            _ => Node::WriteMemory,
        };
        let routed = smart_condition(&state);
        prop_assert_eq!(routed, expected);
        if routed == Node::WriteMemory {
            prop_assert_eq!(
                next_node(Workflow::ToolCalling, routed, &state),
                Ok(Node::End)
            );
        }
    }

    // Tools always re-enter the assistant
    #[test]
    fn prop_tools_return_to_assistant(history in arb_history()) {
        prop_assert_eq!(
            next_node(Workflow::ToolCalling, Node::Tools, &state_with(history)),
            Ok(Node::Assistant)
        );
    }

    // Routing never leaves the workflow's own node set
    #[test]
    fn prop_routing_stays_in_workflow(
        workflow in arb_workflow(),
        node in arb_node(),
        history in arb_history(),
        approved in proptest::option::of(any::<bool>())
    ) {
        let mut state = state_with(history);
        state.approved = approved;

        if let Ok(next) = next_node(workflow, node, &state) {
            let allowed: &[Node] = match workflow {
                Workflow::ToolCalling => {
                    &[Node::Assistant, Node::Tools, Node::WriteMemory, Node::End]
                }
                Workflow::LookupConfirmInsert => &[
                    Node::Assistant,
                    Node::Search,
                    Node::Build,
                    Node::Confirm,
                    Node::Insert,
                    Node::End,
                ],
            };
            prop_assert!(allowed.contains(&next), "{} -> {} in {}", node, next, workflow);
        } else {
            prop_assert!(node == Node::End || !matches!(
                (workflow, node),
                (_, Node::Start | Node::Assistant)
                    | (Workflow::ToolCalling, Node::Tools | Node::WriteMemory)
                    | (
                        Workflow::LookupConfirmInsert,
                        Node::Search | Node::Build | Node::Confirm | Node::Insert
                    )
            ));
        }
    }

    // Only an explicit approval reaches insert
    #[test]
    fn prop_insert_requires_approval(approved in proptest::option::of(any::<bool>())) {
        let state = ConversationState {
            approved,
            ..ConversationState::default()
        };
        let next = next_node(Workflow::LookupConfirmInsert, Node::Confirm, &state);
        prop_assert_eq!(next == Ok(Node::Insert), approved == Some(true));
    }
}
