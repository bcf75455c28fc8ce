/// A conversation list as older versions of the hub stored it: messages in the
/// `parts` shape, a blank title, a malformed message list, an entry without an
/// id and a duplicated id.
pub fn legacy_conversations_fixture() -> &'static str {
    return r#"
[
  {
    "id": "c-2",
    "title": "Explain RAG",
    "messages": [
      { "role": "user", "parts": [{ "type": "text", "text": "Explain RAG" }] },
      { "role": "assistant", "content": "Retrieval augmented generation pairs search with generation." }
    ],
    "model": "anthropic/claude-sonnet-4-6",
    "createdAt": 1717000000002
  },
  {
    "id": "c-1",
    "title": "",
    "messages": "broken",
    "model": "openai/gpt-5",
    "createdAt": 1717000000001
  },
  {
    "title": "Missing id"
  },
  {
    "id": "c-2",
    "title": "Duplicate",
    "messages": [],
    "model": "xai/grok-4",
    "createdAt": 1717000000000
  }
]
"#
    .trim();
}

/// A hub preference blob wrapped in the persistence envelope.
pub fn hub_state_fixture() -> &'static str {
    return r#"
{
  "state": {
    "hasSeenIntro": true,
    "selectedModel": "openai/gpt-5",
    "messages": [
      { "role": "user", "content": "Hello hub", "timestamp": 1717000000000 }
    ]
  },
  "version": 0
}
"#
    .trim();
}
