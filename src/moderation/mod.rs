// Text moderation: trait-based abstraction over the upstream classifier.
//
// The ModerationService trait defines the interface. OpenAiModerator
// implements it against the OpenAI Moderation API. Handlers only ever see
// the trait, so tests swap in a fake without touching the network.

pub mod openai;
pub mod request;
pub mod traits;
pub mod verdict;
