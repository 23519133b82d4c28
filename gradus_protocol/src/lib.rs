// Gradus wire protocol.
//
// The vocabulary shared between the counterpoint engine and the training
// UI/transport layer (which is not part of this workspace). Two halves:
// - `types.rs`: the small closed enums and note/violation records.
// - `message.rs`: the request/report envelopes exchanged per validation call.
//
// All types derive `Serialize`/`Deserialize`; the transport is JSON. This
// crate holds no rule logic — the engine crate interprets these shapes, the
// UI renders them. Keeping the vocabulary separate means neither side drags
// in the other's dependencies.

pub mod message;
pub mod types;
