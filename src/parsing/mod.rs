pub mod senml_parser;

pub use senml_parser::{envelope_records, parse_envelope, MessageEnvelope};
