// ABOUTME: Protocol module for the shadowrelay wire format
// ABOUTME: Defines the tagged envelope exchanged over room connections

mod messages;

pub use messages::Envelope;
