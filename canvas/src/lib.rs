//! Drawing and sync engine for the collaborative whiteboard.
//!
//! This crate runs in the browser as WebAssembly and natively inside the
//! CLI. It owns the full lifecycle of a board: translating pointer input into
//! shapes, keeping the local shape list consistent with the persisted event
//! log and with peers on the relay, hit-testing for the eraser, and redrawing
//! the scene. Hosts only wire input events and transports to a
//! [`session::DrawingSession`] (or drive [`engine::EngineCore`] directly and
//! process the returned [`engine::Action`]s).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Async orchestrator over the engine, store, relay, and surface |
//! | [`engine`] | Browser [`engine::Engine`] and testable [`engine::EngineCore`] |
//! | [`sync`] | Shape-list owner: optimistic mutations and remote reconciliation |
//! | [`doc`] | Shape types, wire encoding, and the ordered shape list |
//! | [`input`] | Tools and the gesture state machine |
//! | [`hit`] | Hit-testing against shapes |
//! | [`render`] | Full-scene redraw through the [`render::Surface`] trait |
//! | [`geom`] | Points, distances, and arrowhead geometry |
//! | [`consts`] | Shared tolerances, stroke style, and defaults |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod geom;
pub mod hit;
pub mod input;
pub mod render;
pub mod session;
pub mod sync;
