//! Block canvas engine for the jigsaw editor.
//!
//! This crate is compiled to WebAssembly and runs in the browser, but every
//! piece of editor logic lives in plain Rust types that also build natively.
//! It owns the block arena, the geometry of stackable and container blocks,
//! the pointer-driven drag/pan/snap state machine, and the projection of that
//! state into a drawable scene. The host layer only forwards pointer events
//! and consumes the returned [`engine::Action`]s (most importantly the
//! generated program text).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine, testable [`engine::EngineCore`], and the pure [`engine::step`] transition |
//! | [`doc`] | Block types and the arena store |
//! | [`graph`] | Walking `next`/`child` relations, detaching blocks |
//! | [`geometry`] | Block and container sizing, interior overlap tests |
//! | [`snap`] | Snap-candidate search and commit |
//! | [`input`] | Pointer events and the gesture state |
//! | [`camera`] | Pan offset and coordinate conversions |
//! | [`codegen`] | Program text emitted from the block list |
//! | [`label`] | Splitting block text into renderable parts |
//! | [`scene`] | Read-only projection of editor state into shapes and connectors |
//! | [`hit`] | Finding the block under the pointer |
//! | [`render`] | Canvas2D painter for a [`scene::Scene`] |
//! | [`layout`] | Tunable geometry settings |
//! | [`consts`] | Default numeric constants |

pub mod camera;
pub mod codegen;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod graph;
pub mod hit;
pub mod input;
pub mod label;
pub mod layout;
pub mod render;
pub mod scene;
pub mod snap;
