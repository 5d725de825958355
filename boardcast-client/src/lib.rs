//! # Boardcast Client
//!
//! Client-side engine for the shared task board: the pieces a UI embeds
//! to stay in sync with the server without owning any sync logic itself.
//!
//! ## Modules
//!
//! - `planner`: turns a drag gesture into a minimal placement batch
//! - `reconciler`: local board state plus idempotent event reducers
//! - `activity`: TTL cache over the board history feed
//! - `socket`: reconnecting websocket subscriber
//! - `api`: HTTP client for the board API
//!
//! ## Example
//!
//! ```no_run
//! use boardcast_client::planner::{plan_reorder, DragInput};
//!
//! # fn example(lists: &[boardcast_shared::models::board::ListWithTasks], input: DragInput) {
//! match plan_reorder(lists, input) {
//!     Ok(updates) => println!("{} placements to persist", updates.len()),
//!     Err(e) => println!("stale drag: {e}"),
//! }
//! # }
//! ```

pub mod activity;
pub mod api;
pub mod planner;
pub mod reconciler;
pub mod socket;
