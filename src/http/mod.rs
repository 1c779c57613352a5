//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → handlers.rs
//!         GET  /health, /health/{probe} → health evaluator
//!         POST /work                    → in-flight tracking → simulated work
//!     → response.rs (verdict → status code + JSON body)
//! ```

pub mod handlers;
pub mod response;
pub mod server;

pub use handlers::{WorkRequest, WorkResponse};
pub use response::ProbeResponse;
pub use server::{AppState, HttpServer};
