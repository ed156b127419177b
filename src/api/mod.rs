//! REST API module
//!
//! Read-only HTTP access to the registry. Every route takes the shared lock
//! for reading; state changes only happen through the CLI.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/tokens?owner=` - List tokens
//! - `GET /api/tokens/{denom}` - Token by symbol or min unit
//! - `GET /api/fees/{symbol}` - Issue and mint fees
//! - `GET /api/params` - Fee parameters
//! - `GET /api/balances/{address}` - Account balances

pub mod handlers;
pub mod routes;

pub use handlers::ApiState;
pub use routes::create_router;
