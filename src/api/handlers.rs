//! REST API handlers for registry queries

use crate::core::coin::Coin;
use crate::core::error::RegistryError;
use crate::core::fee::TokenFees;
use crate::core::params::Params;
use crate::ledger::BalanceLedger;
use crate::registry::MemRegistry;
use crate::token::Token;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<RwLock<MemRegistry>>,
}

impl ApiState {
    pub fn new(registry: MemRegistry) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
        }
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub tokens: usize,
}

/// A token with its outstanding supply
#[derive(Debug, Serialize)]
pub struct TokenInfo {
    #[serde(flatten)]
    pub token: Token,
    /// Outstanding supply in min units
    pub supply: Coin,
    /// Outstanding supply in main units
    pub main_supply: String,
}

#[derive(Debug, Serialize)]
pub struct ParamsResponse {
    pub version: u64,
    pub params: Params,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct TokensQuery {
    pub owner: Option<String>,
}

// ============================================================================
// Helpers
// ============================================================================

fn error_response(e: RegistryError) -> (StatusCode, Json<ApiError>) {
    let status = match e {
        RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
        RegistryError::InvalidArgument(_) | RegistryError::InvalidParameter(_) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ApiError {
            error: e.to_string(),
        }),
    )
}

fn token_info(registry: &MemRegistry, token: Token) -> Result<TokenInfo, RegistryError> {
    let supply = Coin::new(token.min_unit.clone(), registry.outstanding_supply(&token));
    let main_supply = token.to_main_coin(&supply)?.amount;

    Ok(TokenInfo {
        token,
        supply,
        main_supply,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health - Health check
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    let registry = state.registry.read().await;
    let tokens = registry.store().tokens().count();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tokens,
    })
}

/// GET /api/tokens?owner= - List tokens, optionally of one owner
pub async fn list_tokens(
    State(state): State<ApiState>,
    Query(query): Query<TokensQuery>,
) -> ApiResult<Vec<TokenInfo>> {
    let registry = state.registry.read().await;

    let tokens = registry
        .query_tokens(query.owner.as_deref())
        .map_err(error_response)?;
    let infos = tokens
        .into_iter()
        .map(|t| token_info(&registry, t))
        .collect::<Result<Vec<_>, _>>()
        .map_err(error_response)?;

    Ok(Json(infos))
}

/// GET /api/tokens/{denom} - Token by symbol or min unit
pub async fn get_token(
    State(state): State<ApiState>,
    Path(denom): Path<String>,
) -> ApiResult<TokenInfo> {
    let registry = state.registry.read().await;

    let token = registry.query_token(&denom).map_err(error_response)?;
    let info = token_info(&registry, token).map_err(error_response)?;
    Ok(Json(info))
}

/// GET /api/fees/{symbol} - Issue and mint fees for a symbol
pub async fn get_fees(
    State(state): State<ApiState>,
    Path(symbol): Path<String>,
) -> ApiResult<TokenFees> {
    let registry = state.registry.read().await;
    let fees = registry.query_fees(&symbol).map_err(error_response)?;
    Ok(Json(fees))
}

/// GET /api/params - Current fee parameters
pub async fn get_params(State(state): State<ApiState>) -> ApiResult<ParamsResponse> {
    let registry = state.registry.read().await;
    let versioned = registry.versioned_params().map_err(error_response)?;

    Ok(Json(ParamsResponse {
        version: versioned.version,
        params: versioned.params,
    }))
}

/// Balances of an account, used by the balance view of the CLI and API
pub fn balances_of(registry: &MemRegistry, account: &str) -> Vec<Coin> {
    registry
        .ledger()
        .spendable_balance(account)
        .into_iter()
        .map(|(denom, amount)| Coin::new(denom, amount))
        .collect()
}

/// GET /api/balances/{address} - Balances of an account
pub async fn get_balances(
    State(state): State<ApiState>,
    Path(address): Path<String>,
) -> Json<Vec<Coin>> {
    let registry = state.registry.read().await;
    Json(balances_of(&registry, &address))
}
