use crate::application::{
    CommandOutcome, ServiceDependencies, dispatch,
    fines::{MemberBalance, member_balance},
    loan::{
        ItemStatus, LateLoan, LoanSummary, find_late_loans, item_status, loan_history,
        loan_summary, member_loans,
    },
};
use crate::domain::{
    DomainEvent, ItemId, LoanId, MemberId, commands::Command, loan::Loan,
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{AsOfQuery, MemberLoansQuery},
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Command handler (POST)
// ============================================================================

/// POST /commands - コマンドを実行
///
/// 本文は`{"action": "schedule_loan", ...}`形式のコマンド。
/// 新しいエンティティを作成した場合は201、それ以外は200を返す。
pub async fn execute_command(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Command>, JsonRejection>,
) -> Result<(StatusCode, Json<CommandOutcome>), ApiError> {
    let Json(command) = payload?;
    let outcome = dispatch(&state.service_deps, command).await?;

    let status = if outcome.is_creation() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /loans/:id - 貸出の概要（as_of時点の延滞・更新可否を含む）
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
    query: Result<Query<AsOfQuery>, QueryRejection>,
) -> Result<Json<LoanSummary>, ApiError> {
    let Query(query) = query?;
    let summary = loan_summary(
        &state.service_deps,
        LoanId::from_uuid(loan_id),
        query.resolve(),
    )
    .await?;
    Ok(Json(summary))
}

/// GET /loans/:id/history - 貸出のイベント履歴
pub async fn get_loan_history(
    State(state): State<Arc<AppState>>,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<Vec<DomainEvent>>, ApiError> {
    let events = loan_history(&state.service_deps, LoanId::from_uuid(loan_id)).await?;
    Ok(Json(events))
}

/// GET /loans/late - 延滞中の貸出一覧
pub async fn get_late_loans(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AsOfQuery>, QueryRejection>,
) -> Result<Json<Vec<LateLoan>>, ApiError> {
    let Query(query) = query?;
    let late = find_late_loans(&state.service_deps, query.resolve()).await?;
    Ok(Json(late))
}

/// GET /items/:id/status - 資料の貸出状況
pub async fn get_item_status(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<Uuid>,
    query: Result<Query<AsOfQuery>, QueryRejection>,
) -> Result<Json<ItemStatus>, ApiError> {
    let Query(query) = query?;
    let status = item_status(
        &state.service_deps,
        ItemId::from_uuid(item_id),
        query.resolve(),
    )
    .await?;
    Ok(Json(status))
}

/// GET /members/:id/balance - 会員の未払い額と罰金
pub async fn get_member_balance(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<MemberBalance>, ApiError> {
    let balance = member_balance(&state.service_deps, MemberId::from_uuid(member_id)).await?;
    Ok(Json(balance))
}

/// GET /members/:id/loans - 会員の貸出一覧
///
/// クエリパラメータ:
/// - status: ステータスでフィルタリング（オプション）
pub async fn get_member_loans(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<Uuid>,
    query: Result<Query<MemberLoansQuery>, QueryRejection>,
) -> Result<Json<Vec<Loan>>, ApiError> {
    let Query(query) = query?;
    let loans = member_loans(
        &state.service_deps,
        MemberId::from_uuid(member_id),
        query.status,
    )
    .await?;
    Ok(Json(loans))
}
