//! Transaction business logic - the append-only audit trail.
//!
//! Every value-moving operation appends exactly one record here inside its own
//! store transaction. Records are never updated or deleted, so this module
//! only offers inserts and reads.

use crate::{
    context::Ledger,
    entities::{Money, Transaction, Wallet, transaction, transaction::TransactionKind, wallet},
    errors::Result,
    views::TransactionView,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

/// Appends an audit record for `amount` on `wallet_id`.
///
/// Takes any connection so callers can append inside their open transaction.
pub async fn record_transaction<C>(
    db: &C,
    wallet_id: i64,
    amount: Decimal,
    kind: TransactionKind,
    now: DateTime<Utc>,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    let record = transaction::ActiveModel {
        wallet_id: Set(wallet_id),
        amount: Set(Money(amount)),
        kind: Set(kind),
        created_at: Set(now),
        ..Default::default()
    };
    record.insert(db).await.map_err(Into::into)
}

/// Retrieves every transaction across all of a user's wallets, newest first.
pub async fn get_transactions(ledger: &Ledger, user_id: i64) -> Result<Vec<TransactionView>> {
    let wallet_ids: Vec<i64> = Wallet::find()
        .select_only()
        .column(wallet::Column::Id)
        .filter(wallet::Column::UserId.eq(user_id))
        .into_tuple()
        .all(ledger.db())
        .await?;

    if wallet_ids.is_empty() {
        return Ok(Vec::new());
    }

    let records = Transaction::find()
        .filter(transaction::Column::WalletId.is_in(wallet_ids))
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .all(ledger.db())
        .await?;

    Ok(records.into_iter().map(TransactionView::from).collect())
}
