use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{EngineError, LedgerEntry, ResultEngine, entries};

use super::{Engine, with_tx};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct EntriesCursor {
    created_at: DateTime<Utc>,
    entry_id: String,
}

impl EntriesCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid entries cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid entries cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid entries cursor".to_string()))
    }
}

impl Engine {
    /// Lists the rows on an account's ledger, with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(created_at DESC, id DESC)`. Requires
    /// a membership on the account (or root).
    pub async fn list_entries_for_account_page(
        &self,
        account_ref: &str,
        user_email: &str,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<(Vec<LedgerEntry>, Option<String>)> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, account_ref).await?;
            self.require_account_member(&db_tx, &account, user_email)
                .await?;

            let limit_plus_one = limit.saturating_add(1);
            let mut query = entries::Entity::find()
                .filter(entries::Column::AccountId.eq(account.id.clone()))
                .order_by_desc(entries::Column::CreatedAt)
                .order_by_desc(entries::Column::Id)
                .limit(limit_plus_one);

            if let Some(cursor) = cursor {
                let cursor = EntriesCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(entries::Column::CreatedAt.lt(cursor.created_at))
                        .add(
                            Condition::all()
                                .add(entries::Column::CreatedAt.eq(cursor.created_at))
                                .add(entries::Column::Id.lt(cursor.entry_id)),
                        ),
                );
            }

            let rows: Vec<entries::Model> = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;

            let mut out: Vec<LedgerEntry> = Vec::with_capacity(rows.len().min(limit as usize));
            for model in rows.into_iter().take(limit as usize) {
                out.push(LedgerEntry::try_from(model)?);
            }

            let next_cursor = out.last().map(|entry| EntriesCursor {
                created_at: entry.created_at,
                entry_id: entry.id.clone(),
            });
            let next_cursor = if has_more {
                next_cursor.map(|c| c.encode()).transpose()?
            } else {
                None
            };

            Ok((out, next_cursor))
        })
    }
}
