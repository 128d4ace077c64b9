//! # Number Scan
//!
//! The storage half of document numbering: find the highest existing number
//! for a prefix+year. The engine turns that into the next number.
//!
//! `MAX` over TEXT is a lexicographic maximum. That equals the numeric
//! maximum while sequences share the zero-padded width, which holds up to
//! 9999 documents per prefix and year.

use async_trait::async_trait;

use crate::contract::NumberSource;
use crate::error::StoreResult;
use crate::sqlite::pool::Database;
use factura_core::numbering::DocumentKind;

#[async_trait]
impl NumberSource for Database {
    async fn max_number(
        &self,
        kind: DocumentKind,
        pattern: &str,
    ) -> StoreResult<Option<String>> {
        let sql = match kind {
            DocumentKind::Invoice => {
                "SELECT MAX(invoice_number) FROM invoices WHERE invoice_number LIKE ?1"
            }
            DocumentKind::Quote => {
                "SELECT MAX(quote_number) FROM quotes WHERE quote_number LIKE ?1"
            }
        };

        let max: Option<String> = sqlx::query_scalar(sql)
            .bind(pattern)
            .fetch_one(self.pool())
            .await?;

        Ok(max)
    }
}
