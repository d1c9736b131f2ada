//! Accounts service for account and history operations.

use chrono::Duration;

use crate::client::ClientInner;
use crate::models::TransactionType;
use crate::table::{schemas, Table};
use crate::{Error, Result};

/// Service for account-related operations.
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
///
/// # fn example(client: ig_dealing_rs::IgClient) -> ig_dealing_rs::Result<()> {
/// // One row per account, balance fields promoted to columns
/// let accounts = client.accounts().list()?;
/// for row in accounts.to_records() {
///     println!("{}: {}", row["accountId"], row["available"]);
/// }
///
/// // Everything that happened in the last day
/// let activity = client.accounts().activity(Duration::days(1))?;
/// # Ok(())
/// # }
/// ```
pub struct AccountsService<'a> {
    inner: &'a ClientInner,
}

impl<'a> AccountsService<'a> {
    pub(crate) fn new(inner: &'a ClientInner) -> Self {
        Self { inner }
    }

    /// List the accounts of the logged-in client.
    ///
    /// The nested `balance` record is flattened into `balance`, `deposit`,
    /// `profitLoss` and `available` columns.
    pub fn list(&self) -> Result<Table> {
        let url = self.inner.url("/accounts")?;
        self.inner
            .get_flat_table(url, "accounts", &schemas::accounts())
    }

    /// Account activity over the last `period`.
    pub fn activity(&self, period: Duration) -> Result<Table> {
        let url = self.inner.url(&format!("/history/activity/{}", period_millis(period)?))?;
        self.inner.get_table(url, "activities")
    }

    /// Transactions of the given type over the last `period`.
    pub fn transactions(&self, kind: TransactionType, period: Duration) -> Result<Table> {
        let path = format!(
            "/history/transactions/{}/{}",
            kind.as_str(),
            period_millis(period)?
        );
        self.inner.get_table(self.inner.url(&path)?, "transactions")
    }
}

fn period_millis(period: Duration) -> Result<i64> {
    let millis = period.num_milliseconds();
    if millis <= 0 {
        return Err(Error::InvalidInput(format!(
            "History period must be positive, got {}ms",
            millis
        )));
    }
    Ok(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_millis() {
        assert_eq!(period_millis(Duration::days(1)).unwrap(), 86_400_000);
        assert_eq!(period_millis(Duration::milliseconds(1)).unwrap(), 1);
    }

    #[test]
    fn test_period_must_be_positive() {
        assert!(matches!(
            period_millis(Duration::zero()),
            Err(Error::InvalidInput(_))
        ));
        assert!(period_millis(Duration::seconds(-5)).is_err());
    }
}
