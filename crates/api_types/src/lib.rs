use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Chf,
    Jpy,
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccountKind {
        Individual,
        Organization,
        Collective,
        Host,
    }

    /// Request body for creating an account.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub slug: Option<String>,
        pub kind: AccountKind,
        pub currency: Option<Currency>,
        /// Host account id or slug to attach to.
        pub host: Option<String>,
        #[serde(default)]
        pub can_host: bool,
        pub host_fee_percent: Option<f64>,
    }

    /// Flat account summary returned by most endpoints.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: String,
        pub slug: String,
        pub name: String,
        pub kind: AccountKind,
        pub currency: Currency,
        pub host_account_id: Option<String>,
        pub can_host: bool,
        pub archived: bool,
    }
}

pub mod payment_method {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Service {
        Stripe,
        Paypal,
        Collective,
    }

    /// Request body for creating a payment method.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentMethodNew {
        /// Owning account id or slug.
        pub account: String,
        pub service: Service,
        pub currency: Option<Currency>,
        pub name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentMethodView {
        pub token: String,
        pub account_id: String,
        pub service: Service,
        pub currency: Currency,
        pub name: Option<String>,
    }

    /// Response body for a balance lookup.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceResponse {
        pub balance: i64,
        pub currency: Currency,
    }
}

pub mod order {
    use super::*;

    /// Source organization to provision when the contributor's party is not
    /// onboarded yet.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FromOrganization {
        pub name: String,
        pub website: Option<String>,
    }

    /// Contact identity administering a provisioned organization.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderUser {
        pub email: String,
        pub name: Option<String>,
    }

    /// Request body for submitting an order.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderNew {
        /// Integer minor units.
        pub total_amount: i64,
        /// Defaults to the destination's currency.
        pub currency: Option<Currency>,
        /// Destination account id or slug.
        pub collective: String,
        /// Payment method token.
        pub payment_method: String,
        /// Existing source account id; mutually exclusive with
        /// `new_organization`.
        pub from_collective: Option<String>,
        pub new_organization: Option<FromOrganization>,
        pub user: Option<OrderUser>,
        pub host_fee_percent: Option<f64>,
        /// Root-only.
        pub platform_fee_percent: Option<f64>,
        pub payment_processor_fee: Option<i64>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderAccountView {
        pub id: String,
        pub slug: String,
        pub name: String,
    }

    /// Response body for a realized order.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct OrderCreated {
        pub id: String,
        pub from_account: OrderAccountView,
        pub to_account: OrderAccountView,
    }
}

pub mod entry {
    use super::*;
    use chrono::{DateTime, Utc};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum EntryKind {
        Credit,
        Debit,
    }

    /// Query body for listing an account's ledger rows.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryList {
        /// Account id or slug.
        pub account: String,
        pub limit: Option<u64>,
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryView {
        pub id: String,
        pub kind: EntryKind,
        pub order_id: String,
        pub counterparty_account_id: String,
        pub amount_minor: i64,
        pub currency: Currency,
        pub host_currency: Currency,
        pub host_currency_fx_rate: f64,
        pub amount_in_host_minor: i64,
        pub host_fee_minor: i64,
        pub platform_fee_minor: i64,
        pub payment_processor_fee_minor: i64,
        pub net_amount_minor: i64,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryListResponse {
        pub entries: Vec<EntryView>,
        pub next_cursor: Option<String>,
    }
}

pub mod membership {
    use super::*;

    /// Role of a user on an account.
    ///
    /// The server treats roles as:
    /// - `admin`: full access, can move funds and manage members.
    /// - `member`: read-only.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MembershipRole {
        Admin,
        Member,
    }

    impl MembershipRole {
        /// Returns the canonical role string used by the engine/database.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Admin => "admin",
                Self::Member => "member",
            }
        }
    }

    /// Request body for adding/updating a member.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberUpsert {
        pub email: String,
        pub role: MembershipRole,
    }

    /// Response body for listing members.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }

    /// A member with their role.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub email: String,
        pub role: MembershipRole,
    }
}
