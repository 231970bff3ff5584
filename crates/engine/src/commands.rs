//! Command structs for engine operations.
//!
//! These types group parameters for write operations (order creation, account
//! and payment-method provisioning), keeping call sites readable and avoiding
//! long argument lists.

use crate::{AccountKind, Currency, PaymentMethodService};

/// Provisioning request for a not-yet-onboarded source organization.
#[derive(Clone, Debug)]
pub struct NewOrganization {
    pub name: String,
    pub website: Option<String>,
}

impl NewOrganization {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            website: None,
        }
    }

    #[must_use]
    pub fn website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }
}

/// Contact identity administering a provisioned organization.
#[derive(Clone, Debug)]
pub struct RemoteUser {
    pub email: String,
    pub name: Option<String>,
}

impl RemoteUser {
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Create an order (one fund movement, realized as one entry pair).
#[derive(Clone, Debug)]
pub struct OrderCmd {
    /// Destination account (id or slug).
    pub to_account: String,
    /// Payment method token.
    pub payment_method: String,
    pub amount_minor: i64,
    /// Defaults to the destination's currency.
    pub currency: Option<Currency>,
    /// Existing source account id; mutually exclusive with
    /// `new_organization`.
    pub from_account_id: Option<String>,
    pub new_organization: Option<NewOrganization>,
    pub remote_user: Option<RemoteUser>,
    pub host_fee_percent: Option<f64>,
    /// Root-only override.
    pub platform_fee_percent: Option<f64>,
    /// Host-currency magnitude decided upstream by the payment processor.
    pub payment_processor_fee_minor: Option<i64>,
    pub description: Option<String>,
    /// Acting identity email; `None` means unauthenticated.
    pub created_by: Option<String>,
}

impl OrderCmd {
    #[must_use]
    pub fn new(
        to_account: impl Into<String>,
        payment_method: impl Into<String>,
        amount_minor: i64,
    ) -> Self {
        Self {
            to_account: to_account.into(),
            payment_method: payment_method.into(),
            amount_minor,
            currency: None,
            from_account_id: None,
            new_organization: None,
            remote_user: None,
            host_fee_percent: None,
            platform_fee_percent: None,
            payment_processor_fee_minor: None,
            description: None,
            created_by: None,
        }
    }

    #[must_use]
    pub fn created_by(mut self, email: impl Into<String>) -> Self {
        self.created_by = Some(email.into());
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn from_account(mut self, account_id: impl Into<String>) -> Self {
        self.from_account_id = Some(account_id.into());
        self
    }

    #[must_use]
    pub fn on_behalf_of(mut self, organization: NewOrganization) -> Self {
        self.new_organization = Some(organization);
        self
    }

    #[must_use]
    pub fn remote_user(mut self, user: RemoteUser) -> Self {
        self.remote_user = Some(user);
        self
    }

    #[must_use]
    pub fn host_fee_percent(mut self, percent: f64) -> Self {
        self.host_fee_percent = Some(percent);
        self
    }

    #[must_use]
    pub fn platform_fee_percent(mut self, percent: f64) -> Self {
        self.platform_fee_percent = Some(percent);
        self
    }

    #[must_use]
    pub fn payment_processor_fee_minor(mut self, fee_minor: i64) -> Self {
        self.payment_processor_fee_minor = Some(fee_minor);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Create an account.
#[derive(Clone, Debug)]
pub struct NewAccountCmd {
    pub name: String,
    /// Derived from `name` when absent.
    pub slug: Option<String>,
    pub kind: AccountKind,
    pub currency: Currency,
    pub host_account_id: Option<String>,
    pub can_host: bool,
    pub host_fee_percent: Option<f64>,
    pub created_by: String,
}

impl NewAccountCmd {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: AccountKind,
        currency: Currency,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            slug: None,
            kind,
            currency,
            host_account_id: None,
            can_host: false,
            host_fee_percent: None,
            created_by: created_by.into(),
        }
    }

    #[must_use]
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    #[must_use]
    pub fn host(mut self, host_account_id: impl Into<String>) -> Self {
        self.host_account_id = Some(host_account_id.into());
        self
    }

    #[must_use]
    pub fn can_host(mut self, can_host: bool) -> Self {
        self.can_host = can_host;
        self
    }

    #[must_use]
    pub fn host_fee_percent(mut self, percent: f64) -> Self {
        self.host_fee_percent = Some(percent);
        self
    }
}

/// Create a payment method owned by an account.
#[derive(Clone, Debug)]
pub struct NewPaymentMethodCmd {
    pub account_id: String,
    pub service: PaymentMethodService,
    pub currency: Currency,
    pub name: Option<String>,
    pub created_by: String,
}

impl NewPaymentMethodCmd {
    #[must_use]
    pub fn new(
        account_id: impl Into<String>,
        service: PaymentMethodService,
        currency: Currency,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            service,
            currency,
            name: None,
            created_by: created_by.into(),
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
